//! Tick-driven playback of an [`Artifact`].
//!
//! The player is the inverse of the encoder. Each call to [`Player::tick`]
//! corresponds to one playback period (1/60 s or 1/50 s). When the
//! current frame's delay has run out the player fetches the next index
//! word, expanding back-references as it goes, and sends the frame's
//! register writes to a [`RegisterSink`]. It never stops: reaching the
//! end of the index table jumps back to the artifact's loop point.
//!
//! The player trusts its input. Offsets are not validated, so a malformed
//! artifact panics on an out-of-bounds read.

use crate::chip::register::RegisterSink;
use crate::codec::artifact::Artifact;
use crate::codec::compress::LoopPoint;
use crate::codec::frame::{NibbleCursor, read_frame};
use crate::codec::index::{IndexWord, StreamWord};

/// Cursors and counters mutated once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerState {
    /// Next word to fetch from the compressed index table.
    pub outer: u16,
    /// Next literal index word to play.
    pub inner: u16,
    /// End (exclusive) of the segment `inner` walks through.
    pub segment_end: u16,
    /// Ticks left before the next frame is fetched.
    pub delay: u32,
    /// Position and nibble parity inside the frame table.
    pub cursor: NibbleCursor,
}

/// Playback state machine over borrowed tables.
#[derive(Debug, Clone)]
pub struct Player<'a> {
    frame_table: &'a [u8],
    index_table: &'a [u16],
    loop_point: LoopPoint,
    state: PlayerState,
    ticks: u64,
    loops: u64,
}

impl<'a> Player<'a> {
    pub fn new(artifact: &'a Artifact) -> Self {
        Self::from_tables(
            &artifact.frame_table,
            &artifact.index_table,
            artifact.loop_point,
        )
    }

    pub fn from_tables(
        frame_table: &'a [u8],
        index_table: &'a [u16],
        loop_point: LoopPoint,
    ) -> Self {
        Self {
            frame_table,
            index_table,
            loop_point,
            state: PlayerState::default(),
            ticks: 0,
            loops: 0,
        }
    }

    /// Run one tick, sending any register writes due to `sink`.
    pub fn tick<S: RegisterSink + ?Sized>(&mut self, sink: &mut S) {
        let st = &mut self.state;

        if st.delay == 0 {
            if st.inner == st.segment_end {
                let element = self.index_table[usize::from(st.outer)];
                st.outer += 1;
                match StreamWord::from_raw(element) {
                    StreamWord::Reference { start, len } => {
                        st.inner = start;
                        st.segment_end = start + len;
                    }
                    StreamWord::Literal(_) => {
                        st.inner = st.outer - 1;
                        st.segment_end = st.outer;
                    }
                }
            }

            let word = IndexWord::from_raw(self.index_table[usize::from(st.inner)]);
            st.inner += 1;
            st.delay = word.delay();

            st.cursor = NibbleCursor::at(usize::from(word.offset()));
            read_frame(self.frame_table, &mut st.cursor, sink);
        }

        if usize::from(st.outer) == self.index_table.len() {
            st.outer = self.loop_point.outer;
            st.inner = self.loop_point.inner;
            st.segment_end = self.loop_point.segment_end;
            self.loops += 1;
        }

        if st.delay > 0 {
            st.delay -= 1;
        }
        self.ticks += 1;
    }

    /// Run `ticks` ticks into the same sink.
    pub fn run<S: RegisterSink + ?Sized>(&mut self, ticks: u64, sink: &mut S) {
        for _ in 0..ticks {
            self.tick(sink);
        }
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    /// Ticks run since creation or the last reset.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Number of times playback has jumped back to the loop point.
    pub fn loops(&self) -> u64 {
        self.loops
    }

    pub fn reset(&mut self) {
        self.state = PlayerState::default();
        self.ticks = 0;
        self.loops = 0;
    }
}
