//! Single-pass encoder: event log in, [`Artifact`] out.
//!
//! Pipeline: register writes update a running [`RegisterState`]; whenever
//! at least one tick of waiting has accumulated before a write, the state
//! is packed into a frame, deduplicated, and emitted as index words
//! carrying the number of whole ticks waited. The remainder of the wait
//! carries over to the next frame. The finished index stream is then
//! back-reference compressed.

use crate::chip::register::{RegisterState, RegisterWrite};
use crate::codec::artifact::Artifact;
use crate::codec::compress::{MAX_STREAM_WORDS, compress};
use crate::codec::dictionary::{FRAME_TABLE_CAPACITY, FrameDictionary};
use crate::codec::frame::FrameSynthesizer;
use crate::codec::index::{IndexEncoder, IndexWord};
use crate::event::{Event, EventLog, TickRate};

/// Capacity violations found while encoding.
///
/// The artifact format cannot represent an overflowing table, so an
/// artifact produced alongside one of these is not playable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("frame table is {bytes} bytes, only {} bytes are addressable", FRAME_TABLE_CAPACITY)]
    FrameTableOverflow { bytes: usize },
    #[error("index stream is {words} words, only {} words are addressable", MAX_STREAM_WORDS)]
    IndexStreamOverflow { words: usize },
}

/// Encoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Source samples per playback tick.
    pub samples_per_tick: u32,
}

impl EncoderConfig {
    pub fn new(rate: TickRate) -> Self {
        Self {
            samples_per_tick: rate.samples_per_tick(),
        }
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self::new(TickRate::default())
    }
}

impl From<TickRate> for EncoderConfig {
    fn from(rate: TickRate) -> Self {
        Self::new(rate)
    }
}

/// Counters describing one encoding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeStats {
    /// Register writes consumed.
    pub writes: usize,
    /// Frames flushed (before deduplication).
    pub frames: usize,
    /// Distinct frames, the empty frame included.
    pub unique_frames: usize,
    pub frame_bytes: usize,
    /// Index words before back-reference compression.
    pub index_words: usize,
    pub compressed_words: usize,
    /// Frame table plus compressed index table, in bytes.
    pub total_bytes: usize,
}

/// Result of a finished encoding run.
#[derive(Debug, Clone)]
pub struct Encoded {
    pub artifact: Artifact,
    /// The index stream before compression.
    pub index_words: Vec<IndexWord>,
    /// Loop position in `index_words`.
    pub loop_offset: usize,
    pub stats: EncodeStats,
    /// Capacity violations; empty for a playable artifact.
    pub diagnostics: Vec<EncodeError>,
}

/// Incremental encoder. Feed events in order, then call [`finish`].
///
/// [`finish`]: Encoder::finish
#[derive(Debug, Clone)]
pub struct Encoder {
    config: EncoderConfig,
    state: RegisterState,
    synthesizer: FrameSynthesizer,
    dictionary: FrameDictionary,
    index: IndexEncoder,
    pending_samples: u64,
    loop_offset: Option<usize>,
    /// Register writes since the last flushed frame.
    dirty: bool,
    writes: usize,
    frames: usize,
}

impl Encoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self {
            config,
            state: RegisterState::new(),
            synthesizer: FrameSynthesizer::new(),
            dictionary: FrameDictionary::new(),
            index: IndexEncoder::new(),
            pending_samples: 0,
            loop_offset: None,
            dirty: false,
            writes: 0,
            frames: 0,
        }
    }

    fn samples_per_tick(&self) -> u64 {
        u64::from(self.config.samples_per_tick.max(1))
    }

    pub fn push(&mut self, event: &Event) {
        match *event {
            Event::Write(write) => self.write(write),
            Event::Wait(samples) => self.wait(samples),
            Event::LoopStart => self.mark_loop(),
        }
    }

    pub fn write(&mut self, write: RegisterWrite) {
        if self.pending_samples >= self.samples_per_tick() {
            self.flush_frame();
        }
        self.state.apply(write);
        self.dirty = true;
        self.writes += 1;
    }

    pub fn wait(&mut self, samples: u32) {
        self.pending_samples += u64::from(samples);
    }

    /// Record the loop point at the current position of the log.
    ///
    /// Whole ticks already waited belong before the loop, so they are
    /// flushed first; the remainder of the wait starts the loop as a pure
    /// delay. Only the first marker counts.
    pub fn mark_loop(&mut self) {
        if self.loop_offset.is_some() {
            tracing::debug!("ignoring repeated loop marker");
            return;
        }
        if self.pending_samples >= self.samples_per_tick() {
            self.flush_frame();
        }
        let offset = self.index.len();
        tracing::debug!(loop_offset = offset, "loop marker");
        self.loop_offset = Some(offset);
    }

    fn flush_frame(&mut self) {
        let spt = self.samples_per_tick();
        let ticks = self.pending_samples / spt;
        self.pending_samples -= ticks * spt;

        let frame = self.synthesizer.next(&self.state);
        let offset = self.dictionary.intern(&frame);
        let ticks = u32::try_from(ticks).unwrap_or(u32::MAX);
        self.index.emit(offset, ticks);
        self.frames += 1;
        self.dirty = false;
    }

    /// Flush the final frame and compress, returning capacity violations
    /// alongside the artifact instead of failing.
    pub fn finish_unchecked(mut self) -> Encoded {
        // nothing left to play if the last flush already covered the log
        if self.index.is_empty() || self.dirty || self.pending_samples >= self.samples_per_tick() {
            self.flush_frame();
        }

        let frame_overflow = self.dictionary.is_overflowed();
        let unique_frames = self.dictionary.frame_count();
        let frame_table = self.dictionary.into_bytes();
        let index_words = self.index.into_words();
        let loop_offset = self.loop_offset.unwrap_or(0);

        let compressed = compress(&index_words, loop_offset);
        let diagnostics =
            capacity_diagnostics(frame_table.len(), frame_overflow, compressed.words.len());

        let artifact = Artifact {
            frame_table,
            index_table: compressed.words,
            loop_point: compressed.loop_point,
        };

        let stats = EncodeStats {
            writes: self.writes,
            frames: self.frames,
            unique_frames,
            frame_bytes: artifact.frame_table.len(),
            index_words: index_words.len(),
            compressed_words: artifact.index_table.len(),
            total_bytes: artifact.total_bytes(),
        };
        tracing::info!(
            frame_bytes = stats.frame_bytes,
            unique_frames = stats.unique_frames,
            index_words = stats.index_words,
            compressed_words = stats.compressed_words,
            total_bytes = stats.total_bytes,
            "encoded"
        );

        Encoded {
            artifact,
            index_words,
            loop_offset,
            stats,
            diagnostics,
        }
    }

    /// Flush the final frame and compress. Any capacity violation is an
    /// error.
    pub fn finish(self) -> Result<Encoded, EncodeError> {
        let encoded = self.finish_unchecked();
        match encoded.diagnostics.first() {
            Some(err) => Err(err.clone()),
            None => Ok(encoded),
        }
    }
}

/// Capacity violations for a frame table of `frame_bytes` bytes and a
/// compressed stream of `stream_words` words.
fn capacity_diagnostics(
    frame_bytes: usize,
    frame_overflow: bool,
    stream_words: usize,
) -> Vec<EncodeError> {
    let mut diagnostics = Vec::new();
    if frame_overflow {
        diagnostics.push(EncodeError::FrameTableOverflow { bytes: frame_bytes });
    }
    if stream_words > MAX_STREAM_WORDS {
        tracing::warn!(
            words = stream_words,
            capacity = MAX_STREAM_WORDS,
            "index stream too large to address"
        );
        diagnostics.push(EncodeError::IndexStreamOverflow {
            words: stream_words,
        });
    }
    diagnostics
}

/// Encode a whole event log.
pub fn encode(log: &EventLog, config: EncoderConfig) -> Result<Encoded, EncodeError> {
    let mut encoder = Encoder::new(config);
    for event in log {
        encoder.push(event);
    }
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::register::Register;

    #[test]
    fn test_empty_log_is_one_silent_tick() {
        let encoded = encode(&EventLog::new(), EncoderConfig::default()).unwrap();
        assert_eq!(encoded.artifact.frame_table, vec![0x00]);
        assert_eq!(encoded.artifact.index_table, vec![0x0000]);
        assert_eq!(encoded.stats.frames, 1);
    }

    #[test]
    fn test_writes_within_a_tick_share_a_frame() {
        let mut log = EventLog::new();
        log.push_write(Register::Volume0, 0x1);
        log.push_wait(100);
        log.push_write(Register::Volume1, 0x2);
        log.push_wait(635);
        log.push_write(Register::Volume2, 0x3);

        let encoded = encode(&log, EncoderConfig::default()).unwrap();
        // frame 1: vol0 + vol1 for one tick; frame 2: vol2 at end
        assert_eq!(encoded.stats.frames, 2);
        assert_eq!(&encoded.artifact.frame_table[1..4], &[0x30, 0x21, 0x40]);
        assert_eq!(encoded.index_words[0], IndexWord::new(1, 1));
    }

    #[test]
    fn test_wait_remainder_carries_over() {
        let mut log = EventLog::new();
        log.push_write(Register::Volume0, 0x1);
        log.push_wait(1000); // 1 tick, 265 left over
        log.push_write(Register::Volume0, 0x2);
        log.push_wait(500); // 765 pending: 1 tick
        log.push_write(Register::Volume0, 0x3);

        let encoded = encode(&log, EncoderConfig::default()).unwrap();
        let delays: Vec<u32> = encoded.index_words.iter().map(|w| w.delay()).collect();
        assert_eq!(delays, vec![1, 1, 1]);
    }

    #[test]
    fn test_pal_tick_length() {
        let mut log = EventLog::new();
        log.push_write(Register::Volume0, 0x1);
        log.push_wait(882 * 3);
        log.push_write(Register::Volume0, 0x2);

        let encoded = encode(&log, TickRate::Pal.into()).unwrap();
        assert_eq!(encoded.index_words[0].delay(), 3);
    }

    #[test]
    fn test_loop_between_waits_keeps_rest_of_wait() {
        let mut log = EventLog::new();
        log.push_write(Register::Volume0, 0x1);
        log.push_wait(3 * 735);
        log.mark_loop();
        log.push_wait(735);
        log.push_write(Register::Volume0, 0x2);
        log.push_wait(735);

        let encoded = encode(&log, EncoderConfig::default()).unwrap();
        // vol0=1 for 3 ticks, then the loop: 1 silent tick, vol0=2
        assert_eq!(
            encoded.index_words,
            vec![IndexWord::new(1, 3), IndexWord::new(0, 1), IndexWord::new(3, 1)]
        );
        assert_eq!(encoded.loop_offset, 1);
    }

    #[test]
    fn test_loop_at_end_adds_no_tick() {
        let mut log = EventLog::new();
        log.push_write(Register::Volume0, 0x1);
        log.push_wait(2 * 735);
        log.mark_loop();

        let encoded = encode(&log, EncoderConfig::default()).unwrap();
        assert_eq!(encoded.index_words, vec![IndexWord::new(1, 2)]);
        assert_eq!(encoded.loop_offset, 1);
    }

    #[test]
    fn test_loop_after_pending_tick_skips_pre_loop_frame() {
        let mut log = EventLog::new();
        log.push_write(Register::Volume0, 0x1);
        log.push_wait(735);
        log.mark_loop();
        log.push_write(Register::Volume0, 0x2);
        log.push_wait(735);

        let encoded = encode(&log, EncoderConfig::default()).unwrap();
        assert_eq!(encoded.loop_offset, 1);
    }

    #[test]
    fn test_loop_within_tick_lands_on_next_frame() {
        let mut log = EventLog::new();
        log.push_write(Register::Volume0, 0x1);
        log.push_wait(735);
        log.push_write(Register::Volume0, 0x2);
        log.mark_loop();
        log.push_write(Register::Volume1, 0x3);
        log.push_wait(735);

        let encoded = encode(&log, EncoderConfig::default()).unwrap();
        // word 0 holds vol0=1, word 1 holds vol0=2 and vol1=3
        assert_eq!(encoded.loop_offset, 1);
        assert_eq!(encoded.index_words.len(), 2);
    }

    #[test]
    fn test_frame_overflow_fails_finish() {
        let mut encoder = Encoder::new(EncoderConfig::default());
        // 3-byte tone frames: 1 + 1366 * 3 > 4096
        for i in 0..1366u16 {
            let register = if i < 1024 { Register::Tone0 } else { Register::Tone1 };
            encoder.write(RegisterWrite::new(register, i % 1024 + 1));
            encoder.wait(735);
        }
        let err = encoder.clone().finish().unwrap_err();
        assert!(matches!(err, EncodeError::FrameTableOverflow { .. }));

        let encoded = encoder.finish_unchecked();
        assert_eq!(encoded.diagnostics.len(), 1);
    }

    #[test]
    fn test_index_stream_capacity() {
        assert!(capacity_diagnostics(16, false, MAX_STREAM_WORDS).is_empty());
        assert_eq!(
            capacity_diagnostics(16, false, MAX_STREAM_WORDS + 1),
            vec![EncodeError::IndexStreamOverflow {
                words: MAX_STREAM_WORDS + 1
            }]
        );
        assert_eq!(capacity_diagnostics(4100, true, MAX_STREAM_WORDS + 1).len(), 2);
    }
}
