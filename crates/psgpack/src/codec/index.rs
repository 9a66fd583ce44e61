//! Index words and the delay encoder.
//!
//! Format of a literal index word:
//!
//! ```text
//!  [15]     0 (set only on back-references, see `compress`)
//!  [14..12] delay in ticks minus one (1-8 ticks)
//!  [11..0]  frame offset
//! ```
//!
//! Delays longer than eight ticks become a chain: the first word carries
//! the frame offset and eight ticks, the following words point at the
//! empty frame at offset 0 and carry the rest.

/// Flag bit separating back-references from literal index words.
pub const BACK_REFERENCE_FLAG: u16 = 0x8000;

/// Mask of the 12-bit frame offset / reference start field.
pub const OFFSET_MASK: u16 = 0x0FFF;

/// Longest delay a single index word can carry.
pub const MAX_DELAY_TICKS: u32 = 8;

const FIELD_SHIFT: u16 = 12;

/// A literal (pre-compression) index word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexWord(u16);

impl IndexWord {
    /// Build a word from a frame offset and a delay of 1-8 ticks.
    pub fn new(offset: u16, delay_ticks: u32) -> Self {
        debug_assert!((1..=MAX_DELAY_TICKS).contains(&delay_ticks));
        let delay_bits = ((delay_ticks.clamp(1, MAX_DELAY_TICKS) - 1) as u16) << FIELD_SHIFT;
        IndexWord(delay_bits | (offset & OFFSET_MASK))
    }

    pub fn from_raw(raw: u16) -> Self {
        IndexWord(raw)
    }

    pub fn raw(self) -> u16 {
        self.0
    }

    /// Delay in ticks (1-8).
    pub fn delay(self) -> u32 {
        u32::from((self.0 >> FIELD_SHIFT) & 0x0007) + 1
    }

    /// Offset of the frame in the frame table.
    pub fn offset(self) -> u16 {
        self.0 & OFFSET_MASK
    }
}

impl From<IndexWord> for u16 {
    fn from(word: IndexWord) -> u16 {
        word.0
    }
}

/// Decoded view of a word in the compressed index stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamWord {
    Literal(IndexWord),
    /// Replay `len` (2-9) words starting at `start` in the compressed
    /// stream.
    Reference { start: u16, len: u16 },
}

impl StreamWord {
    pub fn from_raw(raw: u16) -> Self {
        if raw & BACK_REFERENCE_FLAG != 0 {
            StreamWord::Reference {
                start: raw & OFFSET_MASK,
                len: ((raw >> FIELD_SHIFT) & 0x0007) + 2,
            }
        } else {
            StreamWord::Literal(IndexWord(raw))
        }
    }

    pub fn to_raw(self) -> u16 {
        match self {
            StreamWord::Literal(word) => word.0,
            StreamWord::Reference { start, len } => {
                debug_assert!((2..=9).contains(&len));
                BACK_REFERENCE_FLAG | ((len - 2) << FIELD_SHIFT) | (start & OFFSET_MASK)
            }
        }
    }
}

/// Turns (frame offset, delay) pairs into index words.
#[derive(Debug, Clone, Default)]
pub struct IndexEncoder {
    words: Vec<IndexWord>,
}

impl IndexEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the words for one frame held for `delay_ticks` ticks.
    ///
    /// A zero delay is stored as one tick.
    pub fn emit(&mut self, offset: u16, delay_ticks: u32) {
        let mut remaining = delay_ticks.max(1);
        if remaining <= MAX_DELAY_TICKS {
            self.words.push(IndexWord::new(offset, remaining));
            return;
        }

        self.words.push(IndexWord::new(offset, MAX_DELAY_TICKS));
        remaining -= MAX_DELAY_TICKS;
        while remaining > MAX_DELAY_TICKS {
            self.words.push(IndexWord::new(0, MAX_DELAY_TICKS));
            remaining -= MAX_DELAY_TICKS;
        }
        self.words.push(IndexWord::new(0, remaining));
    }

    /// Number of words emitted so far.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[IndexWord] {
        &self.words
    }

    pub fn into_words(self) -> Vec<IndexWord> {
        self.words
    }
}
