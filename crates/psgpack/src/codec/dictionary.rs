//! Frame deduplication.
//!
//! Every distinct frame is stored once in a flat byte table and referred
//! to by its byte offset. Offsets are 12 bits wide in index words, which
//! caps the table at [`FRAME_TABLE_CAPACITY`] bytes.

use std::collections::HashMap;

use crate::codec::frame::Frame;

/// Addressable size of the frame table (12-bit offsets).
pub const FRAME_TABLE_CAPACITY: usize = 0x1000;

/// Deduplicating frame table.
///
/// The empty frame is pre-populated at offset 0 so pure-delay index words
/// can point at it.
#[derive(Debug, Clone)]
pub struct FrameDictionary {
    table: Vec<u8>,
    offsets: HashMap<Frame, u16>,
    overflowed: bool,
}

impl Default for FrameDictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDictionary {
    pub fn new() -> Self {
        let mut offsets = HashMap::new();
        offsets.insert(Frame::EMPTY, 0);
        Self {
            table: Frame::EMPTY.as_bytes().to_vec(),
            offsets,
            overflowed: false,
        }
    }

    /// Return the offset of `frame`, appending it to the table if its
    /// content has not been seen before.
    ///
    /// Growing the table past [`FRAME_TABLE_CAPACITY`] is reported with a
    /// warning and remembered; the returned offset then wraps to 12 bits
    /// and is not usable for playback.
    pub fn intern(&mut self, frame: &Frame) -> u16 {
        if let Some(offset) = self.offsets.get(frame) {
            return *offset;
        }

        let start = self.table.len();
        if start + frame.len() > FRAME_TABLE_CAPACITY {
            if !self.overflowed {
                tracing::warn!(
                    bytes = start + frame.len(),
                    capacity = FRAME_TABLE_CAPACITY,
                    "frame table too large to index"
                );
            }
            self.overflowed = true;
        }

        let offset = (start & 0x0FFF) as u16;
        self.table.extend_from_slice(frame.as_bytes());
        self.offsets.insert(*frame, offset);
        offset
    }

    /// The packed frame table.
    pub fn as_bytes(&self) -> &[u8] {
        &self.table
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.table
    }

    /// Size of the frame table in bytes.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Never true: the empty frame is always present.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Number of unique frames, the empty frame included.
    pub fn frame_count(&self) -> usize {
        self.offsets.len()
    }

    /// Whether the table has ever exceeded its addressable size.
    pub fn is_overflowed(&self) -> bool {
        self.overflowed
    }
}
