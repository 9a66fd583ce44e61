//! Packed frame format.
//!
//! A frame records which logical registers changed since the previous
//! frame and their new values:
//!
//! ```text
//!  byte 0     header: one bit per register, bit n = Register::ALL[n]
//!  byte 1..   4-bit nibbles, two per byte, low nibble first
//! ```
//!
//! Values follow in header-bit order. Tone periods take three nibbles
//! (bits 3-0, 7-4, 9-8), every other register takes one. A frame with an
//! odd nibble count leaves the high half of its last byte zero, so the
//! byte length depends on the header alone.

use crate::chip::register::{Register, RegisterSink, RegisterState, RegisterWrite};

/// Largest possible frame: header plus 3 * 3 + 5 nibbles.
pub const FRAME_SIZE_MAX: usize = 8;

/// Header of the reserved empty frame at offset 0.
pub const EMPTY_HEADER: u8 = 0;

/// Number of bytes a frame with `header` occupies, header included.
pub fn frame_len(header: u8) -> usize {
    let nibbles: usize = Register::ALL
        .iter()
        .filter(|r| header & r.bit() != 0)
        .map(|r| r.nibbles())
        .sum();
    1 + nibbles.div_ceil(2)
}

/// A packed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frame {
    data: [u8; FRAME_SIZE_MAX],
    len: u8,
}

impl Frame {
    /// The header-only frame used for pure delays.
    pub const EMPTY: Frame = Frame {
        data: [0; FRAME_SIZE_MAX],
        len: 1,
    };

    /// Pack the registers of `current` that differ from `previous`.
    pub fn synthesize(current: &RegisterState, previous: &RegisterState) -> Frame {
        let mut frame = Frame::EMPTY;
        let mut nibble_count = 0usize;

        for write in current.diff(previous) {
            frame.data[0] |= write.register.bit();
            for i in 0..write.register.nibbles() {
                let nibble = ((write.value >> (4 * i)) & 0x0F) as u8;
                let byte = 1 + nibble_count / 2;
                if nibble_count % 2 == 0 {
                    frame.data[byte] = nibble;
                } else {
                    frame.data[byte] |= nibble << 4;
                }
                nibble_count += 1;
            }
        }

        frame.len = (1 + nibble_count.div_ceil(2)) as u8;
        frame
    }

    pub fn header(&self) -> u8 {
        self.data[0]
    }

    pub fn is_empty(&self) -> bool {
        self.header() == EMPTY_HEADER
    }

    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len()]
    }

    /// Decode the frame back into the writes it carries.
    pub fn writes(&self) -> Vec<RegisterWrite> {
        let mut writes = Vec::new();
        let mut cursor = NibbleCursor::at(0);
        read_frame(self.as_bytes(), &mut cursor, &mut writes);
        writes
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// Turns successive register states into frames, remembering the last
/// state it packed.
#[derive(Debug, Clone, Default)]
pub struct FrameSynthesizer {
    previous: RegisterState,
}

impl FrameSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pack the difference to the previous state and make `current` the
    /// new previous state.
    pub fn next(&mut self, current: &RegisterState) -> Frame {
        let frame = Frame::synthesize(current, &self.previous);
        self.previous = *current;
        frame
    }

    pub fn previous(&self) -> &RegisterState {
        &self.previous
    }
}

/// Byte position plus nibble parity inside the frame table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NibbleCursor {
    pos: usize,
    high: bool,
}

impl NibbleCursor {
    pub fn at(pos: usize) -> Self {
        Self { pos, high: false }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Whether the next nibble is the high half of the current byte.
    pub fn is_high(&self) -> bool {
        self.high
    }

    /// Read a whole byte. Only valid on a byte boundary.
    pub fn read_byte(&mut self, data: &[u8]) -> u8 {
        let b = data[self.pos];
        self.pos += 1;
        b
    }

    pub fn read_nibble(&mut self, data: &[u8]) -> u8 {
        if self.high {
            self.high = false;
            let n = data[self.pos] >> 4;
            self.pos += 1;
            n
        } else {
            self.high = true;
            data[self.pos] & 0x0F
        }
    }

    /// Move to the next byte boundary if a byte was left half-read.
    pub fn align(&mut self) {
        if self.high {
            self.high = false;
            self.pos += 1;
        }
    }
}

/// Read the frame starting at the cursor and send its writes to `sink` in
/// header-bit order. The cursor ends on the byte after the frame.
pub fn read_frame<S: RegisterSink + ?Sized>(
    data: &[u8],
    cursor: &mut NibbleCursor,
    sink: &mut S,
) {
    let header = cursor.read_byte(data);

    for register in Register::ALL {
        if header & register.bit() == 0 {
            continue;
        }
        let mut value = 0u16;
        for i in 0..register.nibbles() {
            value |= u16::from(cursor.read_nibble(data)) << (4 * i);
        }
        sink.write(RegisterWrite::new(register, value));
    }

    cursor.align();
}
