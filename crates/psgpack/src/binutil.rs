//! Utilities used by the VGM reader: parse error type and byte readers.

/// Error type returned by the VGM reader.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Input ended in the middle of a command.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// An attempted read was outside the available buffer range.
    ///
    /// - `offset` is the index that was attempted to be accessed.
    /// - `needed` is the number of bytes required for the operation.
    /// - `available` is the current buffer length.
    #[error("offset out of range: 0x{offset:X} (needed {needed} bytes, available {available})")]
    OffsetOutOfRange {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// The file does not start with `"Vgm "`.
    ///
    /// The contained array is the raw 4 bytes that were read.
    #[error("invalid ident: {0:?}")]
    InvalidIdent([u8; 4]),

    /// A header was shorter than the minimum required length.
    #[error("header too short: {0}")]
    HeaderTooShort(String),
}

/// Read a 32-bit little-endian unsigned integer from `bytes` at `off`.
pub fn read_u32_le_at(bytes: &[u8], off: usize) -> Result<u32, ParseError> {
    let slice = read_slice(bytes, off, 4)?;
    let mut tmp: [u8; 4] = [0; 4];
    tmp.copy_from_slice(slice);
    Ok(u32::from_le_bytes(tmp))
}

/// Read a 16-bit little-endian unsigned integer from `bytes` at `off`.
pub fn read_u16_le_at(bytes: &[u8], off: usize) -> Result<u16, ParseError> {
    let slice = read_slice(bytes, off, 2)?;
    Ok(u16::from_le_bytes([slice[0], slice[1]]))
}

/// Read a single byte from `bytes` at `off`.
pub fn read_u8_at(bytes: &[u8], off: usize) -> Result<u8, ParseError> {
    bytes
        .get(off)
        .copied()
        .ok_or(ParseError::OffsetOutOfRange {
            offset: off,
            needed: 1,
            available: bytes.len(),
        })
}

/// Return a borrowed slice of length `len` starting at `off` from `bytes`.
///
/// `available` in the error reports the bytes remaining from `off`.
pub fn read_slice(bytes: &[u8], off: usize, len: usize) -> Result<&[u8], ParseError> {
    if bytes.len() < off.saturating_add(len) {
        return Err(ParseError::OffsetOutOfRange {
            offset: off,
            needed: len,
            available: bytes.len().saturating_sub(off),
        });
    }
    Ok(&bytes[off..off + len])
}
