//! The subset of the VGM header the converter needs.

use crate::binutil::{ParseError, read_slice, read_u32_le_at};

/// Smallest header that holds every field read here.
pub const VGM_MIN_HEADER_SIZE: usize = 0x40;

/// Where the command stream starts when the header does not say.
pub const VGM_LEGACY_DATA_START: usize = 0x40;

#[derive(Debug, Clone, PartialEq, Eq)]
/// VGM header fields relevant to SN76489 conversion.
///
/// Offsets are kept as stored in the file, i.e. relative to their own
/// field position; use [`VgmHeader::data_start`] and
/// [`VgmHeader::loop_start`] for absolute positions.
pub struct VgmHeader {
    pub version: u32,
    pub sn76489_clock: u32,
    pub total_samples: u32,
    pub loop_offset: u32,
    pub loop_samples: u32,
    pub sample_rate: u32,
    pub data_offset: u32,
}

impl VgmHeader {
    /// Parse the header at the start of `bytes`.
    pub fn parse(bytes: &[u8]) -> Result<VgmHeader, ParseError> {
        if bytes.len() < VGM_MIN_HEADER_SIZE {
            return Err(ParseError::HeaderTooShort(format!(
                "vgm: base header (0x{:X})",
                VGM_MIN_HEADER_SIZE
            )));
        }

        let ident = read_slice(bytes, 0x00, 4)?;
        if ident != b"Vgm " {
            let mut id: [u8; 4] = [0; 4];
            id.copy_from_slice(ident);
            return Err(ParseError::InvalidIdent(id));
        }

        let version = read_u32_le_at(bytes, 0x08)?;
        // The data offset field was added in 1.50.
        let data_offset = if version >= 0x0000_0150 {
            read_u32_le_at(bytes, 0x34)?
        } else {
            0
        };

        Ok(VgmHeader {
            version,
            sn76489_clock: read_u32_le_at(bytes, 0x0C)?,
            total_samples: read_u32_le_at(bytes, 0x18)?,
            loop_offset: read_u32_le_at(bytes, 0x1C)?,
            loop_samples: read_u32_le_at(bytes, 0x20)?,
            sample_rate: read_u32_le_at(bytes, 0x24)?,
            data_offset,
        })
    }

    /// Absolute position of the first command.
    pub fn data_start(&self) -> usize {
        if self.data_offset == 0 {
            VGM_LEGACY_DATA_START
        } else {
            0x34usize.wrapping_add(self.data_offset as usize)
        }
    }

    /// Absolute position of the loop command, if the file loops.
    pub fn loop_start(&self) -> Option<usize> {
        (self.loop_offset != 0).then(|| 0x1Cusize.wrapping_add(self.loop_offset as usize))
    }
}

impl TryFrom<&[u8]> for VgmHeader {
    type Error = ParseError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        VgmHeader::parse(bytes)
    }
}
