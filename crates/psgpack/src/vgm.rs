//! VGM reading.
//!
//! Only the parts of the format that drive an SN76489 are interpreted;
//! see [`parser`] for how the command stream is reduced to an
//! [`EventLog`](crate::event::EventLog).
mod header;
pub mod parser;

pub use header::{VGM_LEGACY_DATA_START, VGM_MIN_HEADER_SIZE, VgmHeader};
pub use parser::{VgmSource, parse_vgm};
