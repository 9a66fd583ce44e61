#![doc = include_str!("../README.md")]
//!
//! Crate layout:
//! - [`chip`]: the eight logical PSG registers and SN76489 port handling.
//! - [`event`]: the encoder input, a log of writes and waits.
//! - [`vgm`]: reads a VGM file into an event log.
//! - [`codec`]: the encoder, the artifact and the tick-driven player.
mod binutil;
pub mod chip;
pub mod codec;
pub mod event;
pub mod vgm;

pub use binutil::ParseError;
pub use chip::RegisterSink;
pub use codec::{Artifact, EncodeError, Encoded, EncoderConfig, Player, encode};
pub use event::{Event, EventLog, TickRate};
