//! The frame/index codec.
//!
//! Build time: [`encoder`] turns an [`EventLog`](crate::event::EventLog)
//! into an [`Artifact`] through three layers, each losslessly invertible:
//! state diffing into [`frame`]s, frame deduplication in the
//! [`dictionary`], and back-reference compression of the [`index`] stream
//! in [`compress`].
//!
//! Run time: the [`player`] expands the artifact back into register
//! writes, one tick at a time.
pub mod artifact;
pub mod compress;
pub mod dictionary;
pub mod encoder;
pub mod frame;
pub mod index;
pub mod player;

pub use artifact::Artifact;
pub use compress::{CompressedStream, LoopPoint, compress, expand};
pub use dictionary::{FRAME_TABLE_CAPACITY, FrameDictionary};
pub use encoder::{EncodeError, EncodeStats, Encoded, Encoder, EncoderConfig, encode};
pub use frame::{Frame, FrameSynthesizer};
pub use index::{IndexEncoder, IndexWord, StreamWord};
pub use player::{Player, PlayerState};
