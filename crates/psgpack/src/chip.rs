//! Chip-side types: the logical register model and SN76489 port handling.
pub mod register;
pub mod sn76489;

pub use register::{Register, RegisterSink, RegisterState, RegisterWrite};
pub use sn76489::{Sn76489Latch, Sn76489Port};
