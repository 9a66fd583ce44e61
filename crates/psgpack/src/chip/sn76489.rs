//! SN76489 (PSG) port semantics.
//!
//! The chip is driven through a single write port using latch and data
//! bytes:
//! - Latch byte (bit 7 = 1): bits 6-4 select the register
//!   (`0` tone0, `1` vol0, `2` tone1, `3` vol1, `4` tone2, `5` vol2,
//!   `6` noise, `7` vol3) and bits 3-0 carry the low nibble.
//! - Data byte (bit 7 = 0): carries the high six bits of the latched tone
//!   period, or the 4-bit value of a latched noise/volume register.
//!
//! [`Sn76489Latch`] turns a stream of port bytes into logical
//! [`RegisterWrite`]s and [`Sn76489Port`] does the reverse for playback.

use crate::chip::register::{Register, RegisterSink, RegisterState, RegisterWrite};

/// Register selected by bits 6-4 of a latch byte.
fn latched_register(select: u8) -> Register {
    match select & 0x07 {
        0 => Register::Tone0,
        1 => Register::Volume0,
        2 => Register::Tone1,
        3 => Register::Volume1,
        4 => Register::Tone2,
        5 => Register::Volume2,
        6 => Register::Noise,
        _ => Register::Volume3,
    }
}

/// Inverse of [`latched_register`].
fn select_bits(register: Register) -> u8 {
    match register {
        Register::Tone0 => 0,
        Register::Volume0 => 1,
        Register::Tone1 => 2,
        Register::Volume1 => 3,
        Register::Tone2 => 4,
        Register::Volume2 => 5,
        Register::Noise => 6,
        Register::Volume3 => 7,
    }
}

/// Latch tracker converting PSG port bytes into logical register writes.
///
/// The latch starts on tone 0, matching a freshly reset chip.
#[derive(Debug, Clone)]
pub struct Sn76489Latch {
    latched: Register,
    state: RegisterState,
}

impl Default for Sn76489Latch {
    fn default() -> Self {
        Self::new()
    }
}

impl Sn76489Latch {
    pub fn new() -> Self {
        Self {
            latched: Register::Tone0,
            state: RegisterState::new(),
        }
    }

    /// Feed one port byte and return the resulting logical write, which
    /// always carries the full new value of the affected register.
    pub fn write(&mut self, byte: u8) -> RegisterWrite {
        if byte & 0x80 != 0 {
            self.latched = latched_register(byte >> 4);
        }
        let register = self.latched;

        let current = self.state.get(register);
        let value = match (byte & 0x80 != 0, register.is_tone()) {
            (true, true) => (current & 0x3F0) | u16::from(byte & 0x0F),
            (false, true) => (current & 0x00F) | (u16::from(byte & 0x3F) << 4),
            (_, false) => u16::from(byte & 0x0F),
        };

        let write = RegisterWrite::new(register, value);
        self.state.apply(write);
        write
    }

    /// Register state accumulated from every byte written so far.
    pub fn state(&self) -> &RegisterState {
        &self.state
    }
}

/// Encode one logical write as the PSG port bytes that produce it.
///
/// Tone periods take a latch byte with the low nibble followed by a data
/// byte with the high six bits; every other register fits in the latch.
pub fn encode_write(write: RegisterWrite, mut out: impl FnMut(u8)) {
    let latch = 0x80 | (select_bits(write.register) << 4) | (write.value & 0x0F) as u8;
    out(latch);
    if write.register.is_tone() {
        out(((write.value >> 4) & 0x3F) as u8);
    }
}

/// Register sink that records the port bytes a real chip would receive.
#[derive(Debug, Clone, Default)]
pub struct Sn76489Port {
    bytes: Vec<u8>,
}

impl Sn76489Port {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the power-on sequence that silences all four channels.
    pub fn mute_all(&mut self) {
        for register in [
            Register::Volume0,
            Register::Volume1,
            Register::Volume2,
            Register::Volume3,
        ] {
            encode_write(RegisterWrite::new(register, 0x0F), |b| self.bytes.push(b));
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Take the recorded bytes, leaving the sink empty.
    pub fn drain(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.bytes)
    }
}

impl RegisterSink for Sn76489Port {
    fn write(&mut self, write: RegisterWrite) {
        encode_write(write, |b| self.bytes.push(b));
    }
}
