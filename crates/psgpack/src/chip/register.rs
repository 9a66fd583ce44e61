//! Logical register model for the SN76489 PSG.
//!
//! The chip is reduced to eight logical registers: three 10-bit tone
//! periods, the 4-bit noise mode and four 4-bit attenuation values. Every
//! other part of the crate (frame synthesis, playback, the VGM reader)
//! talks in terms of these registers rather than raw port bytes.

/// One of the eight logical PSG registers.
///
/// The declaration order is the fixed field order used by frames: the
/// header bit of a register is `1 << index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Register {
    Tone0,
    Tone1,
    Tone2,
    Noise,
    Volume0,
    Volume1,
    Volume2,
    Volume3,
}

impl Register {
    /// All registers in frame field order.
    pub const ALL: [Register; 8] = [
        Register::Tone0,
        Register::Tone1,
        Register::Tone2,
        Register::Noise,
        Register::Volume0,
        Register::Volume1,
        Register::Volume2,
        Register::Volume3,
    ];

    /// Position of the register in frame field order (0-7).
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Header bit announcing that this register changed.
    pub const fn bit(self) -> u8 {
        1 << (self as u8)
    }

    /// Number of 4-bit nibbles used to carry the value in a frame.
    pub const fn nibbles(self) -> usize {
        if self.is_tone() { 3 } else { 1 }
    }

    /// Mask of the bits the register actually holds.
    pub const fn value_mask(self) -> u16 {
        if self.is_tone() { 0x03FF } else { 0x000F }
    }

    pub const fn is_tone(self) -> bool {
        matches!(self, Register::Tone0 | Register::Tone1 | Register::Tone2)
    }

    /// Look a register up by its frame field index.
    pub fn from_index(index: usize) -> Option<Register> {
        Register::ALL.get(index).copied()
    }
}

/// A single logical register write: the register and its full new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegisterWrite {
    pub register: Register,
    pub value: u16,
}

impl RegisterWrite {
    pub fn new(register: Register, value: u16) -> Self {
        Self {
            register,
            value: value & register.value_mask(),
        }
    }
}

/// Receiver of logical register writes.
pub trait RegisterSink {
    fn write(&mut self, write: RegisterWrite);
}

impl RegisterSink for Vec<RegisterWrite> {
    fn write(&mut self, write: RegisterWrite) {
        self.push(write);
    }
}

/// Snapshot of all eight logical registers.
///
/// The default state has every register at zero, which is also the state
/// both the encoder and the player start from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RegisterState {
    values: [u16; 8],
}

impl RegisterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, register: Register) -> u16 {
        self.values[register.index()]
    }

    /// Set a register, masking the value to the register's width.
    pub fn set(&mut self, register: Register, value: u16) {
        self.values[register.index()] = value & register.value_mask();
    }

    pub fn apply(&mut self, write: RegisterWrite) {
        self.set(write.register, write.value);
    }

    /// Header-style bitmask of the registers that differ from `previous`.
    pub fn changed_mask(&self, previous: &RegisterState) -> u8 {
        Register::ALL
            .iter()
            .filter(|r| self.get(**r) != previous.get(**r))
            .fold(0u8, |mask, r| mask | r.bit())
    }

    /// Writes that turn `previous` into `self`, in frame field order.
    pub fn diff<'a>(
        &'a self,
        previous: &'a RegisterState,
    ) -> impl Iterator<Item = RegisterWrite> + 'a {
        Register::ALL
            .into_iter()
            .filter(move |r| self.get(*r) != previous.get(*r))
            .map(move |r| RegisterWrite::new(r, self.get(r)))
    }
}

impl RegisterSink for RegisterState {
    fn write(&mut self, write: RegisterWrite) {
        self.apply(write);
    }
}
