//! VGM command stream reader.
//!
//! Walks the command stream from the header's data offset and turns it into
//! an [`EventLog`]:
//! - `0x50` PSG writes go through an [`Sn76489Latch`] and become logical
//!   register writes.
//! - Waits (`0x61`, `0x62`, `0x63`, `0x7n` and the wait part of `0x8n`)
//!   become [`Event::Wait`].
//! - The command at the header's loop offset gets an [`Event::LoopStart`]
//!   in front of it.
//! - `0x66` ends the stream.
//!
//! Every other command is skipped by its encoded length. Each skipped
//! opcode is reported once with a warning; parsing carries on.

use crate::binutil::{ParseError, read_u8_at, read_u16_le_at, read_u32_le_at};
use crate::chip::sn76489::Sn76489Latch;
use crate::event::{Event, EventLog};
use crate::vgm::header::VgmHeader;

/// A parsed VGM file reduced to what the encoder consumes.
#[derive(Debug, Clone)]
pub struct VgmSource {
    pub header: VgmHeader,
    pub log: EventLog,
    /// Commands that were skipped because they do not drive the SN76489.
    pub skipped_commands: usize,
}

impl TryFrom<&[u8]> for VgmSource {
    type Error = ParseError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        parse_vgm(bytes)
    }
}

/// Operand length of commands this reader skips, by opcode.
///
/// Returns `None` for opcodes that are not part of the VGM command set.
/// Data blocks (`0x67`) have a variable length and are handled separately.
fn skipped_operand_len(opcode: u8) -> Option<usize> {
    match opcode {
        0x30..=0x3F => Some(1),
        0x40..=0x4E => Some(2),
        0x4F => Some(1),
        0x51..=0x5F => Some(2),
        0x68 => Some(11),
        0x80..=0x8F => Some(0),
        0x90 | 0x91 | 0x95 => Some(4),
        0x92 => Some(5),
        0x93 => Some(10),
        0x94 => Some(1),
        0xA0..=0xBF => Some(2),
        0xC0..=0xDF => Some(3),
        0xE0..=0xFF => Some(4),
        _ => None,
    }
}

/// Map out-of-range reads inside a command to end-of-input.
fn truncated<T>(r: Result<T, ParseError>) -> Result<T, ParseError> {
    r.map_err(|_| ParseError::UnexpectedEof)
}

/// Parse a complete (uncompressed) VGM file.
pub fn parse_vgm(bytes: &[u8]) -> Result<VgmSource, ParseError> {
    let header = VgmHeader::parse(bytes)?;
    tracing::info!(
        version = format_args!("{:x}", header.version),
        clock_hz = header.sn76489_clock,
        rate_hz = header.sample_rate,
        loop_offset = format_args!("{:#x}", header.loop_offset),
        "vgm header"
    );

    let loop_start = header.loop_start();
    let mut log = EventLog::new();
    let mut latch = Sn76489Latch::new();
    let mut reported = [false; 256];
    let mut skipped_commands = 0usize;
    let mut off = header.data_start();

    loop {
        if Some(off) == loop_start {
            log.mark_loop();
        }

        let Some(&opcode) = bytes.get(off) else {
            tracing::debug!(offset = off, "command stream ended without 0x66");
            break;
        };

        match opcode {
            0x50 => {
                let value = truncated(read_u8_at(bytes, off + 1))?;
                log.push(Event::Write(latch.write(value)));
                off += 2;
            }
            0x61 => {
                let samples = truncated(read_u16_le_at(bytes, off + 1))?;
                log.push_wait(u32::from(samples));
                off += 3;
            }
            0x62 => {
                log.push_wait(735);
                off += 1;
            }
            0x63 => {
                log.push_wait(882);
                off += 1;
            }
            0x66 => break,
            0x70..=0x7F => {
                log.push_wait(u32::from(opcode & 0x0F) + 1);
                off += 1;
            }
            0x67 => {
                // 0x67 0x66 tt ss ss ss ss <data>
                let size = truncated(read_u32_le_at(bytes, off + 3))? as usize;
                let next = off + 7 + size;
                if next > bytes.len() {
                    return Err(ParseError::UnexpectedEof);
                }
                report_skip(&mut reported, opcode, off);
                skipped_commands += 1;
                off = next;
            }
            other => {
                let len = skipped_operand_len(other).unwrap_or(0);
                if off + 1 + len > bytes.len() {
                    return Err(ParseError::UnexpectedEof);
                }
                // YM2612 DAC write with wait: keep the timing
                if (0x80..=0x8F).contains(&other) && other & 0x0F != 0 {
                    log.push_wait(u32::from(other & 0x0F));
                }
                report_skip(&mut reported, other, off);
                skipped_commands += 1;
                off += 1 + len;
            }
        }
    }

    tracing::debug!(
        events = log.len(),
        skipped_commands,
        looped = log.has_loop(),
        "vgm command stream read"
    );

    Ok(VgmSource {
        header,
        log,
        skipped_commands,
    })
}

fn report_skip(reported: &mut [bool; 256], opcode: u8, offset: usize) {
    let seen = &mut reported[usize::from(opcode)];
    if !*seen {
        *seen = true;
        if skipped_operand_len(opcode).is_some() || opcode == 0x67 {
            tracing::warn!(
                opcode = format_args!("{:#04x}", opcode),
                offset = format_args!("{:#x}", offset),
                "skipping unsupported command"
            );
        } else {
            tracing::warn!(
                opcode = format_args!("{:#04x}", opcode),
                offset = format_args!("{:#x}", offset),
                "unknown command"
            );
        }
    }
}
