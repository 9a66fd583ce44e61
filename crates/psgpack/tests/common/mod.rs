#![allow(dead_code)]

use psgpack::chip::{Register, RegisterState, RegisterWrite};
use psgpack::codec::{Artifact, Player};
use psgpack::event::{Event, EventLog};

pub const NTSC: u32 = 735;

/// A short tune: an eight-step phrase repeated with one variation, so the
/// index stream has both repeats and long delays.
pub fn tune() -> EventLog {
    const TONES: [u16; 8] = [0x1AC, 0x17D, 0x152, 0x140, 0x11D, 0x0FE, 0x0E2, 0x0D5];
    const TICKS: [u32; 8] = [1, 2, 1, 3, 12, 1, 2, 9];

    let mut log = EventLog::new();
    log.push_write(Register::Volume3, 0xF);
    for rep in 0..6u16 {
        for step in 0..8 {
            let tone = if rep == 3 && step == 5 {
                0x0A0
            } else {
                TONES[step]
            };
            log.push_write(Register::Tone0, tone);
            log.push_write(Register::Volume0, (step as u16) % 3);
            if step % 4 == 0 {
                log.push_write(Register::Tone1, tone >> 1);
                log.push_write(Register::Noise, 0x4 | (rep & 0x3));
            }
            log.push_wait(TICKS[step] * NTSC);
        }
    }
    log
}

/// Register state at every tick of the log, with each wait quantized to
/// whole ticks. Only valid for logs whose waits are whole ticks.
pub fn quantized_timeline(log: &EventLog, samples_per_tick: u32) -> Vec<RegisterState> {
    let mut timed: Vec<(u64, RegisterWrite)> = Vec::new();
    let mut now = 0u64;
    for event in log {
        match event {
            Event::Write(w) => timed.push((now, *w)),
            Event::Wait(n) => now += u64::from(*n),
            Event::LoopStart => {}
        }
    }

    let ticks = log.total_samples() / u64::from(samples_per_tick);
    let mut state = RegisterState::new();
    let mut next = 0;
    (0..ticks)
        .map(|tick| {
            let at = tick * u64::from(samples_per_tick);
            while next < timed.len() && timed[next].0 <= at {
                state.apply(timed[next].1);
                next += 1;
            }
            state
        })
        .collect()
}

/// Writes emitted on each of the first `ticks` ticks.
pub fn play_ticks(artifact: &Artifact, ticks: usize) -> Vec<Vec<RegisterWrite>> {
    let mut player = Player::new(artifact);
    (0..ticks)
        .map(|_| {
            let mut writes: Vec<RegisterWrite> = Vec::new();
            player.tick(&mut writes);
            writes
        })
        .collect()
}
