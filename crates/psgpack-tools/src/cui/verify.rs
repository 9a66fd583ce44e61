use std::path::Path;

use anyhow::bail;
use psgpack::chip::RegisterState;
use psgpack::codec::{EncoderConfig, Player, expand};
use psgpack::event::{Event, EventLog};

use super::encode_file;

/// Register state for every tick, quantized the way the encoder does it:
/// writes accumulate until a whole tick of waiting separates them from
/// the next write, the loop marker closes the ticks waited before it, and
/// trailing writes hold for at least one tick.
fn quantized_timeline(log: &EventLog, samples_per_tick: u32) -> Vec<RegisterState> {
    let spt = u64::from(samples_per_tick.max(1));
    let mut timeline = Vec::new();
    let mut state = RegisterState::new();
    let mut pending = 0u64;
    let mut dirty = false;
    let mut looped = false;

    let hold = |timeline: &mut Vec<RegisterState>, state: RegisterState, pending: &mut u64| {
        let ticks = *pending / spt;
        *pending -= ticks * spt;
        timeline.extend(std::iter::repeat_n(state, ticks.max(1) as usize));
    };

    for event in log {
        match event {
            Event::Write(write) => {
                if pending >= spt {
                    hold(&mut timeline, state, &mut pending);
                    dirty = false;
                }
                state.apply(*write);
                dirty = true;
            }
            Event::Wait(samples) => pending += u64::from(*samples),
            Event::LoopStart if !looped => {
                looped = true;
                if pending >= spt {
                    hold(&mut timeline, state, &mut pending);
                    dirty = false;
                }
            }
            Event::LoopStart => {}
        }
    }
    if timeline.is_empty() || dirty || pending >= spt {
        hold(&mut timeline, state, &mut pending);
    }
    timeline
}

/// Check the encoded stream against its source: the compressed index
/// table must expand to the pre-compression words, and one pass of the player
/// must reproduce the quantized register timeline.
pub fn verify(path: &Path, bytes: Vec<u8>, config: EncoderConfig) -> anyhow::Result<()> {
    let (source, encoded) = encode_file(path, bytes, config)?;
    if let Some(err) = encoded.diagnostics.first() {
        bail!("{}: {}", path.display(), err);
    }

    let expanded = expand(&encoded.artifact.index_table);
    if expanded != encoded.index_words {
        let at = expanded
            .iter()
            .zip(&encoded.index_words)
            .position(|(a, b)| a != b)
            .unwrap_or(expanded.len().min(encoded.index_words.len()));
        bail!(
            "{}: compressed stream differs from index words at word {} ({} vs {} words)",
            path.display(),
            at,
            expanded.len(),
            encoded.index_words.len()
        );
    }
    tracing::info!(words = expanded.len(), "index stream expands losslessly");

    let timeline = quantized_timeline(&source.log, config.samples_per_tick);
    let mut player = Player::new(&encoded.artifact);
    let mut state = RegisterState::new();
    for (tick, expected) in timeline.iter().enumerate() {
        player.tick(&mut state);
        if state != *expected {
            bail!(
                "{}: register state differs at tick {}: {:?} vs {:?}",
                path.display(),
                tick,
                state,
                expected
            );
        }
    }
    tracing::info!(ticks = timeline.len(), "playback matches source");

    println!("{}: OK", path.display());
    Ok(())
}
