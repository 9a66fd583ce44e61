use std::io::{self, Write};
use std::path::Path;

use anyhow::Context;
use psgpack::chip::{RegisterWrite, Sn76489Port};
use psgpack::codec::{EncoderConfig, Player};

use super::{encode_file, pass_ticks};

fn format_writes(writes: &[RegisterWrite]) -> String {
    writes
        .iter()
        .map(|w| {
            if w.register.is_tone() {
                format!("{:?}={:#05x}", w.register, w.value)
            } else {
                format!("{:?}={:#x}", w.register, w.value)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_port(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run the player over an encoded VGM file and print every tick that
/// produced register writes.
pub fn play(
    path: &Path,
    bytes: Vec<u8>,
    config: EncoderConfig,
    ticks: Option<u64>,
    port: bool,
) -> anyhow::Result<()> {
    let (_, encoded) = encode_file(path, bytes, config)?;
    for diagnostic in &encoded.diagnostics {
        tracing::warn!("{}; playback will be wrong", diagnostic);
    }

    let (pass, resume) = pass_ticks(&encoded);
    let ticks = ticks.unwrap_or(pass + (pass - resume));

    let mut player = Player::new(&encoded.artifact);
    let mut writes: Vec<RegisterWrite> = Vec::new();
    let mut sn = Sn76489Port::new();
    let mut out = io::stdout().lock();

    if port {
        sn.mute_all();
        writeln!(out, "init: {}", format_port(&sn.drain())).context("failed to write to stdout")?;
    }

    for tick in 0..ticks {
        let loops = player.loops();
        let line = if port {
            player.tick(&mut sn);
            let bytes = sn.drain();
            (!bytes.is_empty()).then(|| format_port(&bytes))
        } else {
            player.tick(&mut writes);
            let line = (!writes.is_empty()).then(|| format_writes(&writes));
            writes.clear();
            line
        };

        if let Some(line) = line {
            writeln!(out, "{:>8}: {}", tick, line).context("failed to write to stdout")?;
        }
        if player.loops() != loops {
            writeln!(out, "{:>8}  -- loop --", "").context("failed to write to stdout")?;
        }
    }
    Ok(())
}
