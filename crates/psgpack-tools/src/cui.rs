//! Subcommand implementations.

use std::path::Path;

use anyhow::Context;
use psgpack::codec::{Encoded, Encoder, EncoderConfig};
use psgpack::vgm::VgmSource;

pub mod convert;
pub mod info;
pub mod play;
pub mod verify;

/// Parse `bytes` as VGM and encode it, keeping capacity diagnostics in the
/// result instead of failing.
pub(crate) fn encode_file(
    path: &Path,
    bytes: Vec<u8>,
    config: EncoderConfig,
) -> anyhow::Result<(VgmSource, Encoded)> {
    let source = VgmSource::try_from(bytes.as_slice())
        .with_context(|| format!("failed to parse VGM: {}", path.display()))?;
    if !source.log.has_loop() {
        tracing::debug!("no loop point; playback restarts from the top");
    }

    let mut encoder = Encoder::new(config);
    for event in &source.log {
        encoder.push(event);
    }
    Ok((source, encoder.finish_unchecked()))
}

/// Ticks in one full pass over the stream, and the tick the loop resumes at.
pub(crate) fn pass_ticks(encoded: &Encoded) -> (u64, u64) {
    let delays = encoded.index_words.iter().map(|w| u64::from(w.delay()));
    let pass: u64 = delays.clone().sum();
    let resume = if encoded.loop_offset >= encoded.index_words.len() {
        0
    } else {
        delays.take(encoded.loop_offset).sum()
    };
    (pass, resume)
}
