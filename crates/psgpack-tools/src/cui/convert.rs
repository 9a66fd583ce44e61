use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, bail};
use psgpack::codec::EncoderConfig;

use super::encode_file;

/// Encode a VGM file and write the artifact as a C header to `output`, or
/// to stdout when no output path is given.
pub fn convert(
    path: &Path,
    bytes: Vec<u8>,
    config: EncoderConfig,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let (_, encoded) = encode_file(path, bytes, config)?;
    if let Some(err) = encoded.diagnostics.first() {
        bail!("{}: {}", path.display(), err);
    }

    let header = encoded.artifact.to_c_header();
    match output {
        Some(out) if out != Path::new("-") => {
            fs::write(out, header)
                .with_context(|| format!("failed to write output file: {}", out.display()))?;
            tracing::info!(output = %out.display(), "header written");
        }
        _ => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(header.as_bytes())
                .context("failed to write to stdout")?;
        }
    }
    Ok(())
}
