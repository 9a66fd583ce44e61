use std::path::Path;

use comfy_table::{Cell, ContentArrangement, Table, presets::NOTHING};
use psgpack::codec::{EncoderConfig, FRAME_TABLE_CAPACITY};
use psgpack::event::SAMPLE_RATE;

use super::{encode_file, pass_ticks};

/// Print encoding statistics for a VGM file as a two-column table.
pub fn info(path: &Path, bytes: Vec<u8>, config: EncoderConfig) -> anyhow::Result<()> {
    let (source, encoded) = encode_file(path, bytes, config)?;
    let header = &source.header;
    let stats = &encoded.stats;
    let loop_point = encoded.artifact.loop_point;
    let (pass, resume) = pass_ticks(&encoded);

    let seconds = source.log.total_samples() as f64 / f64::from(SAMPLE_RATE);
    let diagnostics = if encoded.diagnostics.is_empty() {
        "(none)".to_string()
    } else {
        encoded
            .diagnostics
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    };

    let rows: Vec<(&str, String)> = vec![
        ("File", path.display().to_string()),
        ("VGM version", format!("{:x}.{:02x}", header.version >> 8, header.version & 0xFF)),
        ("SN76489 clock", format!("{} Hz", header.sn76489_clock)),
        (
            "Duration",
            format!("{} samples ({:.3} s)", source.log.total_samples(), seconds),
        ),
        (
            "Header samples",
            format!("{} total, {} in loop", header.total_samples, header.loop_samples),
        ),
        ("Samples / tick", config.samples_per_tick.to_string()),
        ("Skipped commands", source.skipped_commands.to_string()),
        ("Register writes", stats.writes.to_string()),
        ("Frames", stats.frames.to_string()),
        ("Unique frames", stats.unique_frames.to_string()),
        (
            "Frame table",
            format!("{} / {} bytes", stats.frame_bytes, FRAME_TABLE_CAPACITY),
        ),
        ("Index words", stats.index_words.to_string()),
        ("Compressed words", stats.compressed_words.to_string()),
        ("Total size", format!("{} bytes", stats.total_bytes)),
        ("Ticks / pass", pass.to_string()),
        (
            "Loop",
            format!("word {} (tick {})", encoded.loop_offset, resume),
        ),
        (
            "Loop (outer, inner, end)",
            format!(
                "({}, {}, {})",
                loop_point.outer, loop_point.inner, loop_point.segment_end
            ),
        ),
        ("Diagnostics", diagnostics),
    ];

    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    for (key, value) in rows {
        table.add_row(vec![Cell::new(key), Cell::new(value)]);
    }
    println!("{}", table);
    Ok(())
}
