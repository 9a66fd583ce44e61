use std::fs::File;
use std::io::{Read, stdin};
use std::path::Path;

use anyhow::Context;
use flate2::read::GzDecoder;

fn is_gzip_magic(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[0] == 0x1F && bytes[1] == 0x8B
}

fn has_gzip_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("vgz") || ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false)
}

fn gunzip(bytes: &[u8]) -> anyhow::Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(bytes);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .context("gzip decompression failed")?;
    Ok(out)
}

/// Read VGM bytes from a path or stdin ('-') into a Vec<u8>.
///
/// Gzipped input (`.vgz`/`.gz`, or anything starting with the gzip magic
/// bytes 0x1F 0x8B) is decompressed.
pub fn read_vgm_as_vec(path: &Path) -> anyhow::Result<Vec<u8>> {
    let mut data = Vec::new();
    if path == Path::new("-") {
        stdin()
            .read_to_end(&mut data)
            .context("failed to read from stdin")?;
    } else {
        File::open(path)
            .with_context(|| format!("failed to open input file: {}", path.display()))?
            .read_to_end(&mut data)
            .with_context(|| format!("failed to read input file: {}", path.display()))?;
    }

    if has_gzip_extension(path) || is_gzip_magic(&data) {
        gunzip(&data)
    } else {
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    #[test]
    fn test_gzip_detection() {
        assert!(has_gzip_extension(Path::new("song.VGZ")));
        assert!(has_gzip_extension(Path::new("song.vgm.gz")));
        assert!(!has_gzip_extension(Path::new("song.vgm")));
        assert!(is_gzip_magic(&[0x1F, 0x8B, 0x08]));
        assert!(!is_gzip_magic(b"Vgm "));
    }

    #[test]
    fn test_gunzip() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"Vgm payload").unwrap();
        let packed = encoder.finish().unwrap();
        assert_eq!(gunzip(&packed).unwrap(), b"Vgm payload");
    }
}
