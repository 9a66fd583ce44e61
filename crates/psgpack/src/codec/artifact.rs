//! The encoded artifact: frame table, compressed index table and the loop
//! constants the player needs.

use std::fmt::{self, Write};

use crate::codec::compress::LoopPoint;

/// Everything the player needs, and nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub frame_table: Vec<u8>,
    pub index_table: Vec<u16>,
    pub loop_point: LoopPoint,
}

impl Artifact {
    /// Number of words in the compressed index table (the end-of-stream
    /// marker).
    pub fn stream_length(&self) -> u16 {
        self.index_table.len() as u16
    }

    pub fn loop_outer(&self) -> u16 {
        self.loop_point.outer
    }

    pub fn loop_inner(&self) -> u16 {
        self.loop_point.inner
    }

    pub fn loop_segment_end(&self) -> u16 {
        self.loop_point.segment_end
    }

    /// Size of both tables in bytes.
    pub fn total_bytes(&self) -> usize {
        self.frame_table.len() + self.index_table.len() * 2
    }

    /// Render the artifact as a C header with the loop constants as
    /// `#define`s and both tables as `static const` arrays.
    pub fn write_c_header<W: Write>(&self, out: &mut W) -> fmt::Result {
        writeln!(out, "#define LOOP_FRAME_INDEX_INNER {}", self.loop_inner())?;
        writeln!(out, "#define LOOP_FRAME_INDEX_OUTER {}", self.loop_outer())?;
        writeln!(out, "#define LOOP_FRAME_SEGMENT_END {}", self.loop_segment_end())?;
        writeln!(out, "#define END_FRAME_INDEX {}", self.stream_length())?;
        writeln!(out)?;

        writeln!(out, "static const uint8_t frame_data [] = {{")?;
        write_rows(out, &self.frame_table, 16, |b| format!("0x{:02x}", b))?;
        writeln!(out, "}};")?;
        writeln!(out)?;

        writeln!(out, "static const uint16_t index_data [] = {{")?;
        write_rows(out, &self.index_table, 8, |w| format!("0x{:04x}", w))?;
        writeln!(out, "}};")
    }

    pub fn to_c_header(&self) -> String {
        let mut s = String::new();
        // writing into a String cannot fail
        let _ = self.write_c_header(&mut s);
        s
    }
}

fn write_rows<W: Write, T: Copy>(
    out: &mut W,
    values: &[T],
    per_row: usize,
    fmt_value: impl Fn(T) -> String,
) -> fmt::Result {
    for (row_index, row) in values.chunks(per_row).enumerate() {
        let last_row = (row_index + 1) * per_row >= values.len();
        let cells: Vec<String> = row.iter().map(|v| fmt_value(*v)).collect();
        write!(out, "    {}", cells.join(", "))?;
        writeln!(out, "{}", if last_row { "" } else { "," })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_c_header_layout() {
        let artifact = Artifact {
            frame_table: (0u8..18).collect(),
            index_table: vec![0x0001, 0x1004, 0x8000],
            loop_point: LoopPoint {
                outer: 1,
                inner: 0,
                segment_end: 1,
            },
        };

        let expected = "\
#define LOOP_FRAME_INDEX_INNER 0
#define LOOP_FRAME_INDEX_OUTER 1
#define LOOP_FRAME_SEGMENT_END 1
#define END_FRAME_INDEX 3

static const uint8_t frame_data [] = {
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f,
    0x10, 0x11
};

static const uint16_t index_data [] = {
    0x0001, 0x1004, 0x8000
};
";
        assert_eq!(artifact.to_c_header(), expected);
        assert_eq!(artifact.total_bytes(), 18 + 6);
    }
}
