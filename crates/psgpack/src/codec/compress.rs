//! Back-reference compression of the index stream.
//!
//! Runs of index words that already appear in the compressed output are
//! replaced by a single reference word:
//!
//! ```text
//!  [15]     1
//!  [14..12] run length minus two (2-9 words)
//!  [11..0]  start of the run in the compressed stream
//! ```
//!
//! References only ever point at literal words, since literal index words
//! never have bit 15 set and so never match a reference. The last word of
//! the stream is always a literal: the player jumps to the loop point as
//! soon as it fetches the last word, which would cut a reference short.
//!
//! The loop offset, which counts pre-compression words, is carried through
//! as a [`LoopPoint`]: the compressed word to continue with after the loop
//! segment, plus the segment the player is inside of when it lands on the
//! loop word.

use crate::codec::index::{IndexWord, OFFSET_MASK, StreamWord};

/// Shortest run worth a reference.
pub const MIN_MATCH_LEN: usize = 2;

/// Longest run a reference can describe.
pub const MAX_MATCH_LEN: usize = 9;

/// Largest compressed stream the player's cursors can address.
pub const MAX_STREAM_WORDS: usize = 0x8000;

/// Where playback resumes after the end of the stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopPoint {
    /// Next compressed word to fetch once the loop segment is finished.
    pub outer: u16,
    /// Position of the loop word inside the compressed stream.
    pub inner: u16,
    /// End (exclusive) of the segment holding the loop word.
    pub segment_end: u16,
}

/// Output of [`compress`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedStream {
    pub words: Vec<u16>,
    pub loop_point: LoopPoint,
}

/// Find the longest run in `output` equal to a prefix of `input`.
///
/// Returns `(start, len)`. Among equally long runs the earliest start
/// wins. Only starts that fit the 12-bit reference field are considered.
fn longest_match(output: &[u16], input: &[IndexWord]) -> (usize, usize) {
    let mut best = (0, 0);
    let searchable = output.len().min(usize::from(OFFSET_MASK) + 1);

    for start in 0..searchable {
        let len = output[start..]
            .iter()
            .zip(input)
            .take_while(|(out, word)| **out == word.raw())
            .count();
        if len > best.1 {
            best = (start, len);
        }
    }
    best
}

/// Greedily compress `words`, remapping `loop_offset` (a position in
/// `words`) into a [`LoopPoint`].
///
/// A loop offset at or past the end of `words` loops to the start.
pub fn compress(words: &[IndexWord], loop_offset: usize) -> CompressedStream {
    let mut out: Vec<u16> = Vec::with_capacity(words.len());
    let mut loop_point: Option<LoopPoint> = None;
    let mut i = 0;

    while i < words.len() {
        let (start, len) = longest_match(&out, &words[i..]);
        // leave at least one word for a trailing literal
        let len = len.min(MAX_MATCH_LEN).min(words.len() - i - 1);

        let (consumed, reference) = if len >= MIN_MATCH_LEN {
            out.push(
                StreamWord::Reference {
                    start: start as u16,
                    len: len as u16,
                }
                .to_raw(),
            );
            (len, Some(start))
        } else {
            out.push(words[i].raw());
            (1, None)
        };

        if loop_point.is_none() && i + consumed > loop_offset {
            let outer = out.len();
            let point = match reference {
                Some(start) => {
                    let depth = loop_offset - i;
                    LoopPoint {
                        outer: outer as u16,
                        inner: (start + depth) as u16,
                        segment_end: (start + consumed) as u16,
                    }
                }
                None => LoopPoint {
                    outer: outer as u16,
                    inner: (outer - 1) as u16,
                    segment_end: outer as u16,
                },
            };
            tracing::debug!(
                loop_offset,
                outer = point.outer,
                inner = point.inner,
                segment_end = point.segment_end,
                "loop point remapped"
            );
            loop_point = Some(point);
        }

        i += consumed;
    }

    CompressedStream {
        words: out,
        loop_point: loop_point.unwrap_or_default(),
    }
}

/// Expand a compressed stream back into literal index words.
pub fn expand(stream: &[u16]) -> Vec<IndexWord> {
    fn expand_word(stream: &[u16], raw: u16, out: &mut Vec<IndexWord>) {
        match StreamWord::from_raw(raw) {
            StreamWord::Literal(word) => out.push(word),
            StreamWord::Reference { start, len } => {
                let start = usize::from(start);
                for &inner in &stream[start..start + usize::from(len)] {
                    expand_word(stream, inner, out);
                }
            }
        }
    }

    let mut out = Vec::with_capacity(stream.len());
    for &raw in stream {
        expand_word(stream, raw, &mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(raw: &[u16]) -> Vec<IndexWord> {
        raw.iter().map(|r| IndexWord::from_raw(*r)).collect()
    }

    #[test]
    fn test_no_repeats_stays_literal() {
        let input = words(&[0x0001, 0x0004, 0x1007]);
        let c = compress(&input, 0);
        assert_eq!(c.words, vec![0x0001, 0x0004, 0x1007]);
        assert_eq!(
            c.loop_point,
            LoopPoint {
                outer: 1,
                inner: 0,
                segment_end: 1
            }
        );
    }

    #[test]
    fn test_repeat_becomes_reference() {
        let input = words(&[0x0001, 0x0004, 0x0007, 0x0001, 0x0004, 0x0007, 0x1009]);
        let c = compress(&input, 0);
        // length 3 -> bits 1, start 0
        assert_eq!(c.words, vec![0x0001, 0x0004, 0x0007, 0x9000, 0x1009]);
        assert_eq!(expand(&c.words), input);
    }

    #[test]
    fn test_stream_never_ends_in_reference() {
        let input = words(&[0x0001, 0x0004, 0x0007, 0x0001, 0x0004, 0x0007]);
        let c = compress(&input, 0);
        assert_eq!(c.words, vec![0x0001, 0x0004, 0x0007, 0x8000, 0x0007]);
        assert_eq!(expand(&c.words), input);

        // a one-word tail cannot be referenced either
        let input = words(&[0x0001, 0x0004, 0x0001, 0x0004]);
        let c = compress(&input, 0);
        assert_eq!(c.words, vec![0x0001, 0x0004, 0x0001, 0x0004]);
    }

    #[test]
    fn test_single_word_repeat_is_not_referenced() {
        let input = words(&[0x0001, 0x0002, 0x0001, 0x0003]);
        let c = compress(&input, 0);
        assert_eq!(c.words, vec![0x0001, 0x0002, 0x0001, 0x0003]);
    }

    #[test]
    fn test_match_capped_at_nine() {
        let run: Vec<u16> = (1..=12).collect();
        let mut raw = run.clone();
        raw.extend(&run);
        raw.push(0x100D);
        let input = words(&raw);

        let c = compress(&input, 0);
        // 12 literals, a 9-word reference, a 3-word reference, 1 literal
        assert_eq!(c.words.len(), 15);
        assert_eq!(c.words[12], 0xF000);
        assert_eq!(c.words[13], 0x9009);
        assert_eq!(expand(&c.words), input);
    }

    #[test]
    fn test_earliest_of_equal_matches_wins() {
        let input = words(&[0x0001, 0x0001, 0x0001, 0x0002, 0x0001, 0x0001, 0x0003]);
        let c = compress(&input, 0);
        // [1, 1] is found at both 0 and 1 of the output; 0 is taken
        assert_eq!(c.words, vec![0x0001, 0x0001, 0x0001, 0x0002, 0x8000, 0x0003]);
        assert_eq!(expand(&c.words), input);
    }

    #[test]
    fn test_loop_inside_reference() {
        let input = words(&[0x0001, 0x0004, 0x0007, 0x0001, 0x0004, 0x0007, 0x1009]);
        // loop on the second word of the repeated run
        let c = compress(&input, 4);
        assert_eq!(
            c.loop_point,
            LoopPoint {
                outer: 4,
                inner: 1,
                segment_end: 3
            }
        );
    }

    #[test]
    fn test_loop_on_literal() {
        let input = words(&[0x0001, 0x0004, 0x0007, 0x0001, 0x0004, 0x0007]);
        let c = compress(&input, 2);
        assert_eq!(
            c.loop_point,
            LoopPoint {
                outer: 3,
                inner: 2,
                segment_end: 3
            }
        );
    }

    #[test]
    fn test_loop_past_end_loops_to_start() {
        let input = words(&[0x0001, 0x0004]);
        let c = compress(&input, 2);
        assert_eq!(c.loop_point, LoopPoint::default());
    }

    #[test]
    fn test_empty_stream() {
        let c = compress(&[], 0);
        assert!(c.words.is_empty());
        assert!(expand(&c.words).is_empty());
    }
}
