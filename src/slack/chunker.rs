//! Splits a message into chunks that fit a transport's size limit.
//!
//! Lines are kept whole wherever possible. A single line longer than the
//! limit is torn into slices marked with [CONTINUATION_MARKER] on each side
//! of the tear.

/// Marks a line that was split mid-content.
pub const CONTINUATION_MARKER: &str = "...";

const MARKER_LEN: usize = CONTINUATION_MARKER.len();

/// Splits `text` into chunks of at most `limit` characters.
///
/// - Empty text yields no chunks.
/// - Text within the limit is returned as a single unmodified chunk.
/// - Otherwise lines are packed greedily; a chunk ends at a line boundary.
/// - A line that alone exceeds the limit is hard-split into slices of
///   `limit - 2 * 3` characters, with whitespace trimmed at every cut and
///   `"..."` appended to all slices but the last and prepended to all
///   slices but the first.
///
/// Lengths are counted in `char`s. `limit` must leave room for two markers
/// plus at least one character of content.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    if char_len(text) <= limit {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut block = String::new();
    let mut block_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = char_len(line);

        if block_len + line_len <= limit {
            block.push_str(line);
            block_len += line_len;
            continue;
        }

        if !block.is_empty() {
            chunks.push(std::mem::take(&mut block));
            block_len = 0;
        }

        if line_len <= limit {
            block.push_str(line);
            block_len = line_len;
        } else {
            chunks.extend(hard_split(line, limit));
        }
    }

    if !block.is_empty() {
        chunks.push(block);
    }

    chunks
}

/// Slices one oversized line, marking every cut.
///
/// Slices left empty by trimming are dropped before the markers are placed.
fn hard_split(line: &str, limit: usize) -> Vec<String> {
    let width = limit.saturating_sub(2 * MARKER_LEN).max(1);
    let chars: Vec<char> = line.chars().collect();
    let slices: Vec<String> = chars
        .chunks(width)
        .map(|slice| slice.iter().collect())
        .collect();
    let last_slice = slices.len().saturating_sub(1);

    let pieces: Vec<&str> = slices
        .iter()
        .enumerate()
        .map(|(i, slice)| {
            let mut piece = slice.as_str();
            if i > 0 {
                piece = piece.trim_start();
            }
            if i < last_slice {
                piece = piece.trim_end();
            }
            piece
        })
        .filter(|piece| !piece.is_empty())
        .collect();
    let last = pieces.len().saturating_sub(1);

    pieces
        .iter()
        .enumerate()
        .map(|(i, piece)| {
            let mut chunk = String::with_capacity(piece.len() + 2 * MARKER_LEN);
            if i > 0 {
                chunk.push_str(CONTINUATION_MARKER);
            }
            chunk.push_str(piece);
            if i < last {
                chunk.push_str(CONTINUATION_MARKER);
            }
            chunk
        })
        .collect()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
