//! Fixed-size overlapping window chunker.
//!
//! Splits page text into windows of exactly `size` characters where
//! consecutive windows from the same source share exactly `overlap`
//! characters. The final window may be shorter. Dropping the first
//! `overlap` characters of every window after the first reconstructs
//! the original text.

/// One window of source text, addressed by char offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub source_url: String,
    pub start_offset: usize,
    pub text: String,
    pub is_final: bool,
}

/// Split `text` into overlapping windows tagged with their source URL.
///
/// Offsets and lengths are counted in chars, so multi-byte input never
/// splits inside a code point. `overlap` must be strictly below `size`;
/// the config layer guarantees this, and out-of-range values are clamped
/// here rather than panicking.
pub fn split(source_url: &str, text: &str, size: usize, overlap: usize) -> Vec<Chunk> {
    let size = size.max(1);
    let overlap = overlap.min(size - 1);

    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= size {
        return vec![Chunk {
            source_url: source_url.to_string(),
            start_offset: 0,
            text: text.to_string(),
            is_final: true,
        }];
    }

    let stride = size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + size).min(chars.len());
        let is_final = end == chars.len();
        chunks.push(Chunk {
            source_url: source_url.to_string(),
            start_offset: start,
            text: chars[start..end].iter().collect(),
            is_final,
        });
        if is_final {
            break;
        }
        start += stride;
    }

    chunks
}

/// Truncate to at most `max` chars, snapping to a char boundary.
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
