//! Conversions between UTF-16 code unit offsets (the unit every block offset
//! is expressed in) and UTF-8 byte offsets inside Rust strings.

/// Number of UTF-16 code units needed to encode `text`.
pub fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// Byte offset in `text` corresponding to `offset` UTF-16 code units.
///
/// Offsets past the end clamp to `text.len()`. An offset that falls between
/// the two halves of a surrogate pair resolves to the end of that character.
pub fn byte_offset(text: &str, offset: usize) -> usize {
    let mut units = 0;
    for (byte, ch) in text.char_indices() {
        if units >= offset {
            return byte;
        }
        units += ch.len_utf16();
    }
    text.len()
}

/// UTF-16 offset of the byte offset `byte` in `text`.
pub fn utf16_offset(text: &str, byte: usize) -> usize {
    utf16_len(&text[..byte.min(text.len())])
}

/// Slice `text` by a UTF-16 range.
pub fn slice(text: &str, range: std::ops::Range<usize>) -> &str {
    let start = byte_offset(text, range.start);
    let end = byte_offset(text, range.end).max(start);
    &text[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_offsets_match_bytes() {
        assert_eq!(utf16_len("hello"), 5);
        assert_eq!(byte_offset("hello", 3), 3);
        assert_eq!(utf16_offset("hello", 3), 3);
    }

    #[test]
    fn test_bmp_and_astral_characters() {
        let text = "•a🦀b";
        // '•' is 3 bytes / 1 unit, '🦀' is 4 bytes / 2 units
        assert_eq!(utf16_len(text), 5);
        assert_eq!(byte_offset(text, 1), 3);
        assert_eq!(byte_offset(text, 2), 4);
        assert_eq!(byte_offset(text, 4), 8);
        assert_eq!(utf16_offset(text, 8), 4);
        assert_eq!(slice(text, 2..4), "🦀");
    }

    #[test]
    fn test_offsets_past_end_clamp() {
        assert_eq!(byte_offset("ab", 10), 2);
        assert_eq!(slice("ab", 1..10), "b");
    }
}
