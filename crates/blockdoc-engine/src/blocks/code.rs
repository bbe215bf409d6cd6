//! Code block helpers. Code blocks keep their content verbatim (newlines
//! included) and never store the fence itself.

use crate::buffer::utf16::utf16_len;

/// Top and bottom padding reserved around a code block, in points.
pub const CODE_BLOCK_PADDING: f32 = 28.0;

pub const FENCE: &str = "```";

/// End of the first line of `text`, excluding its newline.
pub fn first_line_end(text: &str) -> usize {
    match text.find('\n') {
        Some(byte) => utf16_len(&text[..byte]),
        None => utf16_len(text),
    }
}

/// Whether typing the final backtick of `before` turns the block into code:
/// the fence must be everything before the caret and only whitespace may
/// follow it.
pub fn is_fence_trigger(before: &str, after: &str) -> bool {
    before == FENCE && after.chars().all(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_first_line_end() {
        assert_eq!(first_line_end("let a;\nlet b;"), 6);
        assert_eq!(first_line_end("single"), 6);
        assert_eq!(first_line_end(""), 0);
    }

    #[test]
    fn test_fence_trigger() {
        assert!(is_fence_trigger("```", ""));
        assert!(is_fence_trigger("```", "  "));
        assert!(!is_fence_trigger("```", "rust"));
        assert!(!is_fence_trigger("a```", ""));
    }
}
