//! Markdown shortcuts applied while typing.
//!
//! Runs after every single-character insertion. Block shortcuts only fire in
//! text blocks when the caret sits right after the trigger at the start of
//! the block; inline shortcuts scan the text before the caret when a closing
//! `*` or `` ` `` is typed. At most one rule fires per keystroke.

use std::ops::Range;
use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use super::BlockDocument;
use super::transaction::DeferredCommand;
use crate::blocks::BlockKind;
use crate::blocks::code::is_fence_trigger;
use crate::buffer::utf16::utf16_offset;
use crate::style::InlineStyle;

fn bold_pattern() -> &'static Regex {
    static BOLD: OnceLock<Regex> = OnceLock::new();
    BOLD.get_or_init(|| {
        Regex::new(r"(?:^|[^*])(\*\*)([^*\s](?:[^*]*[^*\s])?)(\*\*)$").expect("Invalid bold regex")
    })
}

fn italic_pattern() -> &'static Regex {
    static ITALIC: OnceLock<Regex> = OnceLock::new();
    ITALIC.get_or_init(|| {
        Regex::new(r"(?:^|[^*])(\*)([^*\s](?:[^*]*[^*\s])?)(\*)$").expect("Invalid italic regex")
    })
}

fn code_pattern() -> &'static Regex {
    static CODE: OnceLock<Regex> = OnceLock::new();
    CODE.get_or_init(|| Regex::new(r"(?:^|[^`])(`)([^`]+)(`)$").expect("Invalid code regex"))
}

/// Block conversion for the text before the caret: target kind and the
/// number of trigger characters consumed.
pub fn block_trigger(before: &str, after: &str) -> Option<(BlockKind, usize)> {
    match before {
        "# " => Some((BlockKind::Header1, 2)),
        "## " => Some((BlockKind::Header2, 3)),
        "* " | "- " => Some((BlockKind::List, 2)),
        "1. " => Some((BlockKind::OrderedList, 3)),
        _ if is_fence_trigger(before, after) => Some((BlockKind::Code, 3)),
        _ => None,
    }
}

/// Delimiter and inner ranges (UTF-16, relative to `before`) of an inline
/// span closed by the last character of `before`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineMatch {
    pub style: InlineStyle,
    pub open: Range<usize>,
    pub inner: Range<usize>,
    pub close: Range<usize>,
}

pub fn inline_trigger(before: &str) -> Option<InlineMatch> {
    let candidates: &[(&Regex, InlineStyle)] = match before.chars().last() {
        Some('*') => &[
            (bold_pattern(), InlineStyle::Bold),
            (italic_pattern(), InlineStyle::Italic),
        ],
        Some('`') => &[(code_pattern(), InlineStyle::Code)],
        _ => return None,
    };
    let units = |byte: usize| utf16_offset(before, byte);
    candidates.iter().find_map(|(pattern, style)| {
        let captures = pattern.captures(before)?;
        let (open, inner, close) = (captures.get(1)?, captures.get(2)?, captures.get(3)?);
        Some(InlineMatch {
            style: *style,
            open: units(open.start())..units(open.end()),
            inner: units(inner.start())..units(inner.end()),
            close: units(close.start())..units(close.end()),
        })
    })
}

impl BlockDocument {
    pub(crate) fn process_markdown(&mut self, index: usize) {
        let block = &self.blocks[index];
        let kind = block.kind();
        if !kind.processes_markdown() {
            return;
        }
        let Some(caret) = self.transaction.caret else {
            return;
        };
        let content = self.content_range(index);
        if caret < content.start || caret > content.end {
            return;
        }
        let before = self.buffer.substring(content.start..caret);
        let after = self.buffer.substring(caret..content.end);

        if kind == BlockKind::Text
            && let Some((target, consumed)) = block_trigger(&before, &after)
        {
            debug!("markdown shortcut: block {index} becomes {target}");
            let start = content.start;
            self.replace_in_block(index, start..start + consumed, "");
            self.convert_block(index, target, 0);
            self.transaction.promoted = true;
            return;
        }

        if let Some(found) = inline_trigger(&before) {
            debug!("markdown shortcut: {:?} in block {index}", found.style);
            let base = content.start;
            let shift = |r: &Range<usize>| base + r.start..base + r.end;
            self.buffer
                .modify_attributes(shift(&found.inner), |a| a.inline.insert(found.style));
            self.replace_in_block(index, shift(&found.close), "");
            self.replace_in_block(index, shift(&found.open), "");
            self.transaction.promoted = true;
            return;
        }

        if before.ends_with("[[") {
            self.defer(DeferredCommand::OpenPageLinkPrompt {
                range: caret - 2..caret,
            });
        }
    }
}
