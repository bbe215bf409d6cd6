//! Block-aware copy and paste.
//!
//! A copy carries two flavors: the coded blocks as JSON under
//! [`BLOCK_PASTEBOARD_TYPE`] for lossless pastes between documents, and
//! plain text for everything else. Pasting plain text that looks like
//! markdown imports it as blocks; other text goes through the regular edit
//! path, where newlines split blocks.

use std::ops::Range;
use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use super::{CodedBlock, CodingError, decode_blocks, encode_blocks, markdown};
use crate::blocks::BlockKind;
use crate::editing::BlockDocument;

/// Private pasteboard type carrying coded block JSON.
pub const BLOCK_PASTEBOARD_TYPE: &str = "text.block";
pub const PLAIN_TEXT_TYPE: &str = "text/plain";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClipboardContent {
    /// Coded block JSON ([`BLOCK_PASTEBOARD_TYPE`]).
    pub blocks: Option<String>,
    pub plain_text: Option<String>,
}

impl ClipboardContent {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            blocks: None,
            plain_text: Some(text.into()),
        }
    }

    /// Flavors present, by pasteboard type.
    pub fn types(&self) -> Vec<&'static str> {
        let mut types = Vec::new();
        if self.blocks.is_some() {
            types.push(BLOCK_PASTEBOARD_TYPE);
        }
        if self.plain_text.is_some() {
            types.push(PLAIN_TEXT_TYPE);
        }
        types
    }
}

fn markdown_pattern() -> &'static Regex {
    static MARKDOWN: OnceLock<Regex> = OnceLock::new();
    MARKDOWN.get_or_init(|| {
        Regex::new(r"(?m)^(#{1,6} |[-*+] |\d+\. |```)|\*\*[^*\n]+\*\*|`[^`\n]+`|\[[^\]\n]+\]\([^)\n]+\)")
            .expect("Invalid markdown regex")
    })
}

/// Whether plain text should be imported as markdown rather than typed in.
pub fn looks_like_markdown(text: &str) -> bool {
    markdown_pattern().is_match(text)
}

impl BlockDocument {
    /// Copy `range`. Blocks partly covered by the range are clipped to it.
    pub fn copy(&self, range: Range<usize>) -> Result<ClipboardContent, CodingError> {
        if range.is_empty() || range.end > self.len() {
            return Ok(ClipboardContent::default());
        }
        let range = self.buffer.char_range(range);
        let mut coded = Vec::new();
        let mut lines = Vec::new();
        for index in self.block_range(range.clone()) {
            let block = &self.blocks[index];
            if block.kind() == BlockKind::Image {
                // images are copied whole once their placeholder is covered
                if range.start <= block.offset && range.end > block.offset {
                    coded.push(self.encode_block(index, self.content_range(index)));
                }
                continue;
            }
            let content = self.content_range(index);
            let start = range.start.max(content.start);
            let clipped = start..range.end.min(content.end).max(start);
            coded.push(self.encode_block(index, clipped.clone()));
            lines.push(self.buffer.substring(clipped));
        }
        Ok(ClipboardContent {
            blocks: Some(encode_blocks(&coded)?),
            plain_text: Some(lines.join("\n")),
        })
    }

    /// Paste over `range`. Returns whether the document changed.
    pub fn paste(&mut self, range: Range<usize>, content: &ClipboardContent) -> Result<bool, CodingError> {
        if self.settings.read_only {
            return Ok(false);
        }
        let coded = match (&content.blocks, &content.plain_text) {
            (Some(json), _) => decode_blocks(json)?,
            (None, Some(text)) if looks_like_markdown(text) => markdown::import(text),
            (None, Some(text)) => {
                debug!("pasting {} units of plain text", text.len());
                self.begin_editing();
                self.transaction.label = "Paste";
                let changed = self.request_edit(range, text);
                self.end_editing();
                return Ok(changed);
            }
            (None, None) => return Ok(false),
        };
        self.begin_editing();
        self.transaction.label = "Paste";
        let changed = self.paste_blocks(range, &coded);
        self.end_editing();
        changed
    }

    fn paste_blocks(&mut self, range: Range<usize>, coded: &[CodedBlock]) -> Result<bool, CodingError> {
        if coded.is_empty() {
            return Ok(false);
        }
        for block in coded {
            block.validate()?;
        }
        if !range.is_empty() {
            self.request_edit(range.clone(), "");
        }
        let caret = self
            .transaction
            .caret
            .unwrap_or_else(|| range.start.min(self.len()));

        // one inline piece of text goes straight into the current block
        if let [single] = coded
            && single.kind() != BlockKind::Image
            && single.kind() != BlockKind::Code
        {
            let inserted = self.request_edit(caret..caret, single.string());
            let start = self.index_at(caret);
            let content_start = self.content_range(start).start;
            let at = caret.max(content_start);
            for run in single.runs() {
                let styled = at + run.range.start..at + run.range.end;
                if !styled.is_empty() && styled.end <= self.len() {
                    self.buffer.modify_attributes(styled, |attributes| {
                        attributes.inline = run.styles;
                        attributes.link = run.link.clone();
                        attributes.page_link = run.page_link.clone();
                    });
                }
            }
            return Ok(inserted);
        }

        let created = self.create_blocks_at(coded, caret)?;
        debug!("pasted blocks {created:?}");
        Ok(true)
    }
}
