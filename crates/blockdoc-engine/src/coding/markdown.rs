//! Markdown interchange.
//!
//! [`import`] turns markdown into coded blocks so pasted or opened markdown
//! lands as real headers, lists and code blocks with inline styles.
//! [`export`] goes the other way, regenerating markers, fences and emphasis
//! delimiters. Underline and highlight have no markdown form and are dropped
//! on export.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use super::{CodedBlock, CodedImage, CodedList, CodedRange, CodedRun, CodedText};
use crate::blocks::BlockKind;
use crate::blocks::list::number_run;
use crate::buffer::utf16::slice;
use crate::buffer::utf16_len;
use crate::style::{InlineStyle, InlineStyles};

/// Parse markdown into coded blocks.
pub fn import(markdown: &str) -> Vec<CodedBlock> {
    let parser = Parser::new_ext(markdown, Options::ENABLE_STRIKETHROUGH);
    let mut importer = MarkdownImporter::new();

    for event in parser {
        importer.process_event(event);
    }

    importer.finalize()
}

/// Handles the state needed to turn the pulldown-cmark event stream into
/// flat blocks.
///
/// Nested lists arrive inside their parent item:
///
/// ```markdown
/// - Parent
///   - Child
/// ```
///
/// gives `Start(List)`, `Start(Item)`, `Text("Parent")`, `Start(List)`,
/// `Start(Item)`, `Text("Child")`, `End(Item)`, `End(List)`, `End(Item)`,
/// `End(List)`. The parent's text is flushed as its own block when the
/// nested list starts; the depth of `lists` is the indentation level.
struct MarkdownImporter {
    blocks: Vec<CodedBlock>,

    /// Text of the block being built, with its style runs.
    text: String,
    runs: Vec<CodedRun>,

    /// Inline styles and link target applied to incoming text.
    styles: InlineStyles,
    link: Option<String>,

    heading: Option<HeadingLevel>,

    /// One entry per open list: whether it is ordered.
    lists: Vec<bool>,
    /// One entry per open item: whether its text was already flushed.
    items: Vec<bool>,

    in_code_block: bool,
    /// Inside an image; its alt text is not content.
    in_image: bool,
}

impl MarkdownImporter {
    fn new() -> Self {
        Self {
            blocks: Vec::new(),
            text: String::new(),
            runs: Vec::new(),
            styles: InlineStyles::empty(),
            link: None,
            heading: None,
            lists: Vec::new(),
            items: Vec::new(),
            in_code_block: false,
            in_image: false,
        }
    }

    fn process_event(&mut self, event: Event) {
        match event {
            Event::Start(Tag::Paragraph) => {
                if !self.items.is_empty() && !self.text.is_empty() {
                    self.push_text(" ");
                }
            }
            Event::End(TagEnd::Paragraph) => {
                if self.items.is_empty() {
                    self.flush(BlockKind::Text);
                }
            }
            Event::Start(Tag::Heading { level, .. }) => {
                self.flush_pending();
                self.heading = Some(level);
            }
            Event::End(TagEnd::Heading(_)) => {
                let kind = match self.heading.take() {
                    Some(HeadingLevel::H1) => BlockKind::Header1,
                    _ => BlockKind::Header2,
                };
                self.flush(kind);
            }
            Event::Start(Tag::List(first)) => {
                self.flush_item();
                self.lists.push(first.is_some());
            }
            Event::End(TagEnd::List(_)) => {
                self.lists.pop();
            }
            Event::Start(Tag::Item) => {
                self.items.push(false);
            }
            Event::End(TagEnd::Item) => {
                self.flush_item();
                self.items.pop();
            }
            Event::Start(Tag::CodeBlock(_)) => {
                // the fence info string is not kept
                self.flush_item();
                self.flush_pending();
                self.in_code_block = true;
            }
            Event::End(TagEnd::CodeBlock) => {
                self.in_code_block = false;
                if self.text.ends_with('\n') {
                    self.text.pop();
                }
                self.flush(BlockKind::Code);
            }
            Event::Start(Tag::Emphasis) => self.styles.insert(InlineStyle::Italic),
            Event::End(TagEnd::Emphasis) => self.styles.remove(InlineStyle::Italic),
            Event::Start(Tag::Strong) => self.styles.insert(InlineStyle::Bold),
            Event::End(TagEnd::Strong) => self.styles.remove(InlineStyle::Bold),
            Event::Start(Tag::Strikethrough) => self.styles.insert(InlineStyle::Strikethrough),
            Event::End(TagEnd::Strikethrough) => self.styles.remove(InlineStyle::Strikethrough),
            Event::Start(Tag::Link { dest_url, .. }) => {
                self.link = Some(dest_url.to_string());
            }
            Event::End(TagEnd::Link) => {
                self.link = None;
            }
            Event::Start(Tag::Image { dest_url, .. }) => {
                self.flush_item();
                self.flush_pending();
                self.in_image = true;
                self.blocks.push(CodedBlock::Image(CodedImage {
                    key: Some(dest_url.to_string()),
                    width: 0.0,
                    height: 0.0,
                }));
            }
            Event::End(TagEnd::Image) => {
                self.in_image = false;
            }
            Event::Text(text) => {
                if self.in_image {
                    return;
                }
                self.push_text(&text);
            }
            Event::Code(code) => {
                let styles = self.styles;
                self.styles.insert(InlineStyle::Code);
                self.push_text(&code);
                self.styles = styles;
            }
            Event::SoftBreak | Event::HardBreak => {
                if !self.in_image {
                    self.push_text(" ");
                }
            }
            _ => {}
        }
    }

    fn push_text(&mut self, text: &str) {
        let start = utf16_len(&self.text);
        self.text.push_str(text);
        if self.in_code_block || (self.styles.is_empty() && self.link.is_none()) {
            return;
        }
        let end = utf16_len(&self.text);
        match self.runs.last_mut() {
            Some(last)
                if last.range.end == start && last.styles == self.styles && last.link == self.link =>
            {
                last.range.end = end;
            }
            _ => self.runs.push(CodedRun {
                range: CodedRange { start, end },
                styles: self.styles,
                link: self.link.clone(),
                page_link: None,
            }),
        }
    }

    /// Flush the text of the innermost open item as a list block, once.
    fn flush_item(&mut self) {
        let Some(flushed) = self.items.last().copied() else {
            return;
        };
        if flushed {
            // trailing text after an image or nested list inside the item
            if !self.text.is_empty() {
                self.flush(BlockKind::Text);
            }
            return;
        }
        let ordered = self.lists.last().copied().unwrap_or(false);
        let kind = if ordered {
            BlockKind::OrderedList
        } else {
            BlockKind::List
        };
        self.flush(kind);
        if let Some(flushed) = self.items.last_mut() {
            *flushed = true;
        }
    }

    /// Text outside any item that has not been claimed by a block yet.
    fn flush_pending(&mut self) {
        if self.items.is_empty() && !self.text.is_empty() {
            self.flush(BlockKind::Text);
        }
    }

    fn flush(&mut self, kind: BlockKind) {
        let string = std::mem::take(&mut self.text);
        let runs = std::mem::take(&mut self.runs);
        let block = match kind {
            BlockKind::List | BlockKind::OrderedList => {
                let level = self.lists.len().saturating_sub(1) as u8;
                let list = CodedList {
                    string,
                    runs,
                    indentation_level: level.min(kind.max_indentation_level()),
                    marker_length: 0,
                };
                if kind == BlockKind::List {
                    CodedBlock::List(list)
                } else {
                    CodedBlock::OrderedList(list)
                }
            }
            _ => {
                if kind == BlockKind::Text && string.is_empty() {
                    return;
                }
                let text = CodedText { string, runs };
                match kind {
                    BlockKind::Header1 => CodedBlock::Header1(text),
                    BlockKind::Header2 => CodedBlock::Header2(text),
                    BlockKind::Code => CodedBlock::Code(text),
                    _ => CodedBlock::Text(text),
                }
            }
        };
        self.blocks.push(block);
    }

    fn finalize(mut self) -> Vec<CodedBlock> {
        self.flush_pending();
        self.blocks
    }
}

/// Render coded blocks as markdown.
pub fn export(blocks: &[CodedBlock]) -> String {
    let ordered_levels: Vec<u8> = blocks
        .iter()
        .map(|block| match block {
            CodedBlock::OrderedList(list) => list.indentation_level,
            _ => 0,
        })
        .collect();
    let mut positions = vec![0; blocks.len()];
    let mut start = 0;
    while start < blocks.len() {
        if blocks[start].kind() != BlockKind::OrderedList {
            start += 1;
            continue;
        }
        let mut end = start;
        while end < blocks.len() && blocks[end].kind() == BlockKind::OrderedList {
            end += 1;
        }
        for (offset, position) in number_run(&ordered_levels[start..end]).into_iter().enumerate() {
            positions[start + offset] = position;
        }
        start = end;
    }

    let mut out = String::new();
    let mut previous: Option<BlockKind> = None;
    for (block, position) in blocks.iter().zip(positions) {
        let line = match block {
            CodedBlock::Text(text) => render_inline(&text.string, &text.runs),
            CodedBlock::Header1(text) => format!("# {}", render_inline(&text.string, &text.runs)),
            CodedBlock::Header2(text) => format!("## {}", render_inline(&text.string, &text.runs)),
            CodedBlock::List(list) => format!(
                "{}- {}",
                "  ".repeat(usize::from(list.indentation_level)),
                render_inline(&list.string, &list.runs)
            ),
            CodedBlock::OrderedList(list) => format!(
                "{}{}. {}",
                "   ".repeat(usize::from(list.indentation_level)),
                position + 1,
                render_inline(&list.string, &list.runs)
            ),
            CodedBlock::Code(text) => format!("```\n{}\n```", text.string),
            CodedBlock::Image(image) => format!("![]({})", image.key.as_deref().unwrap_or("")),
        };
        if line.is_empty() {
            continue;
        }
        let kind = block.kind();
        if let Some(previous) = previous {
            let same_list = previous == kind && kind.is_list();
            out.push_str(if same_list { "\n" } else { "\n\n" });
        }
        out.push_str(&line);
        previous = Some(kind);
    }
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

/// Wrap styled runs of `text` in their markdown delimiters.
fn render_inline(text: &str, runs: &[CodedRun]) -> String {
    let mut out = String::new();
    let mut cursor = 0;
    let len = utf16_len(text);
    for run in runs {
        let CodedRange { start, end } = run.range;
        if start < cursor || end > len {
            continue;
        }
        out.push_str(slice(text, cursor..start));
        let mut piece = slice(text, start..end).to_string();
        if run.styles.contains(InlineStyle::Code) {
            piece = format!("`{piece}`");
        }
        if run.styles.contains(InlineStyle::Strikethrough) {
            piece = format!("~~{piece}~~");
        }
        if run.styles.contains(InlineStyle::Italic) {
            piece = format!("*{piece}*");
        }
        if run.styles.contains(InlineStyle::Bold) {
            piece = format!("**{piece}**");
        }
        if let Some(page) = &run.page_link {
            piece = format!("[[{}]]", page.title);
        } else if let Some(link) = &run.link {
            piece = format!("[{piece}]({link})");
        }
        out.push_str(&piece);
        cursor = end;
    }
    out.push_str(slice(text, cursor..len));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::BlockDocument;
    use pretty_assertions::assert_eq;

    const NOTES: &str = "# Groceries\n\nBuy **fresh** bread and `jam`.\n\n- dairy\n  - milk\n- fruit\n\n1. list\n2. shop\n\n```\nlet total = 3;\nprint(total);\n```\n";

    #[test]
    fn test_import_kinds_and_levels() {
        let mut doc = BlockDocument::new();
        doc.load(&import(NOTES)).unwrap();
        insta::assert_snapshot!(doc.outline(), @r#"
        0: header1 "Groceries"
        1: text "Buy fresh bread and jam."
        2: list level=0 "dairy"
        3: list level=1 "milk"
        4: list level=0 "fruit"
        5: orderedList level=0 position=0 "list"
        6: orderedList level=0 position=1 "shop"
        7: code "let total = 3;\nprint(total);"
        8: text ""
        "#);
    }

    #[test]
    fn test_import_inline_runs() {
        let blocks = import("Buy **fresh** bread and `jam`.");
        let runs = blocks[0].runs();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].range, CodedRange { start: 4, end: 9 });
        assert_eq!(runs[0].styles, InlineStyles::from(InlineStyle::Bold));
        assert_eq!(runs[1].range, CodedRange { start: 20, end: 23 });
        assert_eq!(runs[1].styles, InlineStyles::from(InlineStyle::Code));
    }

    #[test]
    fn test_import_links_and_images() {
        let blocks = import("See [docs](https://example.com).\n\n![chart](chart.png)\n");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].string(), "See docs.");
        assert_eq!(blocks[0].runs()[0].link.as_deref(), Some("https://example.com"));
        assert_eq!(
            blocks[1],
            CodedBlock::Image(CodedImage {
                key: Some("chart.png".to_string()),
                width: 0.0,
                height: 0.0,
            })
        );
    }

    #[test]
    fn test_export_regenerates_markdown() {
        let mut doc = BlockDocument::new();
        doc.load(&import(NOTES)).unwrap();
        let markdown = export(&doc.serialize());
        insta::assert_snapshot!(markdown.trim_end(), @r"
        # Groceries

        Buy **fresh** bread and `jam`.

        - dairy
          - milk
        - fruit

        1. list
        2. shop

        ```
        let total = 3;
        print(total);
        ```
        ");
    }

    #[test]
    fn test_export_numbers_nested_ordered_items() {
        let item = |level: u8, text: &str| {
            CodedBlock::OrderedList(CodedList {
                string: text.to_string(),
                runs: Vec::new(),
                indentation_level: level,
                marker_length: 0,
            })
        };
        let blocks = vec![item(0, "a"), item(1, "b"), item(1, "c"), item(0, "d")];
        assert_eq!(export(&blocks), "1. a\n   1. b\n   2. c\n2. d\n");
    }
}
