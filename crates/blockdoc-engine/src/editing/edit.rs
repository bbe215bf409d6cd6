//! Edit classification and the per-kind edit hooks.
//!
//! An edit request `(range, text)` is classified once against the block that
//! owns `range.start`, then handed to that block's hook. Hooks mutate the
//! buffer through the document primitives and ask the document to split,
//! merge or convert blocks when boundaries change.

use std::ops::Range;

use log::debug;

use super::BlockDocument;
use crate::blocks::code::first_line_end;
use crate::blocks::list::{bullet_marker, clamp_level, ordered_marker};
use crate::blocks::{BlockKind, BlockVariant};
use crate::buffer::utf16::utf16_offset;
use crate::buffer::utf16_len;
use crate::style::Attributes;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    /// Zero-length range, no newline in the text.
    Insert,
    /// Non-empty range inside one block, no newline in the text.
    Replace,
    /// Text with at least one newline, range inside one block: splits it.
    ReplaceWithLines { first_newline: usize },
    /// Exactly the block's trailing separator is deleted: merges with the
    /// next block.
    DeleteLastCharacter,
    /// The range reaches past the owning block's content.
    MultiBlockEdit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edit {
    pub kind: EditKind,
    pub block_index: usize,
    pub range: Range<usize>,
    pub text: String,
}

impl BlockDocument {
    /// The single mutation entry point for text input. Returns whether the
    /// edit was accepted and changed the document. A range end that falls
    /// inside a surrogate pair is widened to the whole character.
    pub fn request_edit(&mut self, range: Range<usize>, text: &str) -> bool {
        let range = self.buffer.char_range(range);
        let Some(kind) = self.should_change_text(range.clone(), text) else {
            debug!("edit {range:?} {text:?} vetoed");
            return false;
        };
        let edit = Edit {
            kind,
            block_index: self.index_at(range.start),
            range,
            text: text.to_string(),
        };
        debug!(
            "edit {:?} in block {} as {:?}",
            edit.range, edit.block_index, edit.kind
        );
        // nested edits belong to the edit that opened the transaction
        let outermost = !self.is_editing();
        self.begin_editing();
        if outermost {
            self.transaction.last_edit = Some(edit.clone());
        }
        let accepted = self.dispatch_edit(&edit);
        self.end_editing();
        accepted
    }

    /// Gatekeeper for every edit: `None` vetoes the edit before anything is
    /// mutated.
    ///
    /// # Panics
    /// Panics when `range` lies outside the buffer.
    pub fn should_change_text(&self, range: Range<usize>, text: &str) -> Option<EditKind> {
        assert!(
            range.start <= range.end && range.end <= self.len(),
            "edit range {range:?} out of bounds (len: {})",
            self.len()
        );
        if self.settings.read_only || (range.is_empty() && text.is_empty()) {
            return None;
        }
        Some(self.classify_edit(&self.buffer.char_range(range), text))
    }

    pub fn classify_edit(&self, range: &Range<usize>, text: &str) -> EditKind {
        let index = self.index_at(range.start);
        let block = &self.blocks[index];
        let has_separator = self.separator_len(index) == 1;
        let end = block.end();
        if range.end > end {
            return EditKind::MultiBlockEdit;
        }
        if has_separator && range.end == end {
            // the separator is part of the range
            if text.is_empty() && range.start == end - 1 {
                return EditKind::DeleteLastCharacter;
            }
            return EditKind::MultiBlockEdit;
        }
        if let Some(byte) = text.find('\n') {
            return EditKind::ReplaceWithLines {
                first_newline: utf16_offset(text, byte),
            };
        }
        if range.is_empty() {
            EditKind::Insert
        } else {
            EditKind::Replace
        }
    }

    fn dispatch_edit(&mut self, edit: &Edit) -> bool {
        match edit.kind {
            EditKind::MultiBlockEdit => self.replace_multi_block(edit.range.clone(), &edit.text),
            EditKind::DeleteLastCharacter => self.did_delete_last_character(edit.block_index),
            _ => match self.blocks[edit.block_index].kind() {
                BlockKind::List | BlockKind::OrderedList => self.edit_list_block(edit),
                BlockKind::Image => self.edit_image_block(edit),
                _ => self.edit_block(edit),
            },
        }
    }

    /// Clamp an edit out of the list marker.
    fn will_edit(&self, index: usize, range: Range<usize>) -> Range<usize> {
        let content_start = self.blocks[index].content_start();
        let start = range.start.max(content_start);
        start..range.end.max(start)
    }

    fn edit_block(&mut self, edit: &Edit) -> bool {
        let index = edit.block_index;
        let range = self.will_edit(index, edit.range.clone());
        if range.is_empty() && edit.text.is_empty() {
            return false;
        }
        let inserted = self.replace_in_block(index, range.clone(), &edit.text);
        self.transaction.caret = Some(range.start + inserted);
        match edit.kind {
            EditKind::ReplaceWithLines { .. } if self.blocks[index].kind() != BlockKind::Code => {
                self.resplit(index);
            }
            _ => self.did_edit(index, edit),
        }
        true
    }

    fn did_edit(&mut self, index: usize, edit: &Edit) {
        self.apply_styles(index, false);
        if edit.kind == EditKind::Insert
            && utf16_len(&edit.text) == 1
            && self.settings.markdown_shortcuts
        {
            self.process_markdown(index);
        }
    }

    fn edit_list_block(&mut self, edit: &Edit) -> bool {
        let index = edit.block_index;
        let content = self.content_range(index);
        if edit.text == "\t" && edit.range.is_empty() && edit.range.start == content.start {
            self.transaction.caret = Some(content.start);
            return self.indent_block(index);
        }
        let in_marker = edit.range.end <= content.start
            && edit.range.start < content.start
            && edit.text.is_empty();
        let enter_on_empty = edit.text == "\n" && content.is_empty();
        if in_marker || enter_on_empty {
            self.transaction.caret = Some(content.start);
            self.outdent_or_exit(index);
            return true;
        }
        self.edit_block(edit)
    }

    /// Tab at the start of a list item.
    pub(crate) fn indent_block(&mut self, index: usize) -> bool {
        let block = &self.blocks[index];
        let kind = block.kind();
        let Some(level) = block.indentation_level() else {
            return false;
        };
        let previous = index
            .checked_sub(1)
            .map(|i| &self.blocks[i])
            .filter(|b| b.kind() == kind)
            .and_then(|b| b.indentation_level());
        let target = clamp_level(level + 1, previous, kind.max_indentation_level());
        if target <= level {
            return false;
        }
        self.set_list_level(index, target);
        true
    }

    /// Backspace in the marker, or Enter on an empty item: one level out,
    /// or back to a text block from the top level.
    pub(crate) fn outdent_or_exit(&mut self, index: usize) {
        match self.blocks[index].indentation_level() {
            Some(level) if level > 0 => self.set_list_level(index, level - 1),
            _ => self.convert_block(index, BlockKind::Text, 0),
        }
    }

    pub(crate) fn set_list_level(&mut self, index: usize, level: u8) {
        let block = &self.blocks[index];
        let offset = block.offset;
        let kind = block.kind();
        let Some(item) = block.variant.list_item().copied() else {
            return;
        };
        let level = level.min(kind.max_indentation_level());
        let marker = match kind {
            BlockKind::OrderedList => ordered_marker(level, item.position),
            _ => bullet_marker(level),
        };
        self.replace_in_block_with(
            index,
            offset..offset + item.marker_length,
            &marker,
            Some(Attributes::default()),
        );
        if let Some(item) = self.blocks[index].variant.list_item_mut() {
            item.indentation_level = level;
            item.marker_length = utf16_len(&marker);
        }
        debug!("block {index} now at level {level}");
        self.request_adjacent_updates(index);
        self.apply_styles(index, false);
    }

    /// Change the kind of a text-bearing block, carrying its content over.
    pub(crate) fn convert_block(&mut self, index: usize, kind: BlockKind, level: u8) {
        let block = &self.blocks[index];
        let from = block.kind();
        let offset = block.offset;
        let content = self.will_convert(index);
        if content.start > offset {
            self.replace_in_block(index, offset..content.start, "");
        }
        let variant = BlockVariant::text_kind(kind, level);
        let marker = super::document::marker_text(&variant);
        self.blocks[index].variant = variant;
        if !marker.is_empty() {
            self.replace_in_block_with(index, offset..offset, &marker, Some(Attributes::default()));
        }
        debug!("converted block {index} from {from} to {kind}");
        self.request_adjacent_updates(index);
        self.apply_styles(index, false);
    }

    /// The content that survives a change of kind: everything but the marker.
    pub(crate) fn will_convert(&self, index: usize) -> Range<usize> {
        self.content_range(index)
    }

    fn edit_image_block(&mut self, edit: &Edit) -> bool {
        let index = edit.block_index;
        let offset = self.blocks[index].offset;
        let range = edit.range.clone();

        if range.is_empty() && range.start == offset {
            // typing in front of the image creates blocks before it
            let text = if edit.text.ends_with('\n') {
                edit.text.clone()
            } else {
                format!("{}\n", edit.text)
            };
            let inserted = self.replace_chars(offset..offset, &text, None);
            self.insert_block_raw(index, BlockVariant::Text, inserted);
            self.transaction.caret = Some(offset + utf16_len(&edit.text));
            self.resplit(index);
            return true;
        }

        if range.is_empty() && range.start == offset + 1 {
            // typing after the placeholder creates blocks after it; the image
            // keeps the first inserted newline as its separator
            let text = if edit.text.starts_with('\n') {
                edit.text.clone()
            } else {
                format!("\n{}", edit.text)
            };
            let at = offset + 1;
            let inserted = self.replace_chars(at..at, &text, None);
            self.insert_block_raw(index + 1, BlockVariant::Text, inserted);
            self.transaction.caret = Some(at + inserted);
            self.resplit(index + 1);
            return true;
        }

        if edit.text.is_empty() {
            self.remove_block(index);
            self.transaction.caret = Some(offset);
            return true;
        }
        let end = range.end.min(offset + 1);
        let inserted = self.replace_in_block(index, offset..end, &edit.text);
        self.blocks[index].variant = BlockVariant::Text;
        self.transaction.caret = Some(offset + inserted);
        self.resplit(index);
        true
    }

    /// Backspace over block `index`'s separator.
    fn did_delete_last_character(&mut self, index: usize) -> bool {
        let block = &self.blocks[index];
        let offset = block.offset;
        if block.kind() == BlockKind::Image {
            self.remove_block(index);
            self.transaction.caret = Some(offset);
            return true;
        }
        if self.blocks[index + 1].kind() == BlockKind::Image {
            if self.content_range(index).is_empty() {
                self.remove_block(index);
                self.transaction.caret = Some(offset);
                return true;
            }
            debug!("merging an image into block {index} vetoed");
            return false;
        }
        let separator = self.blocks[index].end() - 1;
        self.replace_multi_block(separator..separator + 1, "")
    }

    /// How block `index` gives up its tail to a merge ending at `end` into a
    /// block of kind `into`. `None` when the block cannot merge at all.
    fn will_merge(&mut self, index: usize, end: usize, into: BlockKind) -> Option<usize> {
        let block = &self.blocks[index];
        match block.kind() {
            BlockKind::Image if end <= block.offset => None,
            BlockKind::List | BlockKind::OrderedList => Some(end.max(block.content_start())),
            BlockKind::Code if into != BlockKind::Code => {
                // only the first line folds; the rest stays a code block
                let content = self.content_range(index);
                let from = end.max(content.start);
                let rest = self.buffer.substring(from..content.end);
                let line_end = first_line_end(&rest);
                if line_end < utf16_len(&rest) {
                    self.split_block_at(index, from + line_end + 1, BlockVariant::Code);
                }
                Some(end)
            }
            _ => Some(end),
        }
    }

    /// Replace a range spanning several blocks.
    ///
    /// The first block keeps its head, the last block surrenders its tail
    /// through `will_merge`, every block in between is consumed, and the
    /// merged block is resplit at any newline in the replacement. The range
    /// may start anywhere inside the first block.
    pub(crate) fn replace_multi_block(&mut self, range: Range<usize>, text: &str) -> bool {
        let mut first = self.index_at(range.start);
        let mut start = range.start;
        let mut end = range.end;
        let mut last = self.index_at(end);

        // a range starting after the placeholder leaves the image whole
        let image = &self.blocks[first];
        if image.kind() == BlockKind::Image && start > image.offset && first < last {
            start = image.end();
            first += 1;
        }

        // an image that is only reached, never entered, stays where it is
        while last > first {
            let block = &self.blocks[last];
            if block.kind() == BlockKind::Image && end <= block.offset {
                end = block.offset - 1;
                last = self.index_at(end);
            } else {
                break;
            }
        }

        let first_block = &self.blocks[first];
        match first_block.kind() {
            BlockKind::Image => {
                start = first_block.offset;
                self.blocks[first].variant = BlockVariant::Text;
            }
            BlockKind::List | BlockKind::OrderedList => {
                start = start.max(first_block.content_start());
            }
            _ => {}
        }
        let end_floor = start;
        end = end.max(end_floor);
        if start == end && text.is_empty() {
            return false;
        }

        if last > first {
            let into = self.blocks[first].kind();
            match self.will_merge(last, end, into) {
                Some(merge_end) => end = merge_end,
                None => return false,
            }
        }

        let first_offset = self.blocks[first].offset;
        let last_end = self.blocks[last].end();
        let removed = end - start;
        let inserted = self.replace_chars(start..end, text, None);
        if last > first {
            self.remove_blocks_raw(first + 1..last + 1);
        }
        self.blocks[first].length = last_end - first_offset - removed + inserted;
        self.mark_dirty(first);
        self.stamp();
        self.transaction.caret = Some(start + inserted);
        debug!("multi-block edit merged blocks {first}..={last}");

        let last_new = self.resplit(first);
        self.request_adjacent_updates(first);
        self.request_adjacent_updates(last_new);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::Selection;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn type_keys(doc: &mut BlockDocument, keys: &str) {
        for ch in keys.chars() {
            let caret = doc.selection().caret_offset().unwrap_or(doc.len());
            match ch {
                '\u{8}' => {
                    if caret > 0 {
                        doc.request_edit(caret - 1..caret, "");
                    }
                }
                _ => {
                    doc.request_edit(caret..caret, &ch.to_string());
                }
            }
        }
    }

    #[rstest]
    #[case(0..0, "x", EditKind::Insert)]
    #[case(0..1, "x", EditKind::Replace)]
    #[case(1..1, "a\nb", EditKind::ReplaceWithLines { first_newline: 1 })]
    #[case(2..3, "", EditKind::DeleteLastCharacter)]
    #[case(1..3, "", EditKind::MultiBlockEdit)]
    #[case(1..4, "z", EditKind::MultiBlockEdit)]
    #[case(3..5, "", EditKind::Replace)]
    fn test_classify_edit(
        #[case] range: Range<usize>,
        #[case] text: &str,
        #[case] expected: EditKind,
    ) {
        let doc = BlockDocument::from_text("ab\ncd");
        assert_eq!(doc.classify_edit(&range, text), expected);
    }

    #[test]
    fn test_empty_and_read_only_edits_are_vetoed() {
        let mut doc = BlockDocument::from_text("ab");
        assert!(!doc.request_edit(1..1, ""));
        doc.set_read_only(true);
        assert!(!doc.request_edit(0..0, "x"));
        assert_eq!(doc.text(), "ab");
        assert_eq!(doc.version(), 0);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_out_of_bounds_edit_panics() {
        let mut doc = BlockDocument::from_text("ab");
        doc.request_edit(1..7, "");
    }

    #[test]
    fn test_enter_splits_header_into_text() {
        let mut doc = BlockDocument::new();
        type_keys(&mut doc, "# Title\n");
        insta::assert_snapshot!(doc.outline(), @r#"
        0: header1 "Title"
        1: text ""
        "#);
        assert_eq!(doc.selection().caret_offset(), Some(6));
    }

    #[test]
    fn test_enter_continues_lists() {
        let mut doc = BlockDocument::new();
        type_keys(&mut doc, "- milk\neggs");
        insta::assert_snapshot!(doc.outline(), @r#"
        0: list level=0 "milk"
        1: list level=0 "eggs"
        "#);
        assert_eq!(doc.text(), "•\tmilk\n•\teggs");
    }

    #[test]
    fn test_enter_on_empty_item_exits_list() {
        let mut doc = BlockDocument::new();
        type_keys(&mut doc, "- milk\n\n");
        insta::assert_snapshot!(doc.outline(), @r#"
        0: list level=0 "milk"
        1: text ""
        "#);
    }

    #[test]
    fn test_tab_indents_below_previous_sibling_only() {
        let mut doc = BlockDocument::new();
        type_keys(&mut doc, "- a\n\t\tb");
        insta::assert_snapshot!(doc.outline(), @r#"
        0: list level=0 "a"
        1: list level=1 "b"
        "#);
        assert_eq!(doc.content(1), "b");
        assert_eq!(doc.text(), "•\ta\n▪\tb");
    }

    #[test]
    fn test_tab_on_first_item_is_ignored() {
        let mut doc = BlockDocument::new();
        type_keys(&mut doc, "- a");
        let content_start = doc.content_range(0).start;
        assert!(!doc.request_edit(content_start..content_start, "\t"));
    }

    #[test]
    fn test_backspace_in_marker_outdents_then_exits() {
        let mut doc = BlockDocument::new();
        type_keys(&mut doc, "- a\n\tb");
        let start = doc.content_range(1).start;
        doc.set_selection(Selection::caret(1, start));
        type_keys(&mut doc, "\u{8}");
        assert_eq!(doc.blocks()[1].indentation_level(), Some(0));
        type_keys(&mut doc, "\u{8}");
        insta::assert_snapshot!(doc.outline(), @r#"
        0: list level=0 "a"
        1: text "b"
        "#);
        type_keys(&mut doc, "\u{8}");
        insta::assert_snapshot!(doc.outline(), @r#"0: list level=0 "ab""#);
    }

    #[test]
    fn test_merge_two_text_blocks() {
        let mut doc = BlockDocument::from_text("AB\nCD");
        assert!(doc.request_edit(2..3, ""));
        insta::assert_snapshot!(doc.outline(), @r#"0: text "ABCD""#);
        assert_eq!(doc.selection().caret_offset(), Some(2));
    }

    #[test]
    fn test_backspace_at_document_start_is_a_no_op() {
        let mut doc = BlockDocument::from_text("AB");
        doc.set_selection(Selection::caret(0, 2));
        type_keys(&mut doc, "\u{8}");
        assert_eq!(doc.text(), "A");
        doc.set_selection(Selection::caret(0, 0));
        type_keys(&mut doc, "\u{8}");
        assert!(!doc.request_edit(0..0, ""));
        assert_eq!(doc.text(), "A");
    }

    #[test]
    fn test_paste_with_lines_splits_block() {
        let mut doc = BlockDocument::new();
        assert!(doc.request_edit(0..0, "one\ntwo\nthree"));
        assert_eq!(doc.block_count(), 3);
        assert_eq!(doc.len(), 13);
        assert_eq!(doc.selection().caret_offset(), Some(13));
    }

    #[test]
    fn test_multi_block_replace_from_mid_block() {
        let mut doc = BlockDocument::from_text("alpha\nbeta\ngamma");
        assert!(doc.request_edit(2..13, "X"));
        insta::assert_snapshot!(doc.outline(), @r#"0: text "alXmma""#);
        doc.check_invariants();
    }

    #[test]
    fn test_merge_list_item_strips_marker() {
        let mut doc = BlockDocument::from_text("intro");
        doc.insert_block(
            1,
            BlockVariant::List(crate::blocks::ListItem::bullet(0)),
            "item",
        );
        // delete from the end of "intro" into the middle of the marker
        assert!(doc.request_edit(5..7, ""));
        insta::assert_snapshot!(doc.outline(), @r#"
        0: text "introitem"
        1: text ""
        "#);
    }

    #[test]
    fn test_code_block_keeps_newlines() {
        let mut doc = BlockDocument::new();
        type_keys(&mut doc, "```");
        type_keys(&mut doc, "fn a() {}\nfn b() {}");
        insta::assert_snapshot!(doc.outline(), @r#"
        0: code "fn a() {}\nfn b() {}"
        1: text ""
        "#);
    }

    #[test]
    fn test_merging_code_folds_only_first_line() {
        let mut doc = BlockDocument::from_text("head");
        doc.insert_block(1, BlockVariant::Code, "one\ntwo");
        // backspace the separator between "head" and the code block
        assert!(doc.request_edit(4..5, ""));
        insta::assert_snapshot!(doc.outline(), @r#"
        0: text "headone"
        1: code "two"
        2: text ""
        "#);
    }

    #[test]
    fn test_backspace_after_astral_character() {
        let mut doc = BlockDocument::from_text("a🦀");
        assert!(doc.request_edit(2..3, ""));
        assert_eq!(doc.text(), "a");
        assert_eq!(doc.len(), 1);
        doc.check_invariants();

        let mut typed = BlockDocument::new();
        type_keys(&mut typed, "x🦀\u{8}y");
        assert_eq!(typed.text(), "xy");
        assert_eq!(typed.selection().caret_offset(), Some(2));
    }

    #[test]
    fn test_insert_inside_surrogate_pair_lands_after_it() {
        let mut doc = BlockDocument::from_text("🦀b");
        assert!(doc.request_edit(1..1, "a"));
        assert_eq!(doc.text(), "🦀ab");
        assert_eq!(doc.len(), 4);
    }

    #[test]
    fn test_delete_from_marker_into_content_keeps_list() {
        let mut doc = BlockDocument::from_text("intro");
        doc.insert_block(1, BlockVariant::List(crate::blocks::ListItem::bullet(0)), "abcd");
        let offset = doc.blocks()[1].offset;
        let content = doc.content_range(1);

        assert!(doc.request_edit(offset + 1..content.start + 2, ""));
        assert_eq!(doc.blocks()[1].kind(), BlockKind::List);
        assert_eq!(doc.content(1), "cd");

        let content = doc.content_range(1);
        assert!(doc.request_edit(offset..content.end, ""));
        assert_eq!(doc.blocks()[1].kind(), BlockKind::List);
        assert_eq!(doc.content(1), "");
        doc.check_invariants();
    }

    #[test]
    fn test_range_after_image_placeholder_keeps_image() {
        let mut doc = BlockDocument::from_text("intro\nafter");
        doc.insert_image(1, crate::blocks::Attachment::new(8.0, 8.0), Some("img-1".to_string()));
        let separator = doc.blocks()[1].offset + 1;

        assert!(doc.request_edit(separator..separator + 3, ""));
        insta::assert_snapshot!(doc.outline(), @r#"
        0: text "intro"
        1: image "img-1"
        2: text "ter"
        "#);
    }

    #[test]
    fn test_nested_edits_do_not_start_a_typing_group() {
        let mut doc = BlockDocument::from_text("xy");
        doc.begin_editing();
        doc.request_edit(0..2, "");
        doc.request_edit(0..0, "z");
        doc.end_editing();
        assert!(doc.request_edit(1..1, "w"));
        assert_eq!(doc.text(), "zw");

        assert!(doc.undo());
        assert_eq!(doc.text(), "z");
        assert!(doc.undo());
        assert_eq!(doc.text(), "xy");
    }
}
