use std::fmt::Write as _;
use std::ops::Range;

use log::{debug, trace};

use super::transaction::EditTransaction;
use super::undo::{UndoLog, UndoStack};
use super::{DocumentEvent, Selection};
use crate::blocks::list::{bullet_marker, number_run, ordered_marker};
use crate::blocks::{Block, BlockId, BlockKind, BlockVariant, BlockView};
use crate::buffer::utf16::utf16_offset;
use crate::buffer::{BufferObserver, CharacterBuffer, utf16_len};
use crate::style::{Attributes, StyleSheet};

/// Editor behavior switches.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorSettings {
    pub markdown_shortcuts: bool,
    pub undo_limit: usize,
    pub read_only: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            markdown_shortcuts: true,
            undo_limit: 100,
            read_only: false,
        }
    }
}

/// An ordered sequence of blocks over one character buffer.
///
/// The document is never empty: at least one, possibly zero-length, text
/// block exists. Every block but the last ends in a `'\n'` separator, and
/// the last block is never a code or image block.
pub struct BlockDocument {
    pub(crate) buffer: CharacterBuffer,
    pub(crate) blocks: Vec<Block>,
    /// First block whose `offset`/`index` caches are stale.
    dirty_from: Option<usize>,
    pub(crate) selection: Selection,
    pub(crate) transaction: EditTransaction,
    pub(crate) undo_log: Box<dyn UndoLog>,
    pub(crate) styles: StyleSheet,
    pub(crate) settings: EditorSettings,
    pub(crate) version: u64,
    pub(crate) events: Vec<DocumentEvent>,
    pub(crate) invalidated: Vec<Range<usize>>,
    /// Caret at the end of the current typing run, for undo coalescing.
    pub(crate) typing_run_end: Option<usize>,
    next_id: u64,
}

impl BlockDocument {
    pub fn new() -> Self {
        Self::with_settings(EditorSettings::default(), StyleSheet::default())
    }

    pub fn with_settings(settings: EditorSettings, styles: StyleSheet) -> Self {
        let undo_log = Box::new(UndoStack::new(settings.undo_limit));
        Self {
            buffer: CharacterBuffer::new(),
            blocks: vec![Block::new(BlockId(0), BlockVariant::Text, 0)],
            dirty_from: None,
            selection: Selection::caret(0, 0),
            transaction: EditTransaction::default(),
            undo_log,
            styles,
            settings,
            version: 0,
            events: Vec::new(),
            invalidated: Vec::new(),
            typing_run_end: None,
            next_id: 1,
        }
    }

    /// One text block per line of `text`.
    pub fn from_text(text: &str) -> Self {
        let mut doc = Self::new();
        doc.buffer = CharacterBuffer::from_text(text, Attributes::default());
        doc.blocks.clear();
        let lines: Vec<&str> = text.split('\n').collect();
        let last = lines.len() - 1;
        for (i, line) in lines.into_iter().enumerate() {
            let length = utf16_len(line) + usize::from(i < last);
            let block = doc.new_block(BlockVariant::Text, length);
            doc.blocks.push(block);
        }
        doc.mark_dirty(0);
        doc.stamp();
        for index in 0..doc.blocks.len() {
            doc.apply_styles(index, false);
        }
        doc.buffer.take_changes();
        doc
    }

    /// Swap in a different undo log implementation.
    pub fn with_undo_log(mut self, undo_log: Box<dyn UndoLog>) -> Self {
        self.undo_log = undo_log;
        self
    }

    pub fn add_observer(&mut self, observer: Box<dyn BufferObserver>) {
        self.buffer.add_observer(observer);
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.settings.read_only = read_only;
    }

    pub fn styles(&self) -> &StyleSheet {
        &self.styles
    }

    pub fn buffer(&self) -> &CharacterBuffer {
        &self.buffer
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Buffer length in UTF-16 code units.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn text(&self) -> String {
        self.buffer.string()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn take_events(&mut self) -> Vec<DocumentEvent> {
        std::mem::take(&mut self.events)
    }

    /// Buffer ranges that need re-layout since the previous call.
    pub fn take_invalidated_ranges(&mut self) -> Vec<Range<usize>> {
        std::mem::take(&mut self.invalidated)
    }

    pub(crate) fn new_block(&mut self, variant: BlockVariant, length: usize) -> Block {
        let id = BlockId(self.next_id);
        self.next_id += 1;
        Block::new(id, variant, length)
    }

    // ---- offset/index caches ----

    pub(crate) fn mark_dirty(&mut self, index: usize) {
        self.dirty_from = Some(self.dirty_from.map_or(index, |d| d.min(index)));
    }

    /// Restamp `offset`/`index` from the first dirty block onwards.
    pub(crate) fn stamp(&mut self) {
        let Some(from) = self.dirty_from.take() else {
            return;
        };
        let from = from.min(self.blocks.len());
        let mut offset = match from {
            0 => 0,
            _ => self.blocks[from - 1].end(),
        };
        for (index, block) in self.blocks.iter_mut().enumerate().skip(from) {
            block.index = index;
            block.offset = offset;
            offset += block.length;
        }
    }

    // ---- lookups ----

    /// Index of the block owning `offset`. The end of the buffer belongs to
    /// the last block.
    pub fn index_at(&self, offset: usize) -> usize {
        let index = self.blocks.partition_point(|b| b.end() <= offset);
        index.min(self.blocks.len() - 1)
    }

    /// Read-only view of the block owning `offset`.
    ///
    /// Binary search over the offset caches, which are always fresh outside
    /// a transaction. Building the view clones the block style, so call it
    /// per gesture rather than per character.
    pub fn block_at(&self, offset: usize) -> BlockView {
        self.view(self.index_at(offset))
    }

    pub fn view(&self, index: usize) -> BlockView {
        let block = &self.blocks[index];
        let kind = block.kind();
        let level = block.indentation_level();
        BlockView {
            id: block.id,
            index: block.index,
            kind,
            range: block.range(),
            content_range: self.content_range(index),
            style: self.styles.block_style(kind, level.unwrap_or(0)),
            indentation_level: level,
            position: match &block.variant {
                BlockVariant::OrderedList(item) => Some(item.position),
                _ => None,
            },
            layout: kind.layout_hints(),
            image_key: match &block.variant {
                BlockVariant::Image(image) => image.key.clone(),
                _ => None,
            },
        }
    }

    /// Half-open range of block indices intersecting `range`.
    pub fn block_range(&self, range: Range<usize>) -> Range<usize> {
        let first = self.index_at(range.start);
        let last = if range.is_empty() {
            first
        } else {
            self.index_at(range.end - 1)
        };
        first..last + 1
    }

    pub(crate) fn separator_len(&self, index: usize) -> usize {
        usize::from(index + 1 < self.blocks.len())
    }

    /// User-editable range of a block: no marker, no separator.
    pub fn content_range(&self, index: usize) -> Range<usize> {
        let block = &self.blocks[index];
        block.content_start()..block.end() - self.separator_len(index)
    }

    pub fn content(&self, index: usize) -> String {
        self.buffer.substring(self.content_range(index))
    }

    // ---- buffer primitives ----

    /// Replace characters, keeping the pending caret current. Block lengths
    /// are the caller's business.
    pub(crate) fn replace_chars(
        &mut self,
        range: Range<usize>,
        text: &str,
        attributes: Option<Attributes>,
    ) -> usize {
        let change = match attributes {
            Some(attributes) => self.buffer.replace_with_attributes(range, text, attributes),
            None => self.buffer.replace(range, text),
        };
        self.transaction.transform_caret(&change);
        change.replacement_len
    }

    /// Replace characters inside block `index`, adjusting its length.
    pub(crate) fn replace_in_block(&mut self, index: usize, range: Range<usize>, text: &str) -> usize {
        self.replace_in_block_with(index, range, text, None)
    }

    pub(crate) fn replace_in_block_with(
        &mut self,
        index: usize,
        range: Range<usize>,
        text: &str,
        attributes: Option<Attributes>,
    ) -> usize {
        let block = &self.blocks[index];
        assert!(
            range.start >= block.offset && range.end <= block.end(),
            "range {range:?} outside block {index} ({:?})",
            block.range()
        );
        let removed = range.len();
        let inserted = self.replace_chars(range, text, attributes);
        let block = &mut self.blocks[index];
        block.length = block.length + inserted - removed;
        self.mark_dirty(index + 1);
        self.stamp();
        inserted
    }

    // ---- block sequence primitives (buffer already updated) ----

    pub(crate) fn insert_block_raw(
        &mut self,
        index: usize,
        variant: BlockVariant,
        length: usize,
    ) -> BlockId {
        let block = self.new_block(variant, length);
        let id = block.id;
        self.blocks.insert(index, block);
        self.mark_dirty(index);
        self.stamp();
        self.request_adjacent_updates(index);
        id
    }

    pub(crate) fn remove_blocks_raw(&mut self, range: Range<usize>) -> Vec<Block> {
        let removed: Vec<Block> = self.blocks.drain(range.clone()).collect();
        self.mark_dirty(range.start);
        self.stamp();
        self.request_adjacent_updates(range.start);
        removed
    }

    /// Split block `index` at buffer offset `at` (just after a newline); the
    /// tail becomes a new block of `variant`.
    pub(crate) fn split_block_at(&mut self, index: usize, at: usize, variant: BlockVariant) {
        let block = &mut self.blocks[index];
        let old_end = block.end();
        block.length = at - block.offset;
        self.insert_block_raw(index + 1, variant, old_end - at);
    }

    /// Ask neighbors that render relative to each other to be refreshed when
    /// the transaction settles.
    pub(crate) fn request_adjacent_updates(&mut self, index: usize) {
        let candidates = [index.checked_sub(1), Some(index), Some(index + 1)];
        for i in candidates.into_iter().flatten() {
            if let Some(block) = self.blocks.get(i)
                && block.kind().wants_adjacent_block_updates()
            {
                self.transaction.renumber.push((block.id, i));
            }
        }
    }

    // ---- buffer-aware block operations ----

    /// Insert blocks with the given contents before block `index`. Inserting
    /// at the end first appends a placeholder text block, so the new blocks
    /// are never last. Returns the indices of the inserted blocks.
    pub fn insert_blocks(&mut self, index: usize, blocks: Vec<(BlockVariant, String)>) -> Range<usize> {
        assert!(index <= self.blocks.len(), "block index {index} out of bounds");
        if blocks.is_empty() {
            return index..index;
        }
        self.begin_editing();
        if index == self.blocks.len() {
            self.append_placeholder();
        }
        let offset = self.blocks[index].offset;
        let mut text = String::new();
        let mut pieces = Vec::with_capacity(blocks.len());
        for (variant, content) in blocks {
            let piece = format!("{}{content}\n", marker_text(&variant));
            pieces.push((variant, utf16_len(&piece)));
            text.push_str(&piece);
        }
        self.replace_chars(offset..offset, &text, Some(Attributes::default()));
        let count = pieces.len();
        for (i, (variant, length)) in pieces.into_iter().enumerate() {
            self.insert_block_raw(index + i, variant, length);
        }
        for i in index..index + count {
            self.apply_styles(i, false);
        }
        debug!("inserted {count} blocks at {index}");
        self.end_editing();
        index..index + count
    }

    pub fn insert_block(&mut self, index: usize, variant: BlockVariant, content: &str) -> usize {
        self.insert_blocks(index, vec![(variant, content.to_string())])
            .start
    }

    /// Remove whole blocks, text included. Removing every block leaves a
    /// single empty text block.
    pub fn remove_blocks(&mut self, range: Range<usize>) -> bool {
        let count = self.blocks.len();
        let range = range.start.min(count)..range.end.min(count);
        if range.is_empty() {
            return false;
        }
        self.begin_editing();
        let len = self.len();
        if range.start == 0 && range.end == count {
            self.replace_chars(0..len, "", None);
            self.blocks.clear();
            let block = self.new_block(BlockVariant::Text, 0);
            self.blocks.push(block);
            self.mark_dirty(0);
            self.stamp();
            self.transaction.caret = Some(0);
        } else if range.end == count {
            // the new last block gives up its separator
            let start = self.blocks[range.start].offset - 1;
            self.replace_chars(start..len, "", None);
            self.blocks[range.start - 1].length -= 1;
            self.remove_blocks_raw(range.clone());
            self.transaction.caret = Some(start);
        } else {
            let start = self.blocks[range.start].offset;
            let end = self.blocks[range.end - 1].end();
            self.replace_chars(start..end, "", None);
            self.remove_blocks_raw(range.clone());
            self.transaction.caret = Some(start);
        }
        debug!("removed blocks {range:?}");
        self.end_editing();
        true
    }

    pub fn remove_block(&mut self, index: usize) -> bool {
        self.remove_blocks(index..index + 1)
    }

    /// Replace block `index` with a new variant and content in place.
    pub fn replace_block(&mut self, index: usize, variant: BlockVariant, content: &str) {
        self.begin_editing();
        let block = &self.blocks[index];
        let range = block.offset..block.end() - self.separator_len(index);
        let text = format!("{}{content}", marker_text(&variant));
        self.replace_in_block_with(index, range, &text, Some(Attributes::default()));
        self.blocks[index].variant = variant;
        self.request_adjacent_updates(index);
        self.apply_styles(index, false);
        self.end_editing();
    }

    /// Give the last block a separator and append an empty text block.
    pub(crate) fn append_placeholder(&mut self) {
        let end = self.len();
        let last = self.blocks.len() - 1;
        self.replace_chars(end..end, "\n", None);
        self.blocks[last].length += 1;
        self.insert_block_raw(last + 1, BlockVariant::Text, 0);
    }

    /// Code and image blocks are never last.
    pub(crate) fn ensure_trailing_text_block(&mut self) {
        let last = &self.blocks[self.blocks.len() - 1];
        if matches!(last.kind(), BlockKind::Code | BlockKind::Image) {
            trace!("appending trailing text block after {}", last.kind());
            self.append_placeholder();
        }
    }

    /// Split the non-code block `index` at each newline in its content.
    /// Continuation blocks take the kind's continuation kind and get their
    /// list marker inserted. Returns the index of the last resulting block.
    pub(crate) fn resplit(&mut self, mut index: usize) -> usize {
        loop {
            let block = &self.blocks[index];
            let kind = block.kind();
            let level = block.indentation_level().unwrap_or(0);
            if matches!(kind, BlockKind::Code | BlockKind::Image) {
                self.apply_styles(index, false);
                return index;
            }
            let content = self.content_range(index);
            let text = self.buffer.substring(content.clone());
            let Some(byte) = text.find('\n') else {
                self.apply_styles(index, false);
                return index;
            };
            let at = content.start + utf16_offset(&text, byte) + 1;
            let variant = BlockVariant::text_kind(kind.continuation(), level);
            let marker = marker_text(&variant);
            self.split_block_at(index, at, variant);
            if !marker.is_empty() {
                self.replace_in_block_with(index + 1, at..at, &marker, Some(Attributes::default()));
            }
            trace!("split block {index} at {at}");
            self.apply_styles(index, false);
            index += 1;
        }
    }

    // ---- ordered list renumbering ----

    pub(crate) fn renumber_pending(&mut self) {
        let pending = std::mem::take(&mut self.transaction.renumber);
        let mut done: Vec<usize> = Vec::new();
        for (id, hint) in pending {
            let index = match self.blocks.get(hint) {
                Some(block) if block.id == id => hint,
                _ => match self.blocks.iter().position(|b| b.id == id) {
                    Some(index) => index,
                    None => continue,
                },
            };
            if self.blocks[index].kind() != BlockKind::OrderedList {
                continue;
            }
            let mut start = index;
            while start > 0 && self.blocks[start - 1].kind() == BlockKind::OrderedList {
                start -= 1;
            }
            if done.contains(&start) {
                continue;
            }
            done.push(start);
            let mut end = index + 1;
            while end < self.blocks.len() && self.blocks[end].kind() == BlockKind::OrderedList {
                end += 1;
            }
            self.renumber_run(start..end);
        }
    }

    /// Recompute positions and markers of one run of ordered items.
    pub(crate) fn renumber_run(&mut self, run: Range<usize>) {
        let levels: Vec<u8> = run
            .clone()
            .map(|i| self.blocks[i].indentation_level().unwrap_or(0))
            .collect();
        let positions = number_run(&levels);
        trace!("renumbering ordered run {run:?}: {positions:?}");
        for (index, position) in run.zip(positions) {
            self.refresh_marker(index, position);
        }
    }

    pub(crate) fn refresh_marker(&mut self, index: usize, position: usize) {
        let block = &self.blocks[index];
        let Some(item) = block.variant.list_item().copied() else {
            return;
        };
        let offset = block.offset;
        let marker = ordered_marker(item.indentation_level, position);
        let current = self.buffer.substring(offset..offset + item.marker_length);
        if current == marker && item.position == position {
            return;
        }
        self.replace_in_block_with(
            index,
            offset..offset + item.marker_length,
            &marker,
            Some(Attributes::default()),
        );
        if let Some(item) = self.blocks[index].variant.list_item_mut() {
            item.position = position;
            item.marker_length = utf16_len(&marker);
        }
        self.apply_styles(index, false);
    }

    // ---- diagnostics ----

    /// Panic unless every structural invariant holds.
    pub fn check_invariants(&self) {
        assert!(!self.blocks.is_empty(), "document has no blocks");
        let count = self.blocks.len();
        let mut offset = 0;
        for (i, block) in self.blocks.iter().enumerate() {
            assert_eq!(block.index, i, "stale index on block {i}");
            assert_eq!(block.offset, offset, "block {i} is not contiguous");
            let last = i + 1 == count;
            if last {
                assert!(
                    !matches!(block.kind(), BlockKind::Code | BlockKind::Image),
                    "last block is a {} block",
                    block.kind()
                );
            } else {
                assert!(
                    block.length > 0 && self.buffer.is_newline_at(block.end() - 1),
                    "block {i} does not end with a separator"
                );
            }
            if let Some(item) = block.variant.list_item() {
                let expected = match block.kind() {
                    BlockKind::OrderedList => ordered_marker(item.indentation_level, item.position),
                    _ => bullet_marker(item.indentation_level),
                };
                assert_eq!(item.marker_length, utf16_len(&expected), "block {i} marker length");
                assert_eq!(
                    self.buffer.substring(block.offset..block.offset + item.marker_length),
                    expected,
                    "block {i} marker text"
                );
            }
            match block.kind() {
                BlockKind::Image => assert_eq!(block.length, 2, "image block {i} length"),
                BlockKind::Code => {}
                _ => assert!(
                    !self.content(i).contains('\n'),
                    "block {i} contains a line break"
                ),
            }
            offset += block.length;
        }
        assert_eq!(offset, self.buffer.len(), "block lengths do not cover the buffer");
        assert_eq!(
            utf16_len(&self.buffer.string()),
            self.buffer.len(),
            "buffer length does not match its text"
        );
    }

    /// One line per block: index, kind, list level and position, content.
    pub fn outline(&self) -> String {
        let mut lines = Vec::with_capacity(self.blocks.len());
        for (i, block) in self.blocks.iter().enumerate() {
            let mut line = format!("{i}: {}", block.kind());
            match &block.variant {
                BlockVariant::List(item) => {
                    let _ = write!(line, " level={}", item.indentation_level);
                }
                BlockVariant::OrderedList(item) => {
                    let _ = write!(
                        line,
                        " level={} position={}",
                        item.indentation_level, item.position
                    );
                }
                _ => {}
            }
            match &block.variant {
                BlockVariant::Image(image) => {
                    if let Some(key) = &image.key {
                        let _ = write!(line, " {key:?}");
                    }
                }
                _ => {
                    let _ = write!(line, " {:?}", self.content(i));
                }
            }
            lines.push(line);
        }
        lines.join("\n")
    }
}

impl Default for BlockDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BlockDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockDocument")
            .field("blocks", &self.blocks)
            .field("selection", &self.selection)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

/// Marker text stored ahead of a list item's content.
pub(crate) fn marker_text(variant: &BlockVariant) -> String {
    match variant {
        BlockVariant::List(item) => bullet_marker(item.indentation_level),
        BlockVariant::OrderedList(item) => ordered_marker(item.indentation_level, item.position),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{Attachment, ImageItem, ListItem};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_document_has_one_empty_text_block() {
        let doc = BlockDocument::new();
        assert_eq!(doc.block_count(), 1);
        assert_eq!(doc.len(), 0);
        insta::assert_snapshot!(doc.outline(), @r#"0: text """#);
        doc.check_invariants();
    }

    #[test]
    fn test_from_text_splits_lines() {
        let doc = BlockDocument::from_text("one\ntwo\n");
        insta::assert_snapshot!(doc.outline(), @r#"
        0: text "one"
        1: text "two"
        2: text ""
        "#);
        assert_eq!(doc.blocks()[1].range(), 4..8);
        doc.check_invariants();
    }

    #[test]
    fn test_index_at_boundaries() {
        let doc = BlockDocument::from_text("ab\ncd");
        assert_eq!(doc.index_at(0), 0);
        assert_eq!(doc.index_at(2), 0);
        assert_eq!(doc.index_at(3), 1);
        assert_eq!(doc.index_at(5), 1);
        assert_eq!(doc.block_range(1..4), 0..2);
        assert_eq!(doc.block_range(3..3), 1..2);
    }

    #[test]
    fn test_insert_blocks_at_end_appends_placeholder() {
        let mut doc = BlockDocument::from_text("intro");
        doc.insert_blocks(
            1,
            vec![
                (BlockVariant::List(ListItem::bullet(0)), "milk".to_string()),
                (BlockVariant::Code, "let x = 1;".to_string()),
            ],
        );
        insta::assert_snapshot!(doc.outline(), @r#"
        0: text "intro"
        1: list level=0 "milk"
        2: code "let x = 1;"
        3: text ""
        "#);
        doc.check_invariants();
    }

    #[test]
    fn test_remove_trailing_blocks_drops_separator() {
        let mut doc = BlockDocument::from_text("a\nb\nc");
        assert!(doc.remove_blocks(1..3));
        assert_eq!(doc.text(), "a");
        assert_eq!(doc.block_count(), 1);

        assert!(doc.remove_blocks(0..1));
        assert_eq!(doc.text(), "");
        assert_eq!(doc.block_count(), 1);
        assert!(!doc.remove_blocks(3..4));
    }

    #[test]
    fn test_image_is_never_last() {
        let mut doc = BlockDocument::new();
        let image = ImageItem::new(Attachment::new(10.0, 10.0), Some("cat.png".to_string()));
        doc.replace_block(0, BlockVariant::Image(image), crate::blocks::image::PLACEHOLDER_STR);
        insta::assert_snapshot!(doc.outline(), @r#"
        0: image "cat.png"
        1: text ""
        "#);
        doc.check_invariants();
    }

    #[test]
    fn test_ordered_items_renumber_when_inserted() {
        let mut doc = BlockDocument::new();
        let items = (0..3)
            .map(|i| {
                (
                    BlockVariant::OrderedList(ListItem::ordered(0, 0)),
                    format!("step {i}"),
                )
            })
            .collect();
        doc.insert_blocks(0, items);
        assert!(doc.text().starts_with("1.\tstep 0\n2.\tstep 1\n3.\tstep 2\n"));
        insta::assert_snapshot!(doc.outline(), @r#"
        0: orderedList level=0 position=0 "step 0"
        1: orderedList level=0 position=1 "step 1"
        2: orderedList level=0 position=2 "step 2"
        3: text ""
        "#);
    }

    #[test]
    fn test_block_at_view() {
        let doc = BlockDocument::from_text("title\nbody");
        let view = doc.block_at(7);
        assert_eq!(view.index, 1);
        assert_eq!(view.kind, BlockKind::Text);
        assert_eq!(view.range, 6..10);
        assert_eq!(view.content_range, 6..10);
        assert_eq!(view.indentation_level, None);
    }
}
