//! # Blocks
//!
//! A block is a typed, contiguous segment of the character buffer. Blocks do
//! not hold a reference back to their document: the document owns them in an
//! ordered `Vec` and hands out indices. `offset` and `index` are caches the
//! document restamps after structural edits.
//!
//! Kind-specific behavior is dispatched by matching on [`BlockVariant`]; the
//! editing hooks live with the document in `editing::edit`.

pub mod code;
pub mod image;
pub mod list;

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::style::BlockStyle;
pub use image::{Attachment, ImageItem};
pub use list::ListItem;

/// Fieldless tag of a block variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockKind {
    Text,
    Header1,
    Header2,
    List,
    OrderedList,
    Code,
    Image,
}

impl BlockKind {
    pub fn name(self) -> &'static str {
        match self {
            BlockKind::Text => "text",
            BlockKind::Header1 => "header1",
            BlockKind::Header2 => "header2",
            BlockKind::List => "list",
            BlockKind::OrderedList => "orderedList",
            BlockKind::Code => "code",
            BlockKind::Image => "image",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "text" => BlockKind::Text,
            "header1" => BlockKind::Header1,
            "header2" => BlockKind::Header2,
            "list" => BlockKind::List,
            "orderedList" => BlockKind::OrderedList,
            "code" => BlockKind::Code,
            "image" => BlockKind::Image,
            _ => return None,
        })
    }

    pub fn is_list(self) -> bool {
        matches!(self, BlockKind::List | BlockKind::OrderedList)
    }

    pub fn max_indentation_level(self) -> u8 {
        match self {
            BlockKind::List => list::MAX_LIST_LEVEL,
            BlockKind::OrderedList => list::MAX_ORDERED_LEVEL,
            _ => 0,
        }
    }

    /// Blocks whose rendering depends on their neighbors get renumbered
    /// after structural changes next to them.
    pub fn wants_adjacent_block_updates(self) -> bool {
        self == BlockKind::OrderedList
    }

    /// Whether markdown shortcuts are processed inside blocks of this kind.
    pub fn processes_markdown(self) -> bool {
        !matches!(self, BlockKind::Code | BlockKind::Image)
    }

    /// Kind of the block created when this one is split by a newline.
    pub fn continuation(self) -> BlockKind {
        match self {
            BlockKind::List | BlockKind::OrderedList | BlockKind::Code => self,
            _ => BlockKind::Text,
        }
    }

    pub fn layout_hints(self) -> LayoutHints {
        match self {
            BlockKind::Code => LayoutHints {
                padding_top: code::CODE_BLOCK_PADDING,
                padding_bottom: code::CODE_BLOCK_PADDING,
                is_single_line: false,
                is_text_selectable: true,
            },
            BlockKind::Image => LayoutHints {
                is_text_selectable: false,
                ..LayoutHints::default()
            },
            _ => LayoutHints::default(),
        }
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Layout reservations a renderer must honor for a block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutHints {
    pub padding_top: f32,
    pub padding_bottom: f32,
    pub is_single_line: bool,
    pub is_text_selectable: bool,
}

impl Default for LayoutHints {
    fn default() -> Self {
        Self {
            padding_top: 0.0,
            padding_bottom: 0.0,
            is_single_line: true,
            is_text_selectable: true,
        }
    }
}

/// Stable identity of a block across edits (indices shift, ids do not).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub enum BlockVariant {
    Text,
    Header1,
    Header2,
    List(ListItem),
    OrderedList(ListItem),
    Code,
    Image(ImageItem),
}

impl BlockVariant {
    pub fn kind(&self) -> BlockKind {
        match self {
            BlockVariant::Text => BlockKind::Text,
            BlockVariant::Header1 => BlockKind::Header1,
            BlockVariant::Header2 => BlockKind::Header2,
            BlockVariant::List(_) => BlockKind::List,
            BlockVariant::OrderedList(_) => BlockKind::OrderedList,
            BlockVariant::Code => BlockKind::Code,
            BlockVariant::Image(_) => BlockKind::Image,
        }
    }

    /// A fresh variant of a text-bearing kind. Images need an attachment and
    /// are built with [`BlockVariant::Image`] directly.
    ///
    /// # Panics
    /// Panics for [`BlockKind::Image`].
    pub fn text_kind(kind: BlockKind, level: u8) -> Self {
        match kind {
            BlockKind::Text => BlockVariant::Text,
            BlockKind::Header1 => BlockVariant::Header1,
            BlockKind::Header2 => BlockVariant::Header2,
            BlockKind::List => BlockVariant::List(ListItem::bullet(level)),
            BlockKind::OrderedList => BlockVariant::OrderedList(ListItem::ordered(level, 0)),
            BlockKind::Code => BlockVariant::Code,
            BlockKind::Image => panic!("image variants need an attachment"),
        }
    }

    pub fn list_item(&self) -> Option<&ListItem> {
        match self {
            BlockVariant::List(item) | BlockVariant::OrderedList(item) => Some(item),
            _ => None,
        }
    }

    pub fn list_item_mut(&mut self) -> Option<&mut ListItem> {
        match self {
            BlockVariant::List(item) | BlockVariant::OrderedList(item) => Some(item),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: BlockId,
    /// First code unit owned by this block (cache).
    pub offset: usize,
    /// Code units owned, including the trailing separator of non-final blocks.
    pub length: usize,
    /// Position in the document (cache).
    pub index: usize,
    pub variant: BlockVariant,
}

impl Block {
    pub fn new(id: BlockId, variant: BlockVariant, length: usize) -> Self {
        Self {
            id,
            offset: 0,
            length,
            index: 0,
            variant,
        }
    }

    pub fn kind(&self) -> BlockKind {
        self.variant.kind()
    }

    pub fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }

    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    pub fn marker_length(&self) -> usize {
        self.variant.list_item().map_or(0, |item| item.marker_length)
    }

    pub fn indentation_level(&self) -> Option<u8> {
        self.variant.list_item().map(|item| item.indentation_level)
    }

    /// First code unit after the list marker.
    pub fn content_start(&self) -> usize {
        self.offset + self.marker_length()
    }
}

/// Read-only projection of a block handed to renderers.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockView {
    pub id: BlockId,
    pub index: usize,
    pub kind: BlockKind,
    pub range: Range<usize>,
    /// Range of the user-editable content: no marker, no separator.
    pub content_range: Range<usize>,
    pub style: BlockStyle,
    pub indentation_level: Option<u8>,
    pub position: Option<usize>,
    pub layout: LayoutHints,
    pub image_key: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_kind_names_roundtrip() {
        for kind in [
            BlockKind::Text,
            BlockKind::Header1,
            BlockKind::Header2,
            BlockKind::List,
            BlockKind::OrderedList,
            BlockKind::Code,
            BlockKind::Image,
        ] {
            assert_eq!(BlockKind::from_name(kind.name()), Some(kind));
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.name()));
        }
        assert_eq!(BlockKind::from_name("quote"), None);
    }

    #[test]
    fn test_layout_hints() {
        let code = BlockKind::Code.layout_hints();
        assert_eq!(code.padding_top, 28.0);
        assert_eq!(code.padding_bottom, 28.0);
        assert!(!code.is_single_line);
        assert!(!BlockKind::Image.layout_hints().is_text_selectable);
        assert!(BlockKind::Text.layout_hints().is_single_line);
    }

    #[test]
    fn test_continuation_kinds() {
        assert_eq!(BlockKind::Header1.continuation(), BlockKind::Text);
        assert_eq!(BlockKind::List.continuation(), BlockKind::List);
        assert_eq!(BlockKind::OrderedList.continuation(), BlockKind::OrderedList);
    }

    #[test]
    fn test_block_geometry() {
        let mut block = Block::new(BlockId(1), BlockVariant::List(ListItem::bullet(0)), 7);
        block.offset = 10;
        assert_eq!(block.range(), 10..17);
        assert_eq!(block.content_start(), 12);
        assert_eq!(block.indentation_level(), Some(0));
    }
}
