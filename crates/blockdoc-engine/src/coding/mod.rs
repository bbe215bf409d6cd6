//! Serialization of blocks to and from the coded JSON form.
//!
//! A document serializes as an array of [`CodedBlock`]s, each a tagged object
//! `{"type": "...", "coded": {...}}`. Decoding goes through a raw layer so an
//! unknown `type` is reported as [`CodingError::InvalidType`] rather than as a
//! generic parse failure. Image data lives outside the document behind the
//! [`ImageStore`] trait; a missing image degrades to a placeholder attachment
//! and is reported in the [`LoadReport`].

pub mod clipboard;
pub mod markdown;

use std::collections::HashMap;
use std::ops::Range;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::blocks::image::PLACEHOLDER_STR;
use crate::blocks::{Attachment, BlockKind, BlockVariant, ImageItem, ListItem};
use crate::buffer::utf16_len;
use crate::editing::BlockDocument;
use crate::style::{InlineStyles, PageLink};

#[derive(Debug, Error)]
pub enum CodingError {
    #[error("Unknown block type: {0}")]
    InvalidType(String),
    #[error("Malformed coded block: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Style run {start}..{end} outside text of length {len}")]
    RunOutOfBounds { start: usize, end: usize, len: usize },
    #[error("Line break in single-line {0} block")]
    MultilineText(BlockKind),
    #[error("Image not found: {0}")]
    MissingImage(String),
    #[error("Failed to convert image {key}: {reason}")]
    ImageConversion { key: String, reason: String },
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Range of a style run, relative to the coded string, in UTF-16 units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodedRange {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodedRun {
    pub range: CodedRange,
    #[serde(default, skip_serializing_if = "no_styles")]
    pub styles: InlineStyles,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_link: Option<PageLink>,
}

fn no_styles(styles: &InlineStyles) -> bool {
    styles.is_empty()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodedText {
    pub string: String,
    #[serde(default)]
    pub runs: Vec<CodedRun>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodedList {
    pub string: String,
    #[serde(default)]
    pub runs: Vec<CodedRun>,
    pub indentation_level: u8,
    /// Informational; markers are regenerated on load.
    #[serde(default)]
    pub marker_length: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodedImage {
    #[serde(default)]
    pub key: Option<String>,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coded", rename_all = "camelCase")]
pub enum CodedBlock {
    Text(CodedText),
    Header1(CodedText),
    Header2(CodedText),
    List(CodedList),
    OrderedList(CodedList),
    Code(CodedText),
    Image(CodedImage),
}

#[derive(Deserialize)]
struct RawCodedBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coded: serde_json::Value,
}

impl TryFrom<RawCodedBlock> for CodedBlock {
    type Error = CodingError;

    fn try_from(raw: RawCodedBlock) -> Result<Self, Self::Error> {
        let kind = BlockKind::from_name(&raw.kind).ok_or(CodingError::InvalidType(raw.kind))?;
        let coded = raw.coded;
        let block = match kind {
            BlockKind::Text => CodedBlock::Text(serde_json::from_value(coded)?),
            BlockKind::Header1 => CodedBlock::Header1(serde_json::from_value(coded)?),
            BlockKind::Header2 => CodedBlock::Header2(serde_json::from_value(coded)?),
            BlockKind::List => CodedBlock::List(serde_json::from_value(coded)?),
            BlockKind::OrderedList => CodedBlock::OrderedList(serde_json::from_value(coded)?),
            BlockKind::Code => CodedBlock::Code(serde_json::from_value(coded)?),
            BlockKind::Image => CodedBlock::Image(serde_json::from_value(coded)?),
        };
        block.validate()?;
        Ok(block)
    }
}

impl CodedBlock {
    pub fn kind(&self) -> BlockKind {
        match self {
            CodedBlock::Text(_) => BlockKind::Text,
            CodedBlock::Header1(_) => BlockKind::Header1,
            CodedBlock::Header2(_) => BlockKind::Header2,
            CodedBlock::List(_) => BlockKind::List,
            CodedBlock::OrderedList(_) => BlockKind::OrderedList,
            CodedBlock::Code(_) => BlockKind::Code,
            CodedBlock::Image(_) => BlockKind::Image,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        CodedBlock::Text(CodedText {
            string: text.into(),
            runs: Vec::new(),
        })
    }

    /// Content text; empty for images.
    pub fn string(&self) -> &str {
        match self {
            CodedBlock::Text(t) | CodedBlock::Header1(t) | CodedBlock::Header2(t) | CodedBlock::Code(t) => {
                &t.string
            }
            CodedBlock::List(l) | CodedBlock::OrderedList(l) => &l.string,
            CodedBlock::Image(_) => "",
        }
    }

    pub fn runs(&self) -> &[CodedRun] {
        match self {
            CodedBlock::Text(t) | CodedBlock::Header1(t) | CodedBlock::Header2(t) | CodedBlock::Code(t) => {
                &t.runs
            }
            CodedBlock::List(l) | CodedBlock::OrderedList(l) => &l.runs,
            CodedBlock::Image(_) => &[],
        }
    }

    /// Check what the type system cannot: runs stay inside the string and
    /// only code blocks span lines.
    pub fn validate(&self) -> Result<(), CodingError> {
        let string = self.string();
        let kind = self.kind();
        if kind != BlockKind::Code && string.contains('\n') {
            return Err(CodingError::MultilineText(kind));
        }
        let len = utf16_len(string);
        for run in self.runs() {
            let CodedRange { start, end } = run.range;
            if start > end || end > len {
                return Err(CodingError::RunOutOfBounds { start, end, len });
            }
        }
        Ok(())
    }
}

/// Parse a JSON array of coded blocks.
pub fn decode_blocks(json: &str) -> Result<Vec<CodedBlock>, CodingError> {
    let raw: Vec<RawCodedBlock> = serde_json::from_str(json)?;
    raw.into_iter().map(CodedBlock::try_from).collect()
}

pub fn encode_blocks(blocks: &[CodedBlock]) -> Result<String, CodingError> {
    Ok(serde_json::to_string_pretty(blocks)?)
}

/// Read coded blocks from a JSON file.
pub fn read_blocks(path: &Path) -> Result<Vec<CodedBlock>, CodingError> {
    let json = std::fs::read_to_string(path).map_err(|source| CodingError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_blocks(&json)
}

pub fn write_blocks(path: &Path, blocks: &[CodedBlock]) -> Result<(), CodingError> {
    let json = encode_blocks(blocks)?;
    std::fs::write(path, json).map_err(|source| CodingError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Backing store for image data, keyed by string.
pub trait ImageStore {
    /// Size of the stored image.
    fn dimensions(&self, key: &str) -> Result<(f32, f32), CodingError>;
    /// Store the image behind `attachment`, returning its key.
    fn insert(&mut self, attachment: &Attachment) -> Result<String, CodingError>;
}

/// In-memory [`ImageStore`]. Zero-sized entries stand for images that exist
/// but cannot be decoded.
#[derive(Debug, Clone, Default)]
pub struct MemoryImageStore {
    images: HashMap<String, (f32, f32)>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, key: impl Into<String>, width: f32, height: f32) -> Self {
        self.images.insert(key.into(), (width, height));
        self
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl ImageStore for MemoryImageStore {
    fn dimensions(&self, key: &str) -> Result<(f32, f32), CodingError> {
        match self.images.get(key) {
            None => Err(CodingError::MissingImage(key.to_string())),
            Some(&(width, height)) if width <= 0.0 || height <= 0.0 => {
                Err(CodingError::ImageConversion {
                    key: key.to_string(),
                    reason: "empty image".to_string(),
                })
            }
            Some(&size) => Ok(size),
        }
    }

    fn insert(&mut self, attachment: &Attachment) -> Result<String, CodingError> {
        let key = attachment.id.to_string();
        self.images
            .insert(key.clone(), (attachment.width, attachment.height));
        Ok(key)
    }
}

/// Outcome of a load that succeeded, possibly with degraded images.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub blocks: usize,
    pub warnings: Vec<String>,
}

impl BlockDocument {
    /// Every block of the document in coded form.
    pub fn serialize(&self) -> Vec<CodedBlock> {
        self.encode_blocks_in(0..self.blocks.len())
    }

    /// Like [`BlockDocument::serialize`], but images without a key are put
    /// into `store` first so the coded form can refer to them.
    pub fn serialize_with_store(
        &self,
        store: &mut dyn ImageStore,
    ) -> Result<Vec<CodedBlock>, CodingError> {
        let mut coded = self.serialize();
        for (block, coded) in self.blocks.iter().zip(coded.iter_mut()) {
            if let (BlockVariant::Image(image), CodedBlock::Image(coded)) = (&block.variant, coded)
                && image.key.is_none()
            {
                coded.key = Some(store.insert(&image.attachment)?);
            }
        }
        Ok(coded)
    }

    pub fn encode_blocks_in(&self, blocks: Range<usize>) -> Vec<CodedBlock> {
        blocks
            .map(|i| self.encode_block(i, self.content_range(i)))
            .collect()
    }

    /// Coded form of block `index`, restricted to `content` (a sub-range of
    /// its content range).
    pub(crate) fn encode_block(&self, index: usize, content: Range<usize>) -> CodedBlock {
        let string = self.buffer.substring(content.clone());
        let runs = self.encode_runs(content);
        match &self.blocks[index].variant {
            BlockVariant::Text => CodedBlock::Text(CodedText { string, runs }),
            BlockVariant::Header1 => CodedBlock::Header1(CodedText { string, runs }),
            BlockVariant::Header2 => CodedBlock::Header2(CodedText { string, runs }),
            BlockVariant::Code => CodedBlock::Code(CodedText { string, runs }),
            BlockVariant::List(item) => CodedBlock::List(CodedList {
                string,
                runs,
                indentation_level: item.indentation_level,
                marker_length: item.marker_length,
            }),
            BlockVariant::OrderedList(item) => CodedBlock::OrderedList(CodedList {
                string,
                runs,
                indentation_level: item.indentation_level,
                marker_length: item.marker_length,
            }),
            BlockVariant::Image(image) => CodedBlock::Image(CodedImage {
                key: image.key.clone(),
                width: image.attachment.width,
                height: image.attachment.height,
            }),
        }
    }

    /// Runs carrying inline styles or links, relative to `content.start`.
    fn encode_runs(&self, content: Range<usize>) -> Vec<CodedRun> {
        if content.is_empty() {
            return Vec::new();
        }
        let base = content.start;
        self.buffer
            .runs(content)
            .into_iter()
            .filter(|(_, a)| !a.inline.is_empty() || a.link.is_some() || a.page_link.is_some())
            .map(|(range, a)| CodedRun {
                range: CodedRange {
                    start: range.start - base,
                    end: range.end - base,
                },
                styles: a.inline,
                link: a.link.clone(),
                page_link: a.page_link.clone(),
            })
            .collect()
    }

    /// Replace the whole document with `coded`. The undo history is
    /// cleared.
    pub fn load(&mut self, coded: &[CodedBlock]) -> Result<LoadReport, CodingError> {
        self.load_blocks(coded, None)
    }

    pub fn load_with_store(
        &mut self,
        coded: &[CodedBlock],
        store: &dyn ImageStore,
    ) -> Result<LoadReport, CodingError> {
        self.load_blocks(coded, Some(store))
    }

    fn load_blocks(
        &mut self,
        coded: &[CodedBlock],
        store: Option<&dyn ImageStore>,
    ) -> Result<LoadReport, CodingError> {
        for block in coded {
            block.validate()?;
        }
        let mut warnings = Vec::new();
        self.begin_editing();
        self.transaction.label = "Load";
        let len = self.len();
        self.replace_chars(0..len, "", None);
        self.blocks.clear();
        let block = self.new_block(BlockVariant::Text, 0);
        self.blocks.push(block);
        self.mark_dirty(0);
        self.stamp();

        let created = self.insert_coded(coded, 0, store, &mut warnings);
        // drop the placeholder the coded blocks were inserted in front of
        let last = self.blocks.len() - 1;
        if !created.is_empty()
            && self.blocks[last].length == 0
            && !matches!(
                self.blocks[last - 1].kind(),
                BlockKind::Code | BlockKind::Image
            )
        {
            self.remove_blocks(last..last + 1);
        }
        self.transaction.caret = Some(0);
        self.end_editing();
        self.undo_log.clear();
        self.typing_run_end = None;
        debug!("loaded {} blocks, {} warnings", coded.len(), warnings.len());
        Ok(LoadReport {
            blocks: self.blocks.len(),
            warnings,
        })
    }

    /// Insert coded blocks before block `at`. Used by paste, duplicate and
    /// load. Returns the indices of the new blocks.
    pub fn create_blocks(&mut self, coded: &[CodedBlock], at: usize) -> Result<Range<usize>, CodingError> {
        for block in coded {
            block.validate()?;
        }
        let mut warnings = Vec::new();
        self.begin_editing();
        let created = self.insert_coded(coded, at, None, &mut warnings);
        self.end_editing();
        Ok(created)
    }

    /// Insert coded blocks at a character offset. At a block's content start
    /// they go before it, at its content end after it, and anywhere else the
    /// block is split first. An empty block at the offset is replaced, unless
    /// it is the last one. Code blocks are never split.
    pub fn create_blocks_at(
        &mut self,
        coded: &[CodedBlock],
        character_offset: usize,
    ) -> Result<Range<usize>, CodingError> {
        for block in coded {
            block.validate()?;
        }
        let offset = character_offset.min(self.len());
        self.begin_editing();
        let index = self.index_at(offset);
        let content = self.content_range(index);
        let at = if content.is_empty() || offset <= content.start {
            index
        } else if offset >= content.end || self.blocks[index].kind() == BlockKind::Code {
            index + 1
        } else {
            self.request_edit(offset..offset, "\n");
            index + 1
        };
        let created = self.create_blocks(coded, at);
        if let Ok(created) = &created {
            let empty = created.end;
            if content.is_empty()
                && empty + 1 < self.blocks.len()
                && self.content_range(empty).is_empty()
            {
                self.remove_block(empty);
            }
        }
        self.end_editing();
        created
    }

    fn insert_coded(
        &mut self,
        coded: &[CodedBlock],
        at: usize,
        store: Option<&dyn ImageStore>,
        warnings: &mut Vec<String>,
    ) -> Range<usize> {
        let at = at.min(self.blocks.len());
        let entries = coded
            .iter()
            .map(|block| decode_variant(block, store, warnings))
            .collect();
        let created = self.insert_blocks(at, entries);
        for (index, block) in created.clone().zip(coded) {
            let start = self.content_range(index).start;
            for run in block.runs() {
                let range = start + run.range.start..start + run.range.end;
                if range.is_empty() {
                    continue;
                }
                self.buffer.modify_attributes(range, |attributes| {
                    attributes.inline = run.styles;
                    attributes.link = run.link.clone();
                    attributes.page_link = run.page_link.clone();
                });
            }
        }
        if let Some(last) = created.clone().last() {
            self.transaction.caret = Some(self.content_range(last).end);
        }
        created
    }
}

fn decode_variant(
    block: &CodedBlock,
    store: Option<&dyn ImageStore>,
    warnings: &mut Vec<String>,
) -> (BlockVariant, String) {
    let content = block.string().to_string();
    let variant = match block {
        CodedBlock::Text(_) => BlockVariant::Text,
        CodedBlock::Header1(_) => BlockVariant::Header1,
        CodedBlock::Header2(_) => BlockVariant::Header2,
        CodedBlock::Code(_) => BlockVariant::Code,
        CodedBlock::List(list) => BlockVariant::List(ListItem::bullet(
            list.indentation_level.min(BlockKind::List.max_indentation_level()),
        )),
        CodedBlock::OrderedList(list) => BlockVariant::OrderedList(ListItem::ordered(
            list.indentation_level
                .min(BlockKind::OrderedList.max_indentation_level()),
            0,
        )),
        CodedBlock::Image(image) => {
            let attachment = match (store, &image.key) {
                (Some(store), Some(key)) => match store.dimensions(key) {
                    Ok((width, height)) => Attachment::new(width, height),
                    Err(err) => {
                        warn!("image {key} degraded to a placeholder: {err}");
                        warnings.push(err.to_string());
                        Attachment::missing(image.width, image.height)
                    }
                },
                _ => Attachment::new(image.width, image.height),
            };
            return (
                BlockVariant::Image(ImageItem::new(attachment, image.key.clone())),
                PLACEHOLDER_STR.to_string(),
            );
        }
    };
    (variant, content)
}
