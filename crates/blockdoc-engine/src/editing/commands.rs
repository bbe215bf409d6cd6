use std::ops::Range;

use log::{debug, warn};

use super::transaction::DeferredCommand;
use super::{BlockDocument, DocumentEvent, Patch, Selection};
use crate::blocks::image::PLACEHOLDER_STR;
use crate::blocks::{Attachment, BlockKind, BlockVariant, ImageItem};
use crate::style::{InlineStyle, PageLink};

/// Editing commands issued by menus, popups and key bindings.
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    Edit {
        range: Range<usize>,
        text: String,
    },
    ToggleInlineStyle {
        style: InlineStyle,
        range: Range<usize>,
    },
    SetBlockKind {
        kind: BlockKind,
        blocks: Range<usize>,
    },
    CreateBlock {
        index: usize,
        kind: BlockKind,
    },
    DeleteBlocks {
        blocks: Range<usize>,
    },
    DuplicateBlocks {
        blocks: Range<usize>,
    },
    IndentBlocks {
        blocks: Range<usize>,
    },
    OutdentBlocks {
        blocks: Range<usize>,
    },
    InsertImage {
        index: usize,
        attachment: Attachment,
        key: Option<String>,
    },
    InsertPageLink {
        range: Range<usize>,
        link: PageLink,
    },
    SetSelection(Selection),
    Undo,
    Redo,
}

impl BlockDocument {
    /// Apply a command and report what it changed.
    pub fn apply(&mut self, cmd: Cmd) -> Patch {
        let version = self.version;
        let accepted = match cmd {
            Cmd::Edit { range, text } => self.request_edit(range, &text),
            Cmd::ToggleInlineStyle { style, range } => self.toggle_inline_style(style, range),
            Cmd::SetBlockKind { kind, blocks } => self.set_block_kind(kind, blocks),
            Cmd::CreateBlock { index, kind } => self.create_block(index, kind).is_some(),
            Cmd::DeleteBlocks { blocks } => self.delete_blocks(blocks),
            Cmd::DuplicateBlocks { blocks } => !self.duplicate_blocks(blocks).is_empty(),
            Cmd::IndentBlocks { blocks } => self.indent_blocks(blocks),
            Cmd::OutdentBlocks { blocks } => self.outdent_blocks(blocks),
            Cmd::InsertImage {
                index,
                attachment,
                key,
            } => {
                self.insert_image(index, attachment, key);
                true
            }
            Cmd::InsertPageLink { range, link } => self.insert_page_link(range, link),
            Cmd::SetSelection(selection) => {
                self.set_selection(selection);
                true
            }
            Cmd::Undo => self.undo(),
            Cmd::Redo => self.redo(),
        };
        let changed = if self.version != version {
            self.transaction.last_changed.clone()
        } else {
            Vec::new()
        };
        Patch {
            accepted,
            changed,
            selection: self.selection.clone(),
            version: self.version,
        }
    }

    /// Restamp the canonical block style over block `index`, skipping runs
    /// that already carry it. Returns whether anything changed.
    pub fn apply_styles(&mut self, index: usize, with_undo: bool) -> bool {
        let block = &self.blocks[index];
        let style = self
            .styles
            .block_style(block.kind(), block.indentation_level().unwrap_or(0));
        let range = block.range();
        if range.is_empty() {
            return false;
        }
        let stale: Vec<Range<usize>> = self
            .buffer
            .runs(range)
            .into_iter()
            .filter(|(_, attributes)| attributes.block.as_ref() != Some(&style))
            .map(|(range, _)| range)
            .collect();
        if stale.is_empty() {
            return false;
        }
        if with_undo {
            self.begin_editing();
            self.transaction.label = "Apply Styles";
        }
        for range in stale {
            self.buffer
                .modify_attributes(range, |attributes| attributes.block = Some(style.clone()));
        }
        if with_undo {
            self.end_editing();
        }
        true
    }

    /// Content ranges of the text-bearing blocks intersecting `range`,
    /// clipped to it. Markers, separators and image placeholders fall out.
    fn styleable_segments(&self, range: &Range<usize>) -> Vec<Range<usize>> {
        self.block_range(range.clone())
            .filter(|&i| self.blocks[i].kind().layout_hints().is_text_selectable)
            .filter_map(|i| {
                let content = self.content_range(i);
                let segment = range.start.max(content.start)..range.end.min(content.end);
                (segment.start < segment.end).then_some(segment)
            })
            .collect()
    }

    /// If `style` is set anywhere in `range` it is removed everywhere,
    /// otherwise it is added everywhere. Other inline styles are kept.
    pub fn toggle_inline_style(&mut self, style: InlineStyle, range: Range<usize>) -> bool {
        if self.settings.read_only || range.end > self.len() {
            return false;
        }
        let segments = self.styleable_segments(&range);
        if segments.is_empty() {
            return false;
        }
        let present = segments.iter().any(|segment| {
            self.buffer
                .runs(segment.clone())
                .iter()
                .any(|(_, attributes)| attributes.inline.contains(style))
        });
        debug!(
            "{} {style:?} over {range:?}",
            if present { "removing" } else { "adding" }
        );
        self.begin_editing();
        self.transaction.label = "Toggle Style";
        for segment in segments {
            self.buffer.modify_attributes(segment, |attributes| {
                if present {
                    attributes.inline.remove(style);
                } else {
                    attributes.inline.insert(style);
                }
            });
        }
        self.end_editing();
        true
    }

    /// Convert the blocks in `blocks` to `kind`. Images are skipped and
    /// cannot be produced this way. Converting to code merges each
    /// contiguous group into one code block; converting code to anything
    /// else splits it at its line breaks.
    pub fn set_block_kind(&mut self, kind: BlockKind, blocks: Range<usize>) -> bool {
        if kind == BlockKind::Image || self.settings.read_only {
            return false;
        }
        let count = self.blocks.len();
        let blocks = blocks.start.min(count)..blocks.end.min(count);
        if blocks.is_empty() {
            return false;
        }
        self.begin_editing();
        self.transaction.label = "Set Block Kind";
        let changed = if kind == BlockKind::Code {
            self.merge_into_code(blocks)
        } else {
            self.convert_blocks(kind, blocks)
        };
        self.end_editing();
        changed
    }

    fn merge_into_code(&mut self, blocks: Range<usize>) -> bool {
        let mut groups: Vec<Range<usize>> = Vec::new();
        for i in blocks {
            if self.blocks[i].kind() == BlockKind::Image {
                continue;
            }
            match groups.last_mut() {
                Some(group) if group.end == i => group.end = i + 1,
                _ => groups.push(i..i + 1),
            }
        }
        let mut changed = false;
        // back to front, so earlier group indices stay valid
        for group in groups.into_iter().rev() {
            if group.len() == 1 && self.blocks[group.start].kind() == BlockKind::Code {
                continue;
            }
            for i in group.clone().rev() {
                let block = &self.blocks[i];
                let marker = block.offset..block.content_start();
                if !marker.is_empty() {
                    self.replace_in_block(i, marker, "");
                }
                self.blocks[i].variant = BlockVariant::Code;
            }
            // separators inside the group become line breaks of the code
            let length: usize = self.blocks[group.clone()].iter().map(|b| b.length).sum();
            self.remove_blocks_raw(group.start + 1..group.end);
            self.blocks[group.start].length = length;
            self.mark_dirty(group.start);
            self.stamp();
            self.request_adjacent_updates(group.start);
            self.apply_styles(group.start, false);
            debug!("merged blocks {group:?} into one code block");
            changed = true;
        }
        changed
    }

    fn convert_blocks(&mut self, kind: BlockKind, blocks: Range<usize>) -> bool {
        let mut changed = false;
        let mut index = blocks.start;
        let mut end = blocks.end;
        while index < end {
            let block = &self.blocks[index];
            let from = block.kind();
            if from == BlockKind::Image || from == kind {
                index += 1;
                continue;
            }
            let level = match kind {
                BlockKind::List | BlockKind::OrderedList => block
                    .indentation_level()
                    .unwrap_or(0)
                    .min(kind.max_indentation_level()),
                _ => 0,
            };
            self.convert_block(index, kind, level);
            let last = if from == BlockKind::Code {
                self.resplit(index)
            } else {
                index
            };
            end += last - index;
            index = last + 1;
            changed = true;
        }
        changed
    }

    /// Insert an empty block of `kind` before block `index` and put the
    /// caret in it. Images go through [`BlockDocument::insert_image`].
    pub fn create_block(&mut self, index: usize, kind: BlockKind) -> Option<usize> {
        if kind == BlockKind::Image || self.settings.read_only {
            return None;
        }
        let index = index.min(self.blocks.len());
        self.begin_editing();
        self.transaction.label = "Create Block";
        let variant = BlockVariant::text_kind(kind, 0);
        let created = self.insert_block(index, variant, "");
        self.renumber_pending();
        self.transaction.caret = Some(self.blocks[created].content_start());
        self.end_editing();
        Some(created)
    }

    pub fn insert_image(&mut self, index: usize, attachment: Attachment, key: Option<String>) -> usize {
        let index = index.min(self.blocks.len());
        self.begin_editing();
        self.transaction.label = "Insert Image";
        let variant = BlockVariant::Image(ImageItem::new(attachment, key));
        let created = self.insert_block(index, variant, PLACEHOLDER_STR);
        self.transaction.caret = Some(self.blocks[created + 1].content_start());
        self.end_editing();
        created
    }

    pub fn delete_blocks(&mut self, blocks: Range<usize>) -> bool {
        if self.settings.read_only {
            return false;
        }
        self.begin_editing();
        self.transaction.label = "Delete Blocks";
        let removed = self.remove_blocks(blocks);
        self.end_editing();
        removed
    }

    /// Insert a copy of `blocks` right after them. Returns the indices of the
    /// copies.
    pub fn duplicate_blocks(&mut self, blocks: Range<usize>) -> Range<usize> {
        let count = self.blocks.len();
        let blocks = blocks.start.min(count)..blocks.end.min(count);
        if blocks.is_empty() || self.settings.read_only {
            return blocks.end..blocks.end;
        }
        let coded = self.encode_blocks_in(blocks.clone());
        self.begin_editing();
        self.transaction.label = "Duplicate Blocks";
        let created = match self.create_blocks(&coded, blocks.end) {
            Ok(created) => created,
            Err(err) => {
                warn!("duplicating blocks {blocks:?} failed: {err}");
                blocks.end..blocks.end
            }
        };
        self.defer(DeferredCommand::SetSelection(Selection::MultiBlock {
            blocks: created.clone(),
        }));
        self.end_editing();
        created
    }

    pub fn indent_blocks(&mut self, blocks: Range<usize>) -> bool {
        self.shift_list_levels(blocks, "Indent", |doc, i| doc.indent_block(i))
    }

    pub fn outdent_blocks(&mut self, blocks: Range<usize>) -> bool {
        self.shift_list_levels(blocks, "Outdent", |doc, i| {
            match doc.blocks[i].indentation_level() {
                Some(level) if level > 0 => {
                    doc.set_list_level(i, level - 1);
                    true
                }
                _ => false,
            }
        })
    }

    fn shift_list_levels(
        &mut self,
        blocks: Range<usize>,
        label: &'static str,
        mut shift: impl FnMut(&mut Self, usize) -> bool,
    ) -> bool {
        let count = self.blocks.len();
        let blocks = blocks.start.min(count)..blocks.end.min(count);
        if self.settings.read_only {
            return false;
        }
        self.begin_editing();
        self.transaction.label = label;
        let mut changed = false;
        for i in blocks {
            if self.blocks[i].kind().is_list() {
                changed |= shift(self, i);
            }
        }
        self.end_editing();
        changed
    }

    /// Replace `range` (usually the `[[` trigger) with the page title, linked
    /// to the page.
    pub fn insert_page_link(&mut self, range: Range<usize>, link: PageLink) -> bool {
        if self.settings.read_only || range.end > self.len() || link.title.is_empty() {
            return false;
        }
        let index = self.index_at(range.start);
        let content = self.content_range(index);
        if range.start < content.start
            || range.end > content.end
            || !self.blocks[index].kind().processes_markdown()
        {
            return false;
        }
        self.begin_editing();
        self.transaction.label = "Insert Page Link";
        let inserted = self.replace_in_block(index, range.clone(), &link.title);
        let linked = range.start..range.start + inserted;
        self.buffer.modify_attributes(linked.clone(), |attributes| {
            attributes.page_link = Some(link.clone());
        });
        self.transaction.caret = Some(linked.end);
        self.events.push(DocumentEvent::PageLinkInserted {
            range: linked,
            link,
        });
        self.end_editing();
        true
    }
}
