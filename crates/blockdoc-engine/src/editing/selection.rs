use std::ops::Range;

use crate::blocks::BlockKind;

use super::BlockDocument;

/// Document selection as seen by the view layer.
///
/// A `SingleBlock` range always lies within its block, never covers a list
/// marker and may include the trailing separator. `MultiBlock` selections only
/// support block-granular commands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    None,
    SingleBlock {
        index: usize,
        range: Range<usize>,
    },
    MultiBlock {
        blocks: Range<usize>,
    },
}

impl Selection {
    pub fn caret(index: usize, offset: usize) -> Self {
        Selection::SingleBlock {
            index,
            range: offset..offset,
        }
    }

    /// The caret offset, when the selection is collapsed.
    pub fn caret_offset(&self) -> Option<usize> {
        match self {
            Selection::SingleBlock { range, .. } if range.is_empty() => Some(range.start),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Backward,
    Forward,
}

impl BlockDocument {
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Replace the selection, clamped to the selection invariants.
    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = self.clamp_selection(selection);
    }

    pub(crate) fn clamp_selection(&self, selection: Selection) -> Selection {
        let count = self.blocks.len();
        match selection {
            Selection::None => Selection::None,
            Selection::MultiBlock { blocks } => {
                let start = blocks.start.min(count - 1);
                let end = blocks.end.clamp(start + 1, count);
                Selection::MultiBlock { blocks: start..end }
            }
            Selection::SingleBlock { index, range } => {
                let index = index.min(count - 1);
                let block = &self.blocks[index];
                if block.kind() == BlockKind::Image && !range.is_empty() {
                    return Selection::MultiBlock {
                        blocks: index..index + 1,
                    };
                }
                let floor = block.content_start();
                let start = range.start.clamp(floor, block.end());
                let end = range.end.clamp(start, block.end());
                Selection::SingleBlock {
                    index,
                    range: start..end,
                }
            }
        }
    }

    /// Whether a single-block selection can still grow inside its block.
    pub fn can_extend_selection(
        &self,
        index: usize,
        range: &Range<usize>,
        direction: Direction,
    ) -> bool {
        let Some(block) = self.blocks.get(index) else {
            return false;
        };
        if !block.kind().layout_hints().is_text_selectable {
            return false;
        }
        let content = self.content_range(index);
        match direction {
            Direction::Backward => range.start > content.start,
            Direction::Forward => range.end < content.end,
        }
    }

    /// Grow `range` by one unit, or `None` once the block is exhausted.
    pub fn adjust_selection(
        &self,
        index: usize,
        range: Range<usize>,
        direction: Direction,
    ) -> Option<Range<usize>> {
        if !self.can_extend_selection(index, &range, direction) {
            return None;
        }
        Some(match direction {
            Direction::Backward => range.start - 1..range.end,
            Direction::Forward => range.start..range.end + 1,
        })
    }

    /// Keyboard selection growth. A single-block selection that cannot grow
    /// any further is promoted to a block selection; block selections grow by
    /// whole blocks.
    pub fn extend_selection(&mut self, direction: Direction) -> &Selection {
        let next = match self.selection.clone() {
            Selection::None => Selection::None,
            Selection::SingleBlock { index, range } => {
                match self.adjust_selection(index, range, direction) {
                    Some(range) => Selection::SingleBlock { index, range },
                    None => Selection::MultiBlock {
                        blocks: index..index + 1,
                    },
                }
            }
            Selection::MultiBlock { blocks } => match direction {
                Direction::Backward => Selection::MultiBlock {
                    blocks: blocks.start.saturating_sub(1)..blocks.end,
                },
                Direction::Forward => Selection::MultiBlock {
                    blocks: blocks.start..(blocks.end + 1).min(self.blocks.len()),
                },
            },
        };
        self.selection = next;
        &self.selection
    }
}
