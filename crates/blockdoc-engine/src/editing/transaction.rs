//! Edit transactions.
//!
//! Every mutation of a [`BlockDocument`] runs inside `begin_editing` /
//! `end_editing`. Calls nest; only the outermost `end_editing` settles the
//! document: ordered lists are renumbered, the trailing text block is
//! restored, caches are stamped, the caret becomes the selection, deferred
//! commands run and the undo group is decided. Readers only ever observe the
//! settled state.

use std::ops::Range;

use log::trace;

use super::edit::{Edit, EditKind};
use super::undo::{DocumentState, UndoEntry};
use super::{BlockDocument, Selection};
use crate::blocks::BlockId;
use crate::buffer::{BufferChange, ChangeKind, utf16_len};
use crate::style::PageLink;

/// Commands queued during a transaction and executed once it settles.
#[derive(Debug, Clone, PartialEq)]
pub enum DeferredCommand {
    SetSelection(Selection),
    OpenPageLinkPrompt { range: Range<usize> },
}

/// Notifications for the view layer, drained with
/// [`BlockDocument::take_events`].
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentEvent {
    /// `[[` was typed; the view should ask for a page and then call
    /// [`BlockDocument::insert_page_link`] with the range.
    OpenPageLinkPrompt { range: Range<usize> },
    PageLinkInserted { range: Range<usize>, link: PageLink },
}

#[derive(Debug, Default)]
pub struct EditTransaction {
    pub(crate) edit_count: usize,
    /// The classified edit of the current top-level transaction.
    pub(crate) last_edit: Option<Edit>,
    /// Caret after the transaction, kept current through every change.
    pub(crate) caret: Option<usize>,
    pub(crate) deferred: Vec<DeferredCommand>,
    /// Ordered-list blocks whose run must be renumbered, with an index hint.
    pub(crate) renumber: Vec<(BlockId, usize)>,
    pub(crate) before: Option<DocumentState>,
    pub(crate) label: &'static str,
    /// A markdown shortcut fired; closes the current typing group.
    pub(crate) promoted: bool,
    /// Ranges invalidated by the last settled transaction.
    pub(crate) last_changed: Vec<Range<usize>>,
}

impl EditTransaction {
    pub fn is_editing(&self) -> bool {
        self.edit_count > 0
    }

    pub(crate) fn transform_caret(&mut self, change: &BufferChange) {
        if change.kind != ChangeKind::Characters {
            return;
        }
        if let Some(caret) = self.caret.as_mut() {
            *caret = transform_offset(*caret, change);
        }
    }
}

/// Map a pre-change offset through a change. Offsets inside the replaced
/// range land at the end of the replacement.
pub(crate) fn transform_offset(offset: usize, change: &BufferChange) -> usize {
    if offset >= change.range.end {
        (offset as isize + change.delta()) as usize
    } else if offset > change.range.start {
        change.range.start + change.replacement_len
    } else {
        offset
    }
}

fn transform_range(range: &mut Range<usize>, change: &BufferChange) {
    if range.start >= change.range.end {
        range.start = transform_offset(range.start, change);
        range.end = transform_offset(range.end, change);
    } else if range.end >= change.range.start {
        let new = change.new_range();
        let end = transform_offset(range.end, change);
        range.start = range.start.min(new.start);
        range.end = end.max(new.end);
    }
}

/// Coalesce a change journal into disjoint ranges in final coordinates.
pub(crate) fn invalidated_ranges(changes: &[BufferChange]) -> Vec<Range<usize>> {
    let mut ranges: Vec<Range<usize>> = Vec::new();
    for change in changes {
        for range in &mut ranges {
            transform_range(range, change);
        }
        ranges.push(change.new_range());
    }
    ranges.sort_by_key(|r| r.start);
    let mut merged: Vec<Range<usize>> = Vec::new();
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
            _ => merged.push(range),
        }
    }
    merged
}

impl BlockDocument {
    pub fn is_editing(&self) -> bool {
        self.transaction.is_editing()
    }

    pub fn begin_editing(&mut self) {
        if self.transaction.edit_count == 0 {
            self.transaction.before = Some(self.state());
            self.transaction.label = "Edit";
            self.transaction.promoted = false;
            self.transaction.caret = None;
            self.buffer.take_changes();
        }
        self.transaction.edit_count += 1;
    }

    pub fn end_editing(&mut self) {
        assert!(
            self.transaction.edit_count > 0,
            "end_editing without begin_editing"
        );
        self.transaction.edit_count -= 1;
        if self.transaction.edit_count == 0 {
            self.settle();
        }
    }

    /// Queue a command to run when the current transaction settles.
    pub(crate) fn defer(&mut self, command: DeferredCommand) {
        self.transaction.deferred.push(command);
    }

    fn settle(&mut self) {
        self.renumber_pending();

        let caret = self.transaction.caret;
        self.ensure_trailing_text_block();
        self.transaction.caret = caret;

        self.stamp();
        if cfg!(debug_assertions) {
            self.check_invariants();
        }

        if let Some(caret) = self.transaction.caret.take() {
            let caret = caret.min(self.len());
            let index = self.index_at(caret);
            self.selection = self.clamp_selection(Selection::caret(index, caret));
        } else {
            self.selection = self.clamp_selection(self.selection.clone());
        }

        for command in std::mem::take(&mut self.transaction.deferred) {
            match command {
                DeferredCommand::SetSelection(selection) => self.set_selection(selection),
                DeferredCommand::OpenPageLinkPrompt { range } => {
                    self.events.push(DocumentEvent::OpenPageLinkPrompt { range })
                }
            }
        }

        let changes = self.buffer.take_changes();
        let before = self.transaction.before.take();
        let edit = self.transaction.last_edit.take();
        if changes.is_empty() {
            self.transaction.last_changed.clear();
            return;
        }

        let changed = invalidated_ranges(&changes);
        trace!("transaction settled, invalidated {changed:?}");
        self.invalidated.extend(changed.iter().cloned());
        self.transaction.last_changed = changed;

        if let Some(state) = before {
            let typing = edit.as_ref().is_some_and(is_typing);
            let coalesce = typing
                && !self.transaction.promoted
                && edit
                    .as_ref()
                    .is_some_and(|e| self.typing_run_end == Some(e.range.start));
            let label = if typing {
                "Typing"
            } else {
                self.transaction.label
            };
            self.undo_log.record(UndoEntry { label, state }, coalesce);
            self.typing_run_end = if typing && !self.transaction.promoted {
                self.selection.caret_offset()
            } else {
                None
            };
        }
        self.version += 1;
    }
}

fn is_typing(edit: &Edit) -> bool {
    edit.kind == EditKind::Insert && utf16_len(&edit.text) == 1 && edit.text != "\n"
}
