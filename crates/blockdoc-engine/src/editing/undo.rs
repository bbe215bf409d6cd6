//! Undo log seam.
//!
//! The document records a [`DocumentState`] snapshot at every transaction
//! boundary that changed something. The storage policy is behind the
//! [`UndoLog`] trait; [`UndoStack`] is the bounded in-memory default.

use std::collections::VecDeque;

use log::debug;

use super::{BlockDocument, Selection};
use crate::blocks::Block;
use crate::buffer::BufferSnapshot;

/// Everything needed to put a document back the way it was.
#[derive(Debug, Clone)]
pub struct DocumentState {
    pub(crate) buffer: BufferSnapshot,
    pub(crate) blocks: Vec<Block>,
    pub(crate) selection: Selection,
}

#[derive(Debug, Clone)]
pub struct UndoEntry {
    pub label: &'static str,
    pub state: DocumentState,
}

pub trait UndoLog {
    /// Record the state preceding a transaction. With `coalesce` the entry
    /// joins the previous group and the older snapshot is kept. Recording
    /// always clears the redo side.
    fn record(&mut self, entry: UndoEntry, coalesce: bool);
    fn pop_undo(&mut self) -> Option<UndoEntry>;
    fn push_undo(&mut self, entry: UndoEntry);
    fn pop_redo(&mut self) -> Option<UndoEntry>;
    fn push_redo(&mut self, entry: UndoEntry);
    fn clear(&mut self);
    fn can_undo(&self) -> bool;
    fn can_redo(&self) -> bool;
}

/// Bounded undo/redo stacks; the oldest entries fall off past `limit`.
#[derive(Debug)]
pub struct UndoStack {
    undo: VecDeque<UndoEntry>,
    redo: Vec<UndoEntry>,
    limit: usize,
}

impl UndoStack {
    pub fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            limit,
        }
    }

    pub fn len(&self) -> usize {
        self.undo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo.is_empty()
    }
}

impl UndoLog for UndoStack {
    fn record(&mut self, entry: UndoEntry, coalesce: bool) {
        self.redo.clear();
        if coalesce && !self.undo.is_empty() {
            return;
        }
        self.push_undo(entry);
    }

    fn pop_undo(&mut self) -> Option<UndoEntry> {
        self.undo.pop_back()
    }

    fn push_undo(&mut self, entry: UndoEntry) {
        if self.limit == 0 {
            return;
        }
        self.undo.push_back(entry);
        while self.undo.len() > self.limit {
            self.undo.pop_front();
        }
    }

    fn pop_redo(&mut self) -> Option<UndoEntry> {
        self.redo.pop()
    }

    fn push_redo(&mut self, entry: UndoEntry) {
        self.redo.push(entry);
    }

    fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }
}

impl BlockDocument {
    pub(crate) fn state(&self) -> DocumentState {
        DocumentState {
            buffer: self.buffer.snapshot(),
            blocks: self.blocks.clone(),
            selection: self.selection.clone(),
        }
    }

    pub fn can_undo(&self) -> bool {
        self.undo_log.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo_log.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        if self.transaction.edit_count > 0 {
            return false;
        }
        let Some(entry) = self.undo_log.pop_undo() else {
            return false;
        };
        debug!("undo {}", entry.label);
        let current = UndoEntry {
            label: entry.label,
            state: self.state(),
        };
        self.undo_log.push_redo(current);
        self.restore_state(entry.state);
        true
    }

    pub fn redo(&mut self) -> bool {
        if self.transaction.edit_count > 0 {
            return false;
        }
        let Some(entry) = self.undo_log.pop_redo() else {
            return false;
        };
        debug!("redo {}", entry.label);
        let current = UndoEntry {
            label: entry.label,
            state: self.state(),
        };
        self.undo_log.push_undo(current);
        self.restore_state(entry.state);
        true
    }

    fn restore_state(&mut self, state: DocumentState) {
        let change = self.buffer.restore(state.buffer);
        self.buffer.take_changes();
        self.blocks = state.blocks;
        self.mark_dirty(0);
        self.stamp();
        self.selection = self.clamp_selection(state.selection);
        self.typing_run_end = None;
        self.invalidated.push(change.new_range());
        self.transaction.last_changed = vec![change.new_range()];
        self.version += 1;
        if cfg!(debug_assertions) {
            self.check_invariants();
        }
    }
}
