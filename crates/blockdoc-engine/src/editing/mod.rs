/*!
 * # Editing Core
 *
 * A [`BlockDocument`] is an ordered sequence of typed blocks layered over one
 * flat [`CharacterBuffer`](crate::buffer::CharacterBuffer). Every character
 * belongs to exactly one block; blocks are contiguous and gapless, and every
 * block but the last ends with a `'\n'` separator.
 *
 * ## Edit Pipeline
 *
 * 1. **Gatekeeping**: `should_change_text` vetoes read-only or empty edits.
 * 2. **Classification**: the `(range, text)` request is classified once
 *    against the block owning `range.start` ([`EditKind`]).
 * 3. **Block hook**: the owning block's kind decides how the buffer changes
 *    (list markers are protected, images are atomic, code keeps newlines).
 * 4. **Boundaries**: blocks are split, merged or converted; block lengths are
 *    kept in step with the buffer.
 * 5. **Markdown promotion**: single-character insertions may turn the block
 *    into a header, list or code block, or style an inline span.
 * 6. **Settling**: the outermost `end_editing` renumbers ordered lists,
 *    restores the trailing text block, stamps offsets, moves the caret and
 *    records one undo step.
 *
 * ## Module Structure
 *
 * - **`document`**: `BlockDocument`, offset caches and block-sequence primitives
 * - **`edit`**: edit classification and the per-kind edit hooks
 * - **`markdown`**: markdown shortcuts applied while typing
 * - **`commands`**: `Cmd` and the block-level editing commands
 * - **`transaction`**: nested edit transactions, deferred commands and events
 * - **`undo`**: the `UndoLog` seam and the bounded `UndoStack`
 * - **`selection`**: selection model and keyboard extension
 * - **`patch`**: what a command changed
 *
 * ## Usage Pattern
 *
 * ```rust
 * use blockdoc_engine::editing::*;
 *
 * let mut doc = BlockDocument::new();
 * for ch in "# Notes".chars() {
 *     let caret = doc.selection().caret_offset().unwrap_or(doc.len());
 *     doc.request_edit(caret..caret, &ch.to_string());
 * }
 * assert_eq!(doc.text(), "Notes");
 *
 * let patch = doc.apply(Cmd::Undo);
 * assert!(patch.accepted);
 * ```
 */

pub mod commands;
pub mod document;
pub mod edit;
pub mod markdown;
pub mod patch;
pub mod selection;
pub mod transaction;
pub mod undo;

pub use commands::Cmd;
pub use document::{BlockDocument, EditorSettings};
pub use edit::{Edit, EditKind};
pub use patch::Patch;
pub use selection::{Direction, Selection};
pub use transaction::{DeferredCommand, DocumentEvent, EditTransaction};
pub use undo::{DocumentState, UndoEntry, UndoLog, UndoStack};
