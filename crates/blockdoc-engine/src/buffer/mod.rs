//! # Character Buffer
//!
//! The single source of truth for every character in a document. Text lives in
//! an `xi_rope::Rope`; offsets exposed to the rest of the engine are UTF-16
//! code units and are converted to rope byte offsets at this boundary.
//!
//! Every mutation produces a [`BufferChange`] that is broadcast to the
//! registered [`BufferObserver`]s before the mutating call returns.

pub mod attributes;
pub mod utf16;

use std::ops::Range;

use xi_rope::delta::Builder;
use xi_rope::rope::{BaseMetric, Utf16CodeUnitsMetric};
use xi_rope::Rope;

use crate::style::Attributes;
pub use attributes::{AttributeRun, AttributeRuns};
pub use utf16::utf16_len;

/// What a [`BufferChange`] touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Characters,
    Attributes,
}

/// Structural change notification: `range` in pre-edit coordinates was
/// replaced by `replacement_len` code units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferChange {
    pub range: Range<usize>,
    pub replacement_len: usize,
    pub kind: ChangeKind,
}

impl BufferChange {
    /// Net change in buffer length.
    pub fn delta(&self) -> isize {
        self.replacement_len as isize - self.range.len() as isize
    }

    /// The changed range in post-edit coordinates.
    pub fn new_range(&self) -> Range<usize> {
        self.range.start..self.range.start + self.replacement_len
    }
}

/// Consumers of buffer changes (layout invalidation, caches).
pub trait BufferObserver {
    fn buffer_did_change(&mut self, change: &BufferChange);
}

/// Cheap copy of the buffer contents, used for undo snapshots.
#[derive(Clone)]
pub struct BufferSnapshot {
    rope: Rope,
    len: usize,
    runs: AttributeRuns,
}

impl std::fmt::Debug for BufferSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferSnapshot")
            .field("len", &self.len)
            .field("runs", &self.runs)
            .finish_non_exhaustive()
    }
}

pub struct CharacterBuffer {
    rope: Rope,
    /// Length in UTF-16 code units.
    len: usize,
    runs: AttributeRuns,
    observers: Vec<Box<dyn BufferObserver>>,
    /// Changes since the last `take_changes`.
    journal: Vec<BufferChange>,
}

impl CharacterBuffer {
    pub fn new() -> Self {
        Self::from_text("", Attributes::default())
    }

    pub fn from_text(text: &str, attributes: Attributes) -> Self {
        let len = utf16_len(text);
        Self {
            rope: Rope::from(text),
            len,
            runs: AttributeRuns::uniform(len, attributes),
            observers: Vec::new(),
            journal: Vec::new(),
        }
    }

    /// Length in UTF-16 code units.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drain the change journal accumulated since the previous call.
    pub fn take_changes(&mut self) -> Vec<BufferChange> {
        std::mem::take(&mut self.journal)
    }

    pub fn add_observer(&mut self, observer: Box<dyn BufferObserver>) {
        self.observers.push(observer);
    }

    /// The whole buffer as a string.
    pub fn string(&self) -> String {
        self.rope.to_string()
    }

    /// Text of a UTF-16 range.
    pub fn substring(&self, range: Range<usize>) -> String {
        self.check_range(&range);
        let bytes = self.byte_range(range);
        self.rope.slice_to_cow(bytes).into_owned()
    }

    /// The UTF-16 code unit at `offset`, if any.
    pub fn unit_at(&self, offset: usize) -> Option<u16> {
        if offset >= self.len {
            return None;
        }
        let start = self.to_byte(offset);
        let end = self.rope.next_codepoint_offset(start)?;
        let text = self.rope.slice_to_cow(start..end);
        let mut units = [0u16; 2];
        let ch = text.chars().next()?;
        Some(ch.encode_utf16(&mut units)[0])
    }

    pub fn is_newline_at(&self, offset: usize) -> bool {
        self.unit_at(offset) == Some(u16::from(b'\n'))
    }

    pub fn attributes_at(&self, offset: usize) -> &Attributes {
        self.runs.at(offset)
    }

    /// Attribute runs clipped to `range`.
    pub fn runs(&self, range: Range<usize>) -> Vec<(Range<usize>, &Attributes)> {
        self.check_range(&range);
        self.runs.slice(range)
    }

    /// Whether `offset` sits between characters rather than between the two
    /// halves of a surrogate pair.
    pub fn is_char_boundary(&self, offset: usize) -> bool {
        offset == 0 || offset >= self.len || self.to_utf16(self.to_byte(offset)) == offset
    }

    /// Widen `range` so that neither end splits a surrogate pair. An empty
    /// range inside a pair moves past the character.
    pub fn char_range(&self, range: Range<usize>) -> Range<usize> {
        if range.is_empty() && !self.is_char_boundary(range.start) {
            return range.start + 1..range.start + 1;
        }
        let start = if self.is_char_boundary(range.start) {
            range.start
        } else {
            range.start - 1
        };
        let end = if self.is_char_boundary(range.end) {
            range.end
        } else {
            range.end + 1
        };
        start..end.max(start)
    }

    /// Replace `range` with `text`, inheriting typing attributes.
    pub fn replace(&mut self, range: Range<usize>, text: &str) -> BufferChange {
        let attributes = self.typing_attributes(&range);
        self.replace_with_attributes(range, text, attributes)
    }

    /// Replace `range` with `text` carrying `attributes`.
    ///
    /// # Panics
    /// Panics when `range` is out of bounds or splits a surrogate pair: every
    /// offset cache downstream depends on the buffer never being mutated with
    /// a bogus range.
    pub fn replace_with_attributes(
        &mut self,
        range: Range<usize>,
        text: &str,
        attributes: Attributes,
    ) -> BufferChange {
        self.check_range(&range);
        assert!(
            self.is_char_boundary(range.start) && self.is_char_boundary(range.end),
            "buffer range {range:?} splits a surrogate pair"
        );
        let inserted = utf16_len(text);
        let bytes = self.byte_range(range.clone());

        let mut builder = Builder::new(self.rope.len());
        builder.replace(bytes, Rope::from(text));
        let delta = builder.build();
        self.rope = delta.apply(&self.rope);

        self.runs.replace(range.clone(), inserted, attributes);
        self.len = self.len - range.len() + inserted;
        debug_assert_eq!(self.runs.len(), self.len);

        let change = BufferChange {
            range,
            replacement_len: inserted,
            kind: ChangeKind::Characters,
        };
        self.notify(&change);
        change
    }

    pub fn set_attributes(&mut self, range: Range<usize>, attributes: Attributes) -> BufferChange {
        self.modify_attributes(range, |current| *current = attributes.clone())
    }

    pub fn modify_attributes(
        &mut self,
        range: Range<usize>,
        f: impl FnMut(&mut Attributes),
    ) -> BufferChange {
        self.check_range(&range);
        self.runs.modify(range.clone(), f);
        let change = BufferChange {
            replacement_len: range.len(),
            range,
            kind: ChangeKind::Attributes,
        };
        self.notify(&change);
        change
    }

    pub fn snapshot(&self) -> BufferSnapshot {
        BufferSnapshot {
            rope: self.rope.clone(),
            len: self.len,
            runs: self.runs.clone(),
        }
    }

    /// Restore a snapshot, reported as one full-range replacement.
    pub fn restore(&mut self, snapshot: BufferSnapshot) -> BufferChange {
        let old_len = self.len;
        self.rope = snapshot.rope;
        self.len = snapshot.len;
        self.runs = snapshot.runs;
        let change = BufferChange {
            range: 0..old_len,
            replacement_len: self.len,
            kind: ChangeKind::Characters,
        };
        self.notify(&change);
        change
    }

    /// Attributes new text picks up: those of the first replaced unit, else
    /// of the unit before the insertion point. Link targets never propagate.
    fn typing_attributes(&self, range: &Range<usize>) -> Attributes {
        let source = if !range.is_empty() {
            Some(range.start)
        } else if range.start > 0 {
            Some(range.start - 1)
        } else if self.len > 0 {
            Some(0)
        } else {
            None
        };
        let mut attributes = source
            .map(|offset| self.runs.at(offset).clone())
            .unwrap_or_default();
        attributes.link = None;
        attributes.page_link = None;
        attributes
    }

    fn notify(&mut self, change: &BufferChange) {
        for observer in &mut self.observers {
            observer.buffer_did_change(change);
        }
        self.journal.push(change.clone());
    }

    fn check_range(&self, range: &Range<usize>) {
        assert!(
            range.start <= range.end && range.end <= self.len,
            "buffer range {range:?} out of bounds (len: {})",
            self.len
        );
    }

    fn to_byte(&self, offset: usize) -> usize {
        if offset == 0 {
            0
        } else if offset >= self.len {
            self.rope.len()
        } else {
            self.rope
                .convert_metrics::<Utf16CodeUnitsMetric, BaseMetric>(offset)
        }
    }

    /// `byte` must be a character boundary of the rope.
    fn to_utf16(&self, byte: usize) -> usize {
        if byte == 0 {
            0
        } else if byte >= self.rope.len() {
            self.len
        } else {
            self.rope
                .convert_metrics::<BaseMetric, Utf16CodeUnitsMetric>(byte)
        }
    }

    fn byte_range(&self, range: Range<usize>) -> Range<usize> {
        self.to_byte(range.start)..self.to_byte(range.end)
    }
}

impl Default for CharacterBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CharacterBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CharacterBuffer")
            .field("text", &self.string())
            .field("len", &self.len)
            .field("runs", &self.runs)
            .finish()
    }
}
