use std::ops::Range;

use crate::style::Attributes;

/// A stretch of `len` code units sharing the same attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeRun {
    pub len: usize,
    pub attributes: Attributes,
}

/// Run-length encoded attributes covering every code unit of the buffer.
///
/// Invariants: the run lengths sum to `len`, no run is empty and no two
/// adjacent runs carry equal attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeRuns {
    runs: Vec<AttributeRun>,
    len: usize,
}

impl AttributeRuns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs covering `len` units with a single attribute set.
    pub fn uniform(len: usize, attributes: Attributes) -> Self {
        let runs = if len == 0 {
            Vec::new()
        } else {
            vec![AttributeRun { len, attributes }]
        };
        Self { runs, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// Attributes of the unit at `offset`.
    ///
    /// # Panics
    /// Panics when `offset >= len()`.
    pub fn at(&self, offset: usize) -> &Attributes {
        assert!(
            offset < self.len,
            "attribute offset {offset} out of bounds (len: {})",
            self.len
        );
        let mut start = 0;
        for run in &self.runs {
            if offset < start + run.len {
                return &run.attributes;
            }
            start += run.len;
        }
        unreachable!("attribute runs do not cover their length")
    }

    /// Replace the attributes of `range` with `inserted` units carrying `attributes`.
    pub fn replace(&mut self, range: Range<usize>, inserted: usize, attributes: Attributes) {
        assert!(
            range.start <= range.end && range.end <= self.len,
            "attribute range {range:?} out of bounds (len: {})",
            self.len
        );
        let first = self.split_at(range.start);
        let last = self.split_at(range.end);
        self.runs.drain(first..last);
        if inserted > 0 {
            self.runs.insert(
                first,
                AttributeRun {
                    len: inserted,
                    attributes,
                },
            );
        }
        self.len = self.len - range.len() + inserted;
        self.normalize();
    }

    /// Apply `f` to the attributes of every unit in `range`.
    pub fn modify(&mut self, range: Range<usize>, mut f: impl FnMut(&mut Attributes)) {
        assert!(
            range.start <= range.end && range.end <= self.len,
            "attribute range {range:?} out of bounds (len: {})",
            self.len
        );
        if range.is_empty() {
            return;
        }
        let first = self.split_at(range.start);
        let last = self.split_at(range.end);
        for run in &mut self.runs[first..last] {
            f(&mut run.attributes);
        }
        self.normalize();
    }

    /// Runs intersecting `range`, clipped to it.
    pub fn slice(&self, range: Range<usize>) -> Vec<(Range<usize>, &Attributes)> {
        let mut result = Vec::new();
        let mut start = 0;
        for run in &self.runs {
            let end = start + run.len;
            let clipped = start.max(range.start)..end.min(range.end);
            if clipped.start < clipped.end {
                result.push((clipped, &run.attributes));
            }
            if end >= range.end {
                break;
            }
            start = end;
        }
        result
    }

    /// Ensure a run boundary at `offset` and return the index of the run
    /// starting there (`runs.len()` when `offset == len`).
    fn split_at(&mut self, offset: usize) -> usize {
        let mut start = 0;
        for i in 0..self.runs.len() {
            let run_len = self.runs[i].len;
            if offset == start {
                return i;
            }
            if offset < start + run_len {
                let head = offset - start;
                let tail = AttributeRun {
                    len: run_len - head,
                    attributes: self.runs[i].attributes.clone(),
                };
                self.runs[i].len = head;
                self.runs.insert(i + 1, tail);
                return i + 1;
            }
            start += run_len;
        }
        self.runs.len()
    }

    fn normalize(&mut self) {
        self.runs.retain(|run| run.len > 0);
        let mut merged: Vec<AttributeRun> = Vec::with_capacity(self.runs.len());
        for run in self.runs.drain(..) {
            match merged.last_mut() {
                Some(previous) if previous.attributes == run.attributes => previous.len += run.len,
                _ => merged.push(run),
            }
        }
        self.runs = merged;
    }
}
