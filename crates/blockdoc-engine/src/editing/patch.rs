use super::Selection;

/// Result of applying a [`Cmd`](super::Cmd): what changed and where the
/// selection ended up.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub accepted: bool,
    /// Invalidated buffer ranges, in post-edit coordinates.
    pub changed: Vec<std::ops::Range<usize>>,
    pub selection: Selection,
    pub version: u64,
}
