pub mod blocks;
pub mod buffer;
pub mod coding;
pub mod editing;
pub mod style;

// Re-export key types for easier usage
pub use blocks::{Attachment, Block, BlockId, BlockKind, BlockVariant, BlockView, ImageItem, ListItem};
pub use buffer::{BufferChange, BufferObserver, CharacterBuffer, ChangeKind};
pub use coding::{CodedBlock, CodingError, ImageStore, LoadReport};
pub use editing::*;
pub use style::{Attributes, InlineStyle, InlineStyles, PageLink, StyleSheet};
