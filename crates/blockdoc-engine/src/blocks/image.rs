//! Image blocks: one object-replacement placeholder character backed by an
//! opaque attachment.

use uuid::Uuid;

pub const PLACEHOLDER: char = '\u{FFFC}';
pub const PLACEHOLDER_STR: &str = "\u{FFFC}";

/// Handle to the image data held outside the document.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub id: Uuid,
    pub width: f32,
    pub height: f32,
    /// The backing image could not be loaded; rendered as a placeholder.
    pub missing: bool,
}

impl Attachment {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            id: Uuid::new_v4(),
            width,
            height,
            missing: false,
        }
    }

    pub fn missing(width: f32, height: f32) -> Self {
        Self {
            missing: true,
            ..Self::new(width, height)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageItem {
    pub attachment: Attachment,
    /// Key of the image in the external image store.
    pub key: Option<String>,
}

impl ImageItem {
    pub fn new(attachment: Attachment, key: Option<String>) -> Self {
        Self { attachment, key }
    }
}
