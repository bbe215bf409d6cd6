//! Block-level and inline styling.
//!
//! Block styles are stamped over a block's whole range by
//! `apply_styles`; inline styles are a small bitset carried per attribute run.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::blocks::BlockKind;

/// Inline style flags that can be toggled over a character range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InlineStyle {
    Bold,
    Italic,
    Code,
    Underline,
    Highlight,
    Strikethrough,
}

impl InlineStyle {
    pub const ALL: [InlineStyle; 6] = [
        InlineStyle::Bold,
        InlineStyle::Italic,
        InlineStyle::Code,
        InlineStyle::Underline,
        InlineStyle::Highlight,
        InlineStyle::Strikethrough,
    ];

    fn bit(self) -> u8 {
        1 << self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            InlineStyle::Bold => "bold",
            InlineStyle::Italic => "italic",
            InlineStyle::Code => "code",
            InlineStyle::Underline => "underline",
            InlineStyle::Highlight => "highlight",
            InlineStyle::Strikethrough => "strikethrough",
        }
    }
}

/// Set of [`InlineStyle`] flags. Serializes as a list of names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<InlineStyle>", into = "Vec<InlineStyle>")]
pub struct InlineStyles(u8);

impl InlineStyles {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn contains(self, style: InlineStyle) -> bool {
        self.0 & style.bit() != 0
    }

    pub fn insert(&mut self, style: InlineStyle) {
        self.0 |= style.bit();
    }

    pub fn remove(&mut self, style: InlineStyle) {
        self.0 &= !style.bit();
    }

    pub fn with(mut self, style: InlineStyle) -> Self {
        self.insert(style);
        self
    }

    pub fn without(mut self, style: InlineStyle) -> Self {
        self.remove(style);
        self
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = InlineStyle> {
        InlineStyle::ALL.into_iter().filter(move |s| self.contains(*s))
    }
}

impl From<InlineStyle> for InlineStyles {
    fn from(style: InlineStyle) -> Self {
        Self::empty().with(style)
    }
}

impl FromIterator<InlineStyle> for InlineStyles {
    fn from_iter<I: IntoIterator<Item = InlineStyle>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

impl From<Vec<InlineStyle>> for InlineStyles {
    fn from(styles: Vec<InlineStyle>) -> Self {
        styles.into_iter().collect()
    }
}

impl From<InlineStyles> for Vec<InlineStyle> {
    fn from(styles: InlineStyles) -> Self {
        styles.iter().collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub family: String,
    pub size: f32,
    pub bold: bool,
}

/// Paragraph metrics in points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParagraphStyle {
    pub line_spacing: f32,
    pub spacing_before: f32,
    pub spacing_after: f32,
    pub head_indent: f32,
    pub first_line_head_indent: f32,
    pub tab_stop: Option<f32>,
}

/// Canonical paragraph-level style of one block kind at one indentation level.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStyle {
    pub kind: BlockKind,
    pub level: u8,
    pub font: Font,
    pub paragraph: ParagraphStyle,
}

/// Document-wide style parameters from which every [`BlockStyle`] is derived.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSheet {
    pub base_font_size: f32,
    pub font_family: String,
    pub code_font_family: String,
    pub indent_width: f32,
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self {
            base_font_size: 16.0,
            font_family: "system-ui".to_string(),
            code_font_family: "monospace".to_string(),
            indent_width: 24.0,
        }
    }
}

impl StyleSheet {
    pub fn block_style(&self, kind: BlockKind, level: u8) -> BlockStyle {
        let base = self.base_font_size;
        let text_font = |size: f32, bold: bool| Font {
            family: self.font_family.clone(),
            size,
            bold,
        };
        let (font, paragraph) = match kind {
            BlockKind::Text => (text_font(base, false), self.body_paragraph()),
            BlockKind::Header1 => (
                text_font(base * 1.75, true),
                ParagraphStyle {
                    spacing_before: base,
                    ..self.body_paragraph()
                },
            ),
            BlockKind::Header2 => (
                text_font(base * 1.35, true),
                ParagraphStyle {
                    spacing_before: base * 0.75,
                    ..self.body_paragraph()
                },
            ),
            BlockKind::List | BlockKind::OrderedList => {
                let indent = self.indent_width * f32::from(level);
                (
                    text_font(base, false),
                    ParagraphStyle {
                        head_indent: indent + self.indent_width,
                        first_line_head_indent: indent,
                        tab_stop: Some(indent + self.indent_width),
                        ..self.body_paragraph()
                    },
                )
            }
            BlockKind::Code => (
                Font {
                    family: self.code_font_family.clone(),
                    size: base * 0.875,
                    bold: false,
                },
                ParagraphStyle {
                    line_spacing: 1.2,
                    ..ParagraphStyle::default()
                },
            ),
            BlockKind::Image => (text_font(base, false), ParagraphStyle::default()),
        };
        BlockStyle {
            kind,
            level,
            font,
            paragraph,
        }
    }

    fn body_paragraph(&self) -> ParagraphStyle {
        ParagraphStyle {
            line_spacing: 1.3,
            spacing_after: self.base_font_size * 0.5,
            ..ParagraphStyle::default()
        }
    }
}

/// Target of an internal link to another page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    pub page: Uuid,
    pub title: String,
}

/// Everything attached to one character of the buffer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    pub block: Option<BlockStyle>,
    pub inline: InlineStyles,
    pub link: Option<String>,
    pub page_link: Option<PageLink>,
}

impl Attributes {
    pub fn with_block(block: BlockStyle) -> Self {
        Self {
            block: Some(block),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_inline_styles_set_operations() {
        let styles = InlineStyles::from(InlineStyle::Bold).with(InlineStyle::Code);
        assert!(styles.contains(InlineStyle::Bold));
        assert!(styles.contains(InlineStyle::Code));
        assert!(!styles.contains(InlineStyle::Italic));
        assert_eq!(
            styles.iter().collect::<Vec<_>>(),
            vec![InlineStyle::Bold, InlineStyle::Code]
        );
        assert!(styles.without(InlineStyle::Bold).without(InlineStyle::Code).is_empty());
    }

    #[test]
    fn test_inline_styles_serialize_as_names() {
        let styles: InlineStyles = [InlineStyle::Italic, InlineStyle::Strikethrough]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&styles).unwrap();
        assert_eq!(json, r#"["italic","strikethrough"]"#);
        let back: InlineStyles = serde_json::from_str(&json).unwrap();
        assert_eq!(back, styles);
    }

    #[test]
    fn test_list_indent_grows_with_level() {
        let sheet = StyleSheet::default();
        let level0 = sheet.block_style(BlockKind::List, 0);
        let level2 = sheet.block_style(BlockKind::List, 2);
        assert_eq!(level0.paragraph.first_line_head_indent, 0.0);
        assert_eq!(level2.paragraph.first_line_head_indent, 48.0);
        assert_eq!(level2.paragraph.tab_stop, Some(72.0));
    }

    #[test]
    fn test_code_uses_code_font() {
        let sheet = StyleSheet {
            code_font_family: "Iosevka".to_string(),
            ..StyleSheet::default()
        };
        assert_eq!(sheet.block_style(BlockKind::Code, 0).font.family, "Iosevka");
        assert!(sheet.block_style(BlockKind::Header1, 0).font.bold);
    }
}
