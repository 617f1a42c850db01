//! Text content: the payload of paragraphs, headings, list items and titles.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::EnumString;

use crate::marks::{self, Mark, MarkType};

/// Visual style of a text block. Mutually exclusive; changes the rendered shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive, serialize_all = "snake_case")]
pub enum TextStyle {
    #[default]
    #[strum(serialize = "paragraph", serialize = "p")]
    Paragraph,
    Title,
    #[strum(serialize = "h1", serialize = "header1")]
    H1,
    #[strum(serialize = "h2", serialize = "header2")]
    H2,
    #[strum(serialize = "h3", serialize = "header3")]
    H3,
    Numbered,
    #[strum(serialize = "bulleted", serialize = "bullet")]
    Bulleted,
    Checkbox,
    Toggle,
    Quote,
    Code,
    Description,
}

impl TextStyle {
    /// Parse from string (case-insensitive).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TextStyle::Paragraph => "paragraph",
            TextStyle::Title => "title",
            TextStyle::H1 => "h1",
            TextStyle::H2 => "h2",
            TextStyle::H3 => "h3",
            TextStyle::Numbered => "numbered",
            TextStyle::Bulleted => "bulleted",
            TextStyle::Checkbox => "checkbox",
            TextStyle::Toggle => "toggle",
            TextStyle::Quote => "quote",
            TextStyle::Code => "code",
            TextStyle::Description => "description",
        }
    }

    /// List-like styles: enter on an empty item turns it back into a paragraph.
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            TextStyle::Bulleted | TextStyle::Numbered | TextStyle::Checkbox | TextStyle::Toggle
        )
    }

    pub fn is_header(&self) -> bool {
        matches!(self, TextStyle::H1 | TextStyle::H2 | TextStyle::H3)
    }

    /// Whether a block with this style may own nested children.
    pub fn supports_nesting(&self) -> bool {
        matches!(
            self,
            TextStyle::Paragraph
                | TextStyle::Bulleted
                | TextStyle::Numbered
                | TextStyle::Checkbox
                | TextStyle::Toggle
        )
    }
}

impl std::fmt::Display for TextStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Horizontal alignment of a text block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive, serialize_all = "snake_case")]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Text payload of a block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TextContent {
    pub text: String,
    /// Inline annotations, sorted by start and non-overlapping per [`MarkType`].
    #[serde(default)]
    pub marks: Vec<Mark>,
    #[serde(default)]
    pub style: TextStyle,
    /// Only meaningful for [`TextStyle::Checkbox`] (and Todo titles).
    #[serde(default)]
    pub is_checked: Option<bool>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub align: Option<Align>,
}

impl TextContent {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
            ..Default::default()
        }
    }

    /// Length in chars. Cursor positions and mark ranges are char offsets.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_list(&self) -> bool {
        self.style.is_list()
    }

    /// The checked state after a checkbox click.
    pub fn toggled_check(&self) -> bool {
        !self.is_checked.unwrap_or(false)
    }

    /// Apply a mark, keeping marks non-overlapping per type.
    pub fn apply_mark(&mut self, mark: Mark) {
        self.marks = marks::apply(&self.marks, mark);
    }

    /// Strip every mark of `kind` from `range`.
    pub fn remove_marks(&mut self, kind: MarkType, range: std::ops::Range<usize>) {
        self.marks = marks::remove(&self.marks, kind, range);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MarkKind;

    #[test]
    fn test_style_parse_aliases() {
        assert_eq!(TextStyle::from_str("P"), Some(TextStyle::Paragraph));
        assert_eq!(TextStyle::from_str("bullet"), Some(TextStyle::Bulleted));
        assert_eq!(TextStyle::from_str("header2"), Some(TextStyle::H2));
        assert_eq!(TextStyle::from_str("nope"), None);
    }

    #[test]
    fn test_list_and_nesting_classification() {
        assert!(TextStyle::Toggle.is_list());
        assert!(!TextStyle::Quote.is_list());
        assert!(TextStyle::Paragraph.supports_nesting());
        assert!(!TextStyle::Title.supports_nesting());
        assert!(!TextStyle::Code.supports_nesting());
    }

    #[test]
    fn test_char_len_counts_chars_not_bytes() {
        let content = TextContent::new("héllo", TextStyle::Paragraph);
        assert_eq!(content.char_len(), 5);
    }

    #[test]
    fn test_toggled_check_from_unset() {
        let mut content = TextContent::new("todo", TextStyle::Checkbox);
        assert!(content.toggled_check());
        content.is_checked = Some(true);
        assert!(!content.toggled_check());
    }

    #[test]
    fn test_apply_mark_through_content() {
        let mut content = TextContent::new("hello world", TextStyle::Paragraph);
        content.apply_mark(Mark::new(0..5, MarkKind::Bold));
        content.apply_mark(Mark::new(3..8, MarkKind::Bold));
        assert_eq!(content.marks, vec![Mark::new(0..8, MarkKind::Bold)]);
    }
}
