//! Block nodes and their content variants.
//!
//! A [`Block`] is one node of the document tree. Nodes reference their
//! children by id only; the tree itself (an id → node arena) lives in
//! `folio-tree`. The content model is a closed sum type so that every
//! consumer (reducer, renderer) matches exhaustively.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::EnumString;

use crate::ids::{BlockId, ObjectId, RelationKey};
use crate::text::{TextContent, TextStyle};

/// One document node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    /// Ordered child ids. Order is significant; duplicates are forbidden.
    #[serde(default)]
    pub children: Vec<BlockId>,
    #[serde(default)]
    pub fields: Fields,
    pub content: Content,
}

impl Block {
    pub fn new(id: impl Into<BlockId>, content: Content) -> Self {
        Self {
            id: id.into(),
            children: Vec::new(),
            fields: Fields::default(),
            content,
        }
    }

    /// Shorthand for a text block.
    pub fn text(id: impl Into<BlockId>, text: impl Into<String>, style: TextStyle) -> Self {
        Self::new(id, Content::Text(TextContent::new(text, style)))
    }

    pub fn with_children<I, T>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<BlockId>,
    {
        self.children = children.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.fields = fields;
        self
    }

    pub fn as_text(&self) -> Option<&TextContent> {
        self.content.as_text()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

// ============================================================================
// Fields
// ============================================================================

/// Free-form block metadata (icon, background, code language, ...).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fields(BTreeMap<String, serde_json::Value>);

impl Fields {
    pub const LANG: &'static str = "lang";
    pub const BACKGROUND: &'static str = "backgroundColor";
    pub const ICON: &'static str = "iconEmoji";

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Code-snippet language.
    pub fn lang(&self) -> Option<&str> {
        self.get_str(Self::LANG)
    }

    pub fn background(&self) -> Option<&str> {
        self.get_str(Self::BACKGROUND)
    }
}

// ============================================================================
// Content
// ============================================================================

/// Typed payload of a block. Exactly one variant per block.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Content {
    Text(TextContent),
    Link(LinkContent),
    File(FileContent),
    Bookmark(BookmarkContent),
    Divider(DividerContent),
    Layout(LayoutContent),
    RelationBlock(RelationBlockContent),
    FeaturedRelations,
    /// Root marker of a document.
    Smart(SmartContent),
}

impl Content {
    pub fn as_text(&self) -> Option<&TextContent> {
        match self {
            Content::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextContent> {
        match self {
            Content::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Variant name, for logs and error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Content::Text(_) => "text",
            Content::Link(_) => "link",
            Content::File(_) => "file",
            Content::Bookmark(_) => "bookmark",
            Content::Divider(_) => "divider",
            Content::Layout(_) => "layout",
            Content::RelationBlock(_) => "relation",
            Content::FeaturedRelations => "featured_relations",
            Content::Smart(_) => "smart",
        }
    }

    /// Whether blocks may be dropped *inside* a block with this content.
    pub fn supports_nesting(&self) -> bool {
        match self {
            Content::Text(text) => text.style.supports_nesting(),
            Content::Link(_) => true,
            _ => false,
        }
    }
}

/// Link to another object (page).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkContent {
    pub target: ObjectId,
    #[serde(default)]
    pub fields: Fields,
}

/// Uploaded media or file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContent {
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mime: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub file_type: FileType,
    #[serde(default)]
    pub state: FileState,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive, serialize_all = "snake_case")]
pub enum FileType {
    #[default]
    None,
    File,
    Image,
    Video,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive, serialize_all = "snake_case")]
pub enum FileState {
    #[default]
    Empty,
    Uploading,
    Done,
    Error,
}

/// Web bookmark. All fields arrive asynchronously after the url is set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkContent {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub favicon: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DividerContent {
    #[serde(default)]
    pub style: DividerStyle,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive, serialize_all = "snake_case")]
pub enum DividerStyle {
    #[default]
    Line,
    Dots,
}

/// Structural container; never rendered itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutContent {
    #[serde(default)]
    pub kind: LayoutKind,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive, serialize_all = "snake_case")]
pub enum LayoutKind {
    Row,
    Column,
    #[default]
    Div,
    Header,
}

/// Block displaying one relation value of the document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationBlockContent {
    #[serde(default)]
    pub key: Option<RelationKey>,
    #[serde(default)]
    pub background: Option<String>,
}

/// Root marker; carries the document's smart-block kind.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmartContent {
    #[serde(default)]
    pub kind: SmartKind,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive, serialize_all = "snake_case")]
pub enum SmartKind {
    #[default]
    Page,
    ProfilePage,
    Archive,
    Set,
    Home,
}

impl SmartKind {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }
}
