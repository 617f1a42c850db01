//! Renderable view items.
//!
//! The renderer emits a flat `Vec<ViewItem>`; nesting is expressed through
//! `indent` only. Items are plain data and serialize to JSON tagged by
//! `"item"`, so a presentation layer (or the `folio` CLI) can consume them
//! without linking the renderer.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use folio_types::{
    Align, BlockId, DividerStyle, FileType, MarkKind, ObjectId, RelationFormat, RelationKey,
    RelationOption,
};

use crate::mode::ItemMode;

/// Id of the synthetic title emitted for note-layout documents.
pub const NOTE_TITLE_ID: &str = "_note_title";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "item", rename_all = "snake_case")]
pub enum ViewItem {
    /// Read-only header of an archived document.
    ArchiveTitle { id: BlockId, text: Option<String> },
    /// Placeholder title for note-layout documents.
    NoteTitle { id: BlockId },
    Title(TitleView),
    Text(TextView),
    Description(DescriptionView),
    Code(CodeView),
    Divider {
        id: BlockId,
        indent: usize,
        style: DividerStyle,
        is_selected: bool,
    },
    Bookmark {
        #[serde(flatten)]
        frame: ItemFrame,
        state: ResourceState<BookmarkView>,
    },
    File {
        #[serde(flatten)]
        frame: ItemFrame,
        file_type: FileType,
        state: ResourceState<FileView>,
    },
    /// Link to another object.
    Page {
        #[serde(flatten)]
        frame: ItemFrame,
        target: ObjectId,
        state: ResourceState<PageView>,
    },
    Relation {
        id: BlockId,
        indent: usize,
        state: RelationState,
    },
    FeaturedRelations {
        id: BlockId,
        relations: Vec<RelationView>,
    },
}

impl ViewItem {
    pub fn id(&self) -> &BlockId {
        match self {
            ViewItem::ArchiveTitle { id, .. }
            | ViewItem::NoteTitle { id }
            | ViewItem::Divider { id, .. }
            | ViewItem::Relation { id, .. }
            | ViewItem::FeaturedRelations { id, .. } => id,
            ViewItem::Title(title) => &title.id,
            ViewItem::Text(text) => &text.id,
            ViewItem::Description(description) => &description.id,
            ViewItem::Code(code) => &code.id,
            ViewItem::Bookmark { frame, .. }
            | ViewItem::File { frame, .. }
            | ViewItem::Page { frame, .. } => &frame.id,
        }
    }

    /// Short name of the item kind, for logs and outlines.
    pub fn kind(&self) -> &'static str {
        match self {
            ViewItem::ArchiveTitle { .. } => "archive_title",
            ViewItem::NoteTitle { .. } => "note_title",
            ViewItem::Title(_) => "title",
            ViewItem::Text(text) => text.kind.name(),
            ViewItem::Description(_) => "description",
            ViewItem::Code(_) => "code",
            ViewItem::Divider { .. } => "divider",
            ViewItem::Bookmark { .. } => "bookmark",
            ViewItem::File { .. } => "file",
            ViewItem::Page { .. } => "page",
            ViewItem::Relation { .. } => "relation",
            ViewItem::FeaturedRelations { .. } => "featured_relations",
        }
    }

    pub fn indent(&self) -> usize {
        match self {
            ViewItem::Text(text) => text.indent,
            ViewItem::Code(code) => code.indent,
            ViewItem::Divider { indent, .. } | ViewItem::Relation { indent, .. } => *indent,
            ViewItem::Bookmark { frame, .. }
            | ViewItem::File { frame, .. }
            | ViewItem::Page { frame, .. } => frame.indent,
            _ => 0,
        }
    }

    /// Editable text of the item, if it has any.
    pub fn text(&self) -> Option<&str> {
        match self {
            ViewItem::Title(title) => Some(&title.text),
            ViewItem::Text(text) => Some(&text.text),
            ViewItem::Description(description) => Some(&description.text),
            ViewItem::Code(code) => Some(&code.text),
            _ => None,
        }
    }

    /// Items that can take keyboard focus and receive merged text.
    pub fn is_text_like(&self) -> bool {
        matches!(self, ViewItem::Text(_) | ViewItem::Code(_))
    }

    pub fn is_focused(&self) -> bool {
        match self {
            ViewItem::Title(title) => title.is_focused,
            ViewItem::Text(text) => text.is_focused,
            ViewItem::Description(description) => description.is_focused,
            ViewItem::Code(code) => code.is_focused,
            _ => false,
        }
    }

    pub fn is_selected(&self) -> bool {
        match self {
            ViewItem::Text(text) => text.is_selected,
            ViewItem::Code(code) => code.is_selected,
            ViewItem::Divider { is_selected, .. } => *is_selected,
            ViewItem::Bookmark { frame, .. }
            | ViewItem::File { frame, .. }
            | ViewItem::Page { frame, .. } => frame.is_selected,
            _ => false,
        }
    }
}

/// Common header of block-backed media items.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFrame {
    pub id: BlockId,
    pub indent: usize,
    pub mode: ItemMode,
    pub is_selected: bool,
}

/// Three-state projection of remote resources.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "view", rename_all = "snake_case")]
pub enum ResourceState<T> {
    /// Nothing to show yet.
    Placeholder,
    Uploading,
    /// Present but unusable; carries whatever identifies the resource.
    Error(Option<String>),
    Ready(T),
}

impl<T> ResourceState<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, ResourceState::Ready(_))
    }
}

// ── Text-like items ─────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "style", rename_all = "snake_case")]
pub enum TextKind {
    Paragraph,
    H1,
    H2,
    H3,
    Quote,
    Bulleted,
    Numbered { number: usize },
    Checkbox { checked: bool },
    Toggle { expanded: bool, is_empty: bool },
}

impl TextKind {
    pub fn name(&self) -> &'static str {
        match self {
            TextKind::Paragraph => "paragraph",
            TextKind::H1 => "h1",
            TextKind::H2 => "h2",
            TextKind::H3 => "h3",
            TextKind::Quote => "quote",
            TextKind::Bulleted => "bulleted",
            TextKind::Numbered { .. } => "numbered",
            TextKind::Checkbox { .. } => "checkbox",
            TextKind::Toggle { .. } => "toggle",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextView {
    pub id: BlockId,
    pub kind: TextKind,
    pub text: String,
    pub marks: Vec<MarkView>,
    pub color: Option<String>,
    pub background_color: Option<String>,
    pub align: Option<Align>,
    pub indent: usize,
    pub mode: ItemMode,
    pub is_focused: bool,
    pub cursor: Option<usize>,
    pub is_selected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeView {
    pub id: BlockId,
    pub text: String,
    pub lang: Option<String>,
    pub color: Option<String>,
    pub background_color: Option<String>,
    pub indent: usize,
    pub mode: ItemMode,
    pub is_focused: bool,
    pub cursor: Option<usize>,
    pub is_selected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionView {
    pub id: BlockId,
    pub text: String,
    pub mode: ItemMode,
    pub is_focused: bool,
    pub cursor: Option<usize>,
}

/// A mark with mention/object-link targets resolved against details.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkView {
    pub range: Range<usize>,
    pub kind: MarkKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<ObjectRef>,
}

/// Another object as shown inline (mentions, relation values, links).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub id: ObjectId,
    pub name: Option<String>,
    pub emoji: Option<String>,
    pub image: Option<String>,
    /// Details for the object have not arrived yet.
    pub loading: bool,
    pub deleted: bool,
}

// ── Title ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleView {
    pub id: BlockId,
    pub text: String,
    pub layout: TitleLayout,
    pub cover: Option<Cover>,
    pub mode: ItemMode,
    pub is_focused: bool,
    pub cursor: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum TitleLayout {
    Basic { emoji: Option<String>, image: Option<String> },
    Todo { checked: bool },
    Profile { image: Option<String> },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cover", content = "value", rename_all = "snake_case")]
pub enum Cover {
    Image(String),
    Color(String),
    Gradient(String),
}

// ── Media ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkView {
    pub url: String,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub favicon_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileView {
    pub url: String,
    pub name: Option<String>,
    pub mime: Option<String>,
    pub size: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageView {
    pub name: Option<String>,
    pub emoji: Option<String>,
    pub image: Option<String>,
    pub archived: bool,
}

// ── Relations ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RelationState {
    Placeholder,
    Related { view: RelationView, background: Option<String> },
}

/// One relation value, projected by format.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum RelationView {
    Default {
        key: RelationKey,
        name: String,
        format: RelationFormat,
        value: Option<String>,
    },
    Checkbox { key: RelationKey, name: String, checked: bool },
    Status { key: RelationKey, name: String, options: Vec<RelationOption> },
    Tags { key: RelationKey, name: String, options: Vec<RelationOption> },
    Object { key: RelationKey, name: String, objects: Vec<ObjectRef> },
    File { key: RelationKey, name: String, files: Vec<ObjectRef> },
    ObjectType { key: RelationKey, name: String, type_id: ObjectId },
}

impl RelationView {
    pub fn key(&self) -> &RelationKey {
        match self {
            RelationView::Default { key, .. }
            | RelationView::Checkbox { key, .. }
            | RelationView::Status { key, .. }
            | RelationView::Tags { key, .. }
            | RelationView::Object { key, .. }
            | RelationView::File { key, .. }
            | RelationView::ObjectType { key, .. } => key,
        }
    }

    /// Whether the view has nothing worth showing in a featured strip.
    pub fn is_empty(&self) -> bool {
        match self {
            RelationView::Default { value, .. } => value.is_none(),
            RelationView::Checkbox { .. } | RelationView::ObjectType { .. } => false,
            RelationView::Status { options, .. } | RelationView::Tags { options, .. } => {
                options.is_empty()
            }
            RelationView::Object { objects, .. } => objects.is_empty(),
            RelationView::File { files, .. } => files.is_empty(),
        }
    }
}
