//! Change events delivered by the sync layer (and replayed locally).
//!
//! Events are internally tagged JSON (`{"type": "set_children", ...}`).
//! Kinds this build does not know deserialize into [`DocEvent::Unknown`]
//! instead of failing, so newer producers can talk to older consumers.
//!
//! Partial ("granular") changes carry `Option` fields: `None` means "not part
//! of this change" and never clears the stored value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use folio_types::{
    Align, Block, BlockId, BookmarkContent, DividerStyle, Fields, FileContent, FileState,
    FileType, LinkContent, Mark, ObjectDetails, ObjectId, Relation, RelationKey, TextContent,
    TextStyle,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocEvent {
    /// Initial snapshot of a document: full tree plus details and relations.
    ShowObject {
        root: BlockId,
        blocks: Vec<Block>,
        #[serde(default)]
        details: BTreeMap<ObjectId, ObjectDetails>,
        #[serde(default)]
        relations: Vec<Relation>,
    },
    /// Discard the tree and install `blocks` wholesale.
    ReplaceTree { blocks: Vec<Block> },
    /// Union new nodes into the tree.
    AppendNodes { blocks: Vec<Block> },
    SetChildren { parent: BlockId, children: Vec<BlockId> },
    DeleteNodes { ids: Vec<BlockId> },
    GranularTextChange { id: BlockId, change: TextChange },
    UpdateFile { id: BlockId, change: FileChange },
    UpdateBookmark { id: BlockId, change: BookmarkChange },
    UpdateLink { id: BlockId, change: LinkChange },
    UpdateDivider { id: BlockId, style: DividerStyle },
    SetRelationKey { id: BlockId, key: RelationKey },
    /// Replace one node's metadata bag wholesale.
    UpdateFields { id: BlockId, fields: Fields },
    /// Merge keys into an object's details.
    UpdateDetails { target: ObjectId, details: ObjectDetails },
    UnsetDetails { target: ObjectId, keys: Vec<String> },
    SetRelations { relations: Vec<Relation> },
    RemoveRelations { keys: Vec<RelationKey> },
    /// Any kind this build does not understand.
    #[serde(other)]
    Unknown,
}

impl DocEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            DocEvent::ShowObject { .. } => "show_object",
            DocEvent::ReplaceTree { .. } => "replace_tree",
            DocEvent::AppendNodes { .. } => "append_nodes",
            DocEvent::SetChildren { .. } => "set_children",
            DocEvent::DeleteNodes { .. } => "delete_nodes",
            DocEvent::GranularTextChange { .. } => "granular_text_change",
            DocEvent::UpdateFile { .. } => "update_file",
            DocEvent::UpdateBookmark { .. } => "update_bookmark",
            DocEvent::UpdateLink { .. } => "update_link",
            DocEvent::UpdateDivider { .. } => "update_divider",
            DocEvent::SetRelationKey { .. } => "set_relation_key",
            DocEvent::UpdateFields { .. } => "update_fields",
            DocEvent::UpdateDetails { .. } => "update_details",
            DocEvent::UnsetDetails { .. } => "unset_details",
            DocEvent::SetRelations { .. } => "set_relations",
            DocEvent::RemoveRelations { .. } => "remove_relations",
            DocEvent::Unknown => "unknown",
        }
    }

    /// Events consumed by the details/relation stores rather than the tree.
    pub fn is_store_event(&self) -> bool {
        matches!(
            self,
            DocEvent::UpdateDetails { .. }
                | DocEvent::UnsetDetails { .. }
                | DocEvent::SetRelations { .. }
                | DocEvent::RemoveRelations { .. }
        )
    }

    pub fn text_change(id: impl Into<BlockId>, change: TextChange) -> Self {
        DocEvent::GranularTextChange { id: id.into(), change }
    }
}

// ── Granular changes ────────────────────────────────────────────────────────

/// Fields of a text block that changed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextChange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marks: Option<Vec<Mark>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<TextStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,
}

impl TextChange {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), ..Default::default() }
    }

    pub fn style(style: TextStyle) -> Self {
        Self { style: Some(style), ..Default::default() }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_marks(mut self, marks: Vec<Mark>) -> Self {
        self.marks = Some(marks);
        self
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge the present fields into `content`.
    pub fn apply_to(&self, content: &TextContent) -> TextContent {
        TextContent {
            text: self.text.clone().unwrap_or_else(|| content.text.clone()),
            marks: self.marks.clone().unwrap_or_else(|| content.marks.clone()),
            style: self.style.unwrap_or(content.style),
            is_checked: self.checked.or(content.is_checked),
            color: self.color.clone().or_else(|| content.color.clone()),
            background_color: self
                .background_color
                .clone()
                .or_else(|| content.background_color.clone()),
            align: self.align.or(content.align),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileChange {
    pub hash: Option<String>,
    pub name: Option<String>,
    pub mime: Option<String>,
    pub size: Option<u64>,
    pub file_type: Option<FileType>,
    pub state: Option<FileState>,
}

impl FileChange {
    pub fn apply_to(&self, file: &FileContent) -> FileContent {
        FileContent {
            hash: self.hash.clone().or_else(|| file.hash.clone()),
            name: self.name.clone().or_else(|| file.name.clone()),
            mime: self.mime.clone().or_else(|| file.mime.clone()),
            size: self.size.or(file.size),
            file_type: self.file_type.unwrap_or(file.file_type),
            state: self.state.unwrap_or(file.state),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookmarkChange {
    pub url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub favicon: Option<String>,
}

impl BookmarkChange {
    pub fn apply_to(&self, bookmark: &BookmarkContent) -> BookmarkContent {
        BookmarkContent {
            url: self.url.clone().or_else(|| bookmark.url.clone()),
            title: self.title.clone().or_else(|| bookmark.title.clone()),
            description: self.description.clone().or_else(|| bookmark.description.clone()),
            image: self.image.clone().or_else(|| bookmark.image.clone()),
            favicon: self.favicon.clone().or_else(|| bookmark.favicon.clone()),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkChange {
    pub target: Option<ObjectId>,
    pub fields: Option<Fields>,
}

impl LinkChange {
    pub fn apply_to(&self, link: &LinkContent) -> LinkContent {
        LinkContent {
            target: self.target.clone().unwrap_or_else(|| link.target.clone()),
            fields: self.fields.clone().unwrap_or_else(|| link.fields.clone()),
        }
    }
}
