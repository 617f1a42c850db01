//! Shared block and object types for folio.
//!
//! This crate is the leaf of the workspace: typed ids, the block node and its
//! content variants, inline marks, per-object details and relation
//! definitions. It has **no internal folio dependencies**.
//!
//! # Model Overview
//!
//! ```text
//! Document (root BlockId == ObjectId)
//!     └── Block { id, children, fields, content }
//!             └── Content: Text | Link | File | Bookmark | Divider
//!                          | Layout | RelationBlock | FeaturedRelations | Smart
//!
//! ObjectDetails (keyed by ObjectId)   ← name, icon, cover, layout, archived
//! Relation      (keyed by RelationKey) ← format, name, options
//! ```
//!
//! |-------------------|----------------------------------------------|
//! | Type              | Purpose                                      |
//! |-------------------|----------------------------------------------|
//! | [`BlockId`]       | Stable block address inside a document       |
//! | [`ObjectId`]      | Object address (documents, link targets)     |
//! | [`Block`]         | One tree node                                |
//! | [`Content`]       | Closed set of content variants               |
//! | [`TextContent`]   | Text payload with style and marks            |
//! | [`ObjectDetails`] | Field bag describing one object              |
//! | [`Relation`]      | Typed relation definition                    |
//! |-------------------|----------------------------------------------|

pub mod block;
pub mod details;
pub mod ids;
pub mod marks;
pub mod relation;
pub mod text;

pub use block::{
    Block, BookmarkContent, Content, DividerContent, DividerStyle, Fields, FileContent,
    FileState, FileType, LayoutContent, LayoutKind, LinkContent, RelationBlockContent,
    SmartContent, SmartKind,
};
pub use details::{CoverType, ObjectDetails, ObjectLayout, keys};
pub use ids::{BlockId, ObjectId, RelationKey};
pub use marks::{Mark, MarkKind, MarkType};
pub use relation::{Relation, RelationFormat, RelationOption};
pub use text::{Align, TextContent, TextStyle};
