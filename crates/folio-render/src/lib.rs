//! View projection for folio documents.
//!
//! Turns a [`BlockTree`](folio_tree::BlockTree) plus ephemeral UI state into
//! the flat, ordered list of [`ViewItem`]s a presentation layer draws.
//!
//! | Input            | Type                  | Effect on output                       |
//! |------------------|-----------------------|----------------------------------------|
//! | tree + root      | `BlockTree`, `BlockId`| order and shape of items               |
//! | mode             | [`EditorMode`]        | edit/read item mode, selection marks   |
//! | focus            | [`Focus`]             | `is_focused`, caret offset             |
//! | toggles          | [`ToggleSet`]         | whether toggle children are spliced in |
//! | details          | [`DetailsSnapshot`]   | titles, covers, links, mentions        |
//! | relations        | [`RelationsSnapshot`] | relation blocks, featured strip        |

mod focus;
mod mode;
mod relations;
mod renderer;
mod toggles;
mod urls;
pub mod view;

pub use focus::{Cursor, Focus};
pub use mode::{EditorMode, ItemMode};
pub use relations::{DetailsSnapshot, RelationsSnapshot, object_ref, relation_view};
pub use renderer::{MAX_RENDER_DEPTH, RenderContext, render, render_document};
pub use toggles::ToggleSet;
pub use urls::UrlBuilder;
pub use view::{NOTE_TITLE_ID, ViewItem};
