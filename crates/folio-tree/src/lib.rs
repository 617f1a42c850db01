//! Block tree arena and event reducer for folio.
//!
//! The tree is a flat `BlockId → Block` map; nodes reference their children
//! by id. Every operation returns a new snapshot and shares untouched nodes
//! with the old one, so holding on to a previous tree is cheap.
//!
//! ```text
//!   DocEvent ──► reduce(&tree, &event) ──► BlockTree (new snapshot)
//! ```
//!
//! The reducer never fails. Events it cannot apply (unknown kinds, wrong
//! content variant, missing target) are logged and leave the tree unchanged.

mod error;
mod event;
mod reducer;
mod tree;

pub use error::TreeError;
pub use event::{BookmarkChange, DocEvent, FileChange, LinkChange, TextChange};
pub use reducer::{reduce, reduce_all};
pub use tree::{BlockTree, MAX_TREE_DEPTH};
