//! Structural problems detected in a block tree.

use thiserror::Error;

use folio_types::BlockId;

/// A violated tree invariant.
///
/// Reported by [`BlockTree::integrity_errors`](crate::BlockTree::integrity_errors);
/// the reducer itself never returns these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// A child id with no node behind it.
    #[error("block {parent} references missing child {child}")]
    DanglingChild { parent: BlockId, child: BlockId },

    /// A node listed under more than one parent.
    #[error("block {child} has {count} parents")]
    MultipleParents { child: BlockId, count: usize },

    /// The same id listed twice in one children list.
    #[error("block {parent} lists child {child} more than once")]
    DuplicateChild { parent: BlockId, child: BlockId },

    /// Traversal revisited a node; the structure is not a tree.
    #[error("cycle through block {0}")]
    Cycle(BlockId),
}
