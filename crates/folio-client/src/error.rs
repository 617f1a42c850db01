//! Error types for the editor orchestrator.

use thiserror::Error;

use folio_types::BlockId;

/// A user action the editor refuses to carry out.
///
/// The tree is left untouched and the message is meant to be shown to the
/// user as-is (the actor forwards it on the toast channel).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyViolation {
    #[error("A block cannot be moved inside itself.")]
    DropInsideItself,

    #[error("Cannot move parent into child. Please, check selected blocks.")]
    MoveParentIntoChild,

    #[error("This block does not support nesting.")]
    CannotBeParent,

    #[error("Changing style for title currently not supported")]
    TitleStyle,
}

/// Errors returned by [`Editor`](crate::Editor) intents.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// The document was closed; nothing further is accepted.
    #[error("editor is closed")]
    Closed,

    #[error(transparent)]
    Policy(#[from] PolicyViolation),

    #[error("block not found: {0}")]
    UnknownBlock(BlockId),

    /// Intent needs a text block.
    #[error("block {0} is not a text block")]
    NotText(BlockId),

    /// Intent works on the focused block and nothing is focused.
    #[error("no block is focused")]
    NoFocus,

    /// Intent is not available in the current mode.
    #[error("not available in {0} mode")]
    WrongMode(&'static str),
}

/// Failure handing a command to the sync layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The receiving side is gone.
    #[error("command sink closed")]
    Closed,

    #[error("command rejected: {0}")]
    Rejected(String),
}
