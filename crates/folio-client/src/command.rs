//! Outgoing commands for the sync layer.
//!
//! Every command is keyed by the document `context` (the root object id) and,
//! where it applies, the target block. The editor never waits for a reply:
//! results come back later as [`DocEvent`](folio_tree::DocEvent)s.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use folio_types::{Align, Block, BlockId, Mark, ObjectId, TextStyle};

use crate::error::SinkError;

/// Where a new or moved block lands relative to its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    /// Sibling directly before the target.
    Top,
    /// Sibling directly after the target.
    Bottom,
    /// Last child of the target.
    Inner,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    UpdateText {
        context: ObjectId,
        target: BlockId,
        text: String,
        marks: Vec<Mark>,
    },
    UpdateTitle {
        context: ObjectId,
        title: String,
    },
    /// `block` carries the id assigned on this side.
    Create {
        context: ObjectId,
        target: BlockId,
        position: Position,
        block: Block,
    },
    Duplicate {
        context: ObjectId,
        target: BlockId,
    },
    Unlink {
        context: ObjectId,
        targets: Vec<BlockId>,
    },
    /// Append `target` to `previous`. `previous_length` is the char length of
    /// `previous` before the merge, where the caret goes afterwards.
    Merge {
        context: ObjectId,
        previous: BlockId,
        target: BlockId,
        previous_length: usize,
    },
    /// Cut `target` at `index`; the tail moves into `new_block`.
    Split {
        context: ObjectId,
        target: BlockId,
        index: usize,
        new_block: BlockId,
        style: TextStyle,
    },
    Move {
        context: ObjectId,
        target_context: ObjectId,
        target: BlockId,
        blocks: Vec<BlockId>,
        position: Position,
    },
    UpdateStyle {
        context: ObjectId,
        targets: Vec<BlockId>,
        style: TextStyle,
    },
    UpdateColor {
        context: ObjectId,
        targets: Vec<BlockId>,
        color: String,
    },
    UpdateBackgroundColor {
        context: ObjectId,
        targets: Vec<BlockId>,
        color: String,
    },
    UpdateAlignment {
        context: ObjectId,
        targets: Vec<BlockId>,
        align: Align,
    },
    UpdateCheckbox {
        context: ObjectId,
        target: BlockId,
        checked: bool,
    },
    Undo {
        context: ObjectId,
    },
    Redo {
        context: ObjectId,
    },
    Copy {
        context: ObjectId,
        blocks: Vec<Block>,
        range: Option<Range<usize>>,
    },
    Paste {
        context: ObjectId,
        focus: BlockId,
        range: Range<usize>,
        selected: Vec<BlockId>,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::UpdateText { .. } => "update_text",
            Command::UpdateTitle { .. } => "update_title",
            Command::Create { .. } => "create",
            Command::Duplicate { .. } => "duplicate",
            Command::Unlink { .. } => "unlink",
            Command::Merge { .. } => "merge",
            Command::Split { .. } => "split",
            Command::Move { .. } => "move",
            Command::UpdateStyle { .. } => "update_style",
            Command::UpdateColor { .. } => "update_color",
            Command::UpdateBackgroundColor { .. } => "update_background_color",
            Command::UpdateAlignment { .. } => "update_alignment",
            Command::UpdateCheckbox { .. } => "update_checkbox",
            Command::Undo { .. } => "undo",
            Command::Redo { .. } => "redo",
            Command::Copy { .. } => "copy",
            Command::Paste { .. } => "paste",
        }
    }
}

// ── Sink ────────────────────────────────────────────────────────────────────

/// Receiver of outgoing commands (the sync layer's dispatch endpoint).
pub trait CommandSink: Send {
    fn dispatch(&self, command: Command) -> Result<(), SinkError>;
}

impl CommandSink for mpsc::UnboundedSender<Command> {
    fn dispatch(&self, command: Command) -> Result<(), SinkError> {
        self.send(command).map_err(|_| SinkError::Closed)
    }
}

/// Sink that drops everything. Used when replaying recorded sessions.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl CommandSink for NullSink {
    fn dispatch(&self, _command: Command) -> Result<(), SinkError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_command_json_shape() {
        let command = Command::Unlink {
            context: ObjectId::new("page"),
            targets: vec![BlockId::new("a")],
        };
        assert_eq!(
            serde_json::to_value(&command).unwrap(),
            json!({"command": "unlink", "context": "page", "targets": ["a"]})
        );
        assert_eq!(command.name(), "unlink");
    }

    #[test]
    fn test_channel_sink_reports_closed() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let err = tx.dispatch(Command::Undo { context: ObjectId::new("page") }).unwrap_err();
        assert_eq!(err, SinkError::Closed);
    }
}
