//! User gestures the editor understands.
//!
//! One variant per gesture. Intents are plain data so they can be queued on
//! the actor channel or read back from a recorded session.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use folio_render::Cursor;
use folio_types::{
    Align, Block, BlockId, BookmarkContent, Content, DividerContent, FileContent, FileType,
    Mark, MarkKind, TextContent, TextStyle,
};

use crate::command::Position;

/// Shape of a block created from a toolbar or keyboard gesture.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Prototype {
    Text { style: TextStyle },
    Divider,
    Bookmark,
    File { file_type: FileType },
}

impl Prototype {
    pub fn paragraph() -> Self {
        Prototype::Text { style: TextStyle::Paragraph }
    }

    /// An empty block of this shape with the given id.
    pub fn build(&self, id: BlockId) -> Block {
        let content = match self {
            Prototype::Text { style } => {
                let mut text = TextContent::new("", *style);
                if *style == TextStyle::Checkbox {
                    text.is_checked = Some(false);
                }
                Content::Text(text)
            }
            Prototype::Divider => Content::Divider(DividerContent::default()),
            Prototype::Bookmark => Content::Bookmark(BookmarkContent::default()),
            Prototype::File { file_type } => Content::File(FileContent {
                file_type: *file_type,
                ..Default::default()
            }),
        };
        Block::new(id, content)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Prototype::Text { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    // ── Focus and selection ─────────────────────────────────────────────
    Focus {
        id: BlockId,
        #[serde(default)]
        cursor: Option<Cursor>,
    },
    ClearFocus,
    SelectionChanged { id: BlockId, range: Range<usize> },

    // ── Text ────────────────────────────────────────────────────────────
    TextChanged {
        id: BlockId,
        text: String,
        #[serde(default)]
        marks: Vec<Mark>,
    },
    TitleChanged { text: String },
    /// Enter with the caret inside the text.
    SplitLine { id: BlockId, index: usize },
    /// Enter with the caret at the end of the text.
    EnterAtEnd { id: BlockId },
    EnterAtEndOfTitle,
    /// Backspace with the caret at position 0.
    BackspaceAtStart { id: BlockId },
    /// Apply a mark over the current text selection.
    ApplyMarkup { kind: MarkKind },
    AddLink { id: BlockId, url: String, range: Range<usize> },
    RemoveLink { id: BlockId, range: Range<usize> },

    // ── Blocks ──────────────────────────────────────────────────────────
    CreateBlock {
        target: BlockId,
        position: Position,
        prototype: Prototype,
    },
    /// Create a block after the focused one.
    AddBlock { prototype: Prototype },
    Duplicate { id: BlockId },
    CheckboxClicked { id: BlockId },
    ToggleClicked { id: BlockId },
    TogglePlaceholderClicked { id: BlockId },
    UpdateStyle { targets: Vec<BlockId>, style: TextStyle },
    UpdateColor { targets: Vec<BlockId>, color: String },
    UpdateBackground { targets: Vec<BlockId>, color: String },
    UpdateAlignment { targets: Vec<BlockId>, align: Align },
    OutsideClick,

    // ── Modes ───────────────────────────────────────────────────────────
    SetLocked { locked: bool },
    EnterSelectMode,
    ExitSelectMode,
    ToggleSelect { id: BlockId },
    SelectAll,
    DeleteSelected,
    CopySelected,
    EnterScrollAndMove,
    ExitScrollAndMove,
    /// Drop the selection onto `target`; `ratio` is the vertical drop offset
    /// within the target (0 = top edge, 1 = bottom edge).
    ApplyScrollAndMove { target: BlockId, ratio: f32 },
    EnterStyling { id: BlockId },
    EnterMultiStyling,
    ExitStyling,

    // ── Document ────────────────────────────────────────────────────────
    Undo,
    Redo,
    Copy { range: Range<usize> },
    Paste { range: Range<usize> },
    Close,
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::Focus { .. } => "focus",
            Intent::ClearFocus => "clear_focus",
            Intent::SelectionChanged { .. } => "selection_changed",
            Intent::TextChanged { .. } => "text_changed",
            Intent::TitleChanged { .. } => "title_changed",
            Intent::SplitLine { .. } => "split_line",
            Intent::EnterAtEnd { .. } => "enter_at_end",
            Intent::EnterAtEndOfTitle => "enter_at_end_of_title",
            Intent::BackspaceAtStart { .. } => "backspace_at_start",
            Intent::ApplyMarkup { .. } => "apply_markup",
            Intent::AddLink { .. } => "add_link",
            Intent::RemoveLink { .. } => "remove_link",
            Intent::CreateBlock { .. } => "create_block",
            Intent::AddBlock { .. } => "add_block",
            Intent::Duplicate { .. } => "duplicate",
            Intent::CheckboxClicked { .. } => "checkbox_clicked",
            Intent::ToggleClicked { .. } => "toggle_clicked",
            Intent::TogglePlaceholderClicked { .. } => "toggle_placeholder_clicked",
            Intent::UpdateStyle { .. } => "update_style",
            Intent::UpdateColor { .. } => "update_color",
            Intent::UpdateBackground { .. } => "update_background",
            Intent::UpdateAlignment { .. } => "update_alignment",
            Intent::OutsideClick => "outside_click",
            Intent::SetLocked { .. } => "set_locked",
            Intent::EnterSelectMode => "enter_select_mode",
            Intent::ExitSelectMode => "exit_select_mode",
            Intent::ToggleSelect { .. } => "toggle_select",
            Intent::SelectAll => "select_all",
            Intent::DeleteSelected => "delete_selected",
            Intent::CopySelected => "copy_selected",
            Intent::EnterScrollAndMove => "enter_scroll_and_move",
            Intent::ExitScrollAndMove => "exit_scroll_and_move",
            Intent::ApplyScrollAndMove { .. } => "apply_scroll_and_move",
            Intent::EnterStyling { .. } => "enter_styling",
            Intent::EnterMultiStyling => "enter_multi_styling",
            Intent::ExitStyling => "exit_styling",
            Intent::Undo => "undo",
            Intent::Redo => "redo",
            Intent::Copy { .. } => "copy",
            Intent::Paste { .. } => "paste",
            Intent::Close => "close",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_from_json() {
        let intent: Intent = serde_json::from_str(
            r#"{"intent": "text_changed", "id": "p1", "text": "hello"}"#,
        )
        .unwrap();
        assert_eq!(
            intent,
            Intent::TextChanged { id: BlockId::new("p1"), text: "hello".into(), marks: vec![] }
        );
        assert_eq!(intent.name(), "text_changed");
    }

    #[test]
    fn test_checkbox_prototype_starts_unchecked() {
        let block = Prototype::Text { style: TextStyle::Checkbox }.build(BlockId::new("c"));
        let text = block.as_text().unwrap();
        assert_eq!(text.is_checked, Some(false));
        assert!(text.is_empty());
    }

    #[test]
    fn test_file_prototype_keeps_type() {
        let block = Prototype::File { file_type: FileType::Image }.build(BlockId::new("f"));
        let Content::File(file) = &block.content else {
            panic!("expected file content");
        };
        assert_eq!(file.file_type, FileType::Image);
        assert_eq!(file.state, Default::default());
    }
}
