//! Editor interaction modes.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use folio_types::BlockId;

/// What the user is currently doing with the document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "targets", rename_all = "snake_case")]
pub enum EditorMode {
    /// Typing into blocks.
    #[default]
    Edit,
    /// Read-only document.
    Locked,
    /// Style toolbar open for one block.
    StyleSingle(BlockId),
    /// Style toolbar open for a bulk selection.
    StyleMulti(BTreeSet<BlockId>),
    /// Bulk selection with checkmarks.
    Select,
    /// Picking a drop target for the selected blocks.
    ScrollAndMove,
}

impl EditorMode {
    pub fn is_edit(&self) -> bool {
        matches!(self, EditorMode::Edit)
    }

    pub fn name(&self) -> &'static str {
        match self {
            EditorMode::Edit => "edit",
            EditorMode::Locked => "locked",
            EditorMode::StyleSingle(_) => "style_single",
            EditorMode::StyleMulti(_) => "style_multi",
            EditorMode::Select => "select",
            EditorMode::ScrollAndMove => "scroll_and_move",
        }
    }

    /// Whether `id` is highlighted as selected in this mode.
    ///
    /// `multi_select` is the bulk selection owned by the editor; it only
    /// counts while selecting or moving.
    pub fn is_selected(&self, id: &BlockId, multi_select: &BTreeSet<BlockId>) -> bool {
        match self {
            EditorMode::StyleSingle(target) => target == id,
            EditorMode::StyleMulti(targets) => targets.contains(id),
            EditorMode::Select | EditorMode::ScrollAndMove => multi_select.contains(id),
            EditorMode::Edit | EditorMode::Locked => false,
        }
    }

    /// Presentation mode for items rendered under this editor mode.
    pub fn item_mode(&self) -> ItemMode {
        if self.is_edit() { ItemMode::Edit } else { ItemMode::Read }
    }
}

/// Whether an item accepts text input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemMode {
    Edit,
    Read,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_by_mode() {
        let a = BlockId::new("a");
        let b = BlockId::new("b");
        let picked: BTreeSet<BlockId> = [a.clone()].into_iter().collect();

        assert!(EditorMode::StyleSingle(a.clone()).is_selected(&a, &BTreeSet::new()));
        assert!(!EditorMode::StyleSingle(a.clone()).is_selected(&b, &picked));
        assert!(EditorMode::StyleMulti(picked.clone()).is_selected(&a, &BTreeSet::new()));
        assert!(EditorMode::Select.is_selected(&a, &picked));
        assert!(EditorMode::ScrollAndMove.is_selected(&a, &picked));
        assert!(!EditorMode::Edit.is_selected(&a, &picked));
    }

    #[test]
    fn test_item_mode() {
        assert_eq!(EditorMode::Edit.item_mode(), ItemMode::Edit);
        assert_eq!(EditorMode::Locked.item_mode(), ItemMode::Read);
        assert_eq!(EditorMode::Select.item_mode(), ItemMode::Read);
    }
}
