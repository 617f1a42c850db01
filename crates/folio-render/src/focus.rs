//! Focus and cursor state.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use folio_types::BlockId;

/// Requested caret placement inside the focused block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "at", content = "range", rename_all = "snake_case")]
pub enum Cursor {
    Start,
    End,
    Range(Range<usize>),
}

impl Cursor {
    /// Caret offset for a text of `len` chars.
    pub fn position(&self, len: usize) -> usize {
        match self {
            Cursor::Start => 0,
            Cursor::End => len,
            Cursor::Range(range) => range.start,
        }
    }
}

/// Currently focused block, if any.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Focus {
    pub id: Option<BlockId>,
    pub cursor: Option<Cursor>,
}

impl Focus {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn on(id: impl Into<BlockId>, cursor: Option<Cursor>) -> Self {
        Self { id: Some(id.into()), cursor }
    }

    pub fn is(&self, id: &BlockId) -> bool {
        self.id.as_ref() == Some(id)
    }

    pub fn is_none(&self) -> bool {
        self.id.is_none()
    }

    /// Caret offset for block `id` holding `len` chars; `None` unless focused.
    pub fn cursor_for(&self, id: &BlockId, len: usize) -> Option<usize> {
        if !self.is(id) {
            return None;
        }
        self.cursor.as_ref().map(|cursor| cursor.position(len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_mapping() {
        let id = BlockId::new("p");
        assert_eq!(Focus::on("p", Some(Cursor::Start)).cursor_for(&id, 5), Some(0));
        assert_eq!(Focus::on("p", Some(Cursor::End)).cursor_for(&id, 5), Some(5));
        assert_eq!(Focus::on("p", Some(Cursor::Range(2..4))).cursor_for(&id, 5), Some(2));
        assert_eq!(Focus::on("p", None).cursor_for(&id, 5), None);
        assert_eq!(Focus::on("q", Some(Cursor::End)).cursor_for(&id, 5), None);
    }
}
