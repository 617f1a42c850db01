use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use folio_types::BlockId;

/// Ids of toggle blocks whose children are currently shown. Default collapsed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToggleSet(BTreeSet<BlockId>);

impl ToggleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, id: &BlockId) -> bool {
        self.0.contains(id)
    }

    /// Flip `id`; returns whether it is now expanded.
    pub fn toggle(&mut self, id: &BlockId) -> bool {
        if self.0.remove(id) {
            false
        } else {
            self.0.insert(id.clone());
            true
        }
    }

    pub fn expand(&mut self, id: BlockId) {
        self.0.insert(id);
    }

    pub fn collapse(&mut self, id: &BlockId) {
        self.0.remove(id);
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockId> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
