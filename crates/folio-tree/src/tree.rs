//! Immutable id → node arena.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::Arc;

use folio_types::{Block, BlockId};

use crate::error::TreeError;

/// Traversals stop after this many nodes. Only reachable through a corrupted
/// (cyclic) tree, since every node is visited at most once.
pub const MAX_TREE_DEPTH: usize = 100_000;

/// Snapshot of one document's blocks.
///
/// Nodes are reference counted: deriving a new tree clones pointers, and only
/// transformed nodes are reallocated.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BlockTree {
    nodes: HashMap<BlockId, Arc<Block>>,
}

impl BlockTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a node list. Later duplicates win.
    pub fn from_blocks(blocks: impl IntoIterator<Item = Block>) -> Self {
        Self {
            nodes: blocks
                .into_iter()
                .map(|block| (block.id.clone(), Arc::new(block)))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: &BlockId) -> Option<&Block> {
        self.nodes.get(id).map(Arc::as_ref)
    }

    /// Ordered child ids; empty for leaves and unknown ids.
    pub fn children_of(&self, id: &BlockId) -> &[BlockId] {
        self.nodes
            .get(id)
            .map(|block| block.children.as_slice())
            .unwrap_or(&[])
    }

    /// All nodes, in no particular order.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.nodes.values().map(Arc::as_ref)
    }

    /// First node matching `predicate`, in depth-first order from `root`.
    pub fn find_from<P>(&self, root: &BlockId, predicate: P) -> Option<&Block>
    where
        P: Fn(&Block) -> bool,
    {
        self.subtree(root).into_iter().find(|block| predicate(block))
    }

    /// Whether any node satisfies `predicate`.
    pub fn any<P>(&self, predicate: P) -> bool
    where
        P: Fn(&Block) -> bool,
    {
        self.nodes.values().any(|block| predicate(block))
    }

    // ── Derivations ─────────────────────────────────────────────────────────

    /// Apply `transform` to every node matching `predicate`.
    ///
    /// A transform must not change the node's id; if it does, the original
    /// id is kept as the map key and the node is logged and left unchanged.
    pub fn replace<P, F>(&self, predicate: P, transform: F) -> BlockTree
    where
        P: Fn(&Block) -> bool,
        F: Fn(&Block) -> Block,
    {
        let nodes = self
            .nodes
            .iter()
            .map(|(id, block)| {
                if !predicate(block) {
                    return (id.clone(), Arc::clone(block));
                }
                let next = transform(block);
                if next.id != *id {
                    tracing::warn!(%id, new_id = %next.id, "transform changed block id, ignoring");
                    return (id.clone(), Arc::clone(block));
                }
                (id.clone(), Arc::new(next))
            })
            .collect();
        BlockTree { nodes }
    }

    /// Transform exactly one node. Unknown ids leave the tree unchanged.
    pub fn update<F>(&self, id: &BlockId, transform: F) -> BlockTree
    where
        F: Fn(&Block) -> Block,
    {
        self.replace(|block| block.id == *id, transform)
    }

    /// Union `blocks` into the tree; a node with an existing id replaces it.
    pub fn append(&self, blocks: impl IntoIterator<Item = Block>) -> BlockTree {
        let mut nodes = self.nodes.clone();
        for block in blocks {
            nodes.insert(block.id.clone(), Arc::new(block));
        }
        BlockTree { nodes }
    }

    /// Delete every node in `ids` and strip those ids from all children lists.
    ///
    /// Both happen in one pass, so the result never holds a reference to a
    /// removed node.
    pub fn remove<'a>(&self, ids: impl IntoIterator<Item = &'a BlockId>) -> BlockTree {
        let doomed: HashSet<&BlockId> = ids.into_iter().collect();
        if doomed.is_empty() {
            return self.clone();
        }
        let nodes = self
            .nodes
            .iter()
            .filter(|(id, _)| !doomed.contains(id))
            .map(|(id, block)| {
                if !block.children.iter().any(|child| doomed.contains(child)) {
                    return (id.clone(), Arc::clone(block));
                }
                let mut next = Block::clone(block);
                next.children.retain(|child| !doomed.contains(child));
                (id.clone(), Arc::new(next))
            })
            .collect();
        BlockTree { nodes }
    }

    /// Replace one node's children list. Duplicate ids are collapsed to their
    /// first occurrence.
    pub fn set_children(&self, parent: &BlockId, children: &[BlockId]) -> BlockTree {
        let mut seen = HashSet::new();
        let unique: Vec<BlockId> = children
            .iter()
            .filter(|child| seen.insert(*child))
            .cloned()
            .collect();
        if unique.len() != children.len() {
            tracing::warn!(%parent, "duplicate ids in children list collapsed");
        }
        self.update(parent, |block| {
            let mut next = block.clone();
            next.children = unique.clone();
            next
        })
    }

    // ── Structural queries ──────────────────────────────────────────────────

    pub fn parent_of(&self, id: &BlockId) -> Option<&BlockId> {
        self.nodes
            .values()
            .find(|block| block.children.contains(id))
            .map(|block| &block.id)
    }

    /// Every node reachable from `root`, depth-first, `root` first.
    ///
    /// Revisited nodes are skipped, so a corrupted cyclic tree still yields a
    /// finite list.
    pub fn subtree(&self, root: &BlockId) -> Vec<&Block> {
        let mut result = Vec::new();
        let mut stack = vec![root];
        let mut visited = HashSet::new();

        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            if visited.len() > MAX_TREE_DEPTH {
                tracing::warn!("subtree traversal hit MAX_TREE_DEPTH ({MAX_TREE_DEPTH}), truncating");
                break;
            }
            if let Some(block) = self.nodes.get(id) {
                result.push(block.as_ref());
                for child in block.children.iter().rev() {
                    stack.push(child);
                }
            }
        }

        result
    }

    /// Whether `id` sits strictly below `ancestor`.
    pub fn is_descendant(&self, ancestor: &BlockId, id: &BlockId) -> bool {
        self.subtree(ancestor)
            .into_iter()
            .skip(1)
            .any(|block| block.id == *id)
    }

    /// Report every violated tree invariant, sorted for stable output.
    pub fn integrity_errors(&self) -> Vec<TreeError> {
        let mut errors = Vec::new();
        let mut parent_counts: BTreeMap<&BlockId, usize> = BTreeMap::new();

        let mut ids: Vec<&BlockId> = self.nodes.keys().collect();
        ids.sort();

        for id in &ids {
            let Some(block) = self.nodes.get(*id) else { continue };
            let mut seen = HashSet::new();
            for child in &block.children {
                if !seen.insert(child) {
                    errors.push(TreeError::DuplicateChild {
                        parent: block.id.clone(),
                        child: child.clone(),
                    });
                    continue;
                }
                if !self.nodes.contains_key(child) {
                    errors.push(TreeError::DanglingChild {
                        parent: block.id.clone(),
                        child: child.clone(),
                    });
                    continue;
                }
                *parent_counts.entry(child).or_default() += 1;
            }
        }

        for (child, count) in &parent_counts {
            if *count > 1 {
                errors.push(TreeError::MultipleParents {
                    child: (*child).clone(),
                    count: *count,
                });
            }
        }

        // Kahn's algorithm over child edges: whatever never reaches in-degree
        // zero lies on or below a cycle.
        let mut indegree: HashMap<&BlockId, usize> =
            ids.iter().map(|id| (*id, parent_counts.get(id).copied().unwrap_or(0))).collect();
        let mut queue: VecDeque<&BlockId> = ids
            .iter()
            .copied()
            .filter(|id| indegree.get(id).copied() == Some(0))
            .collect();
        while let Some(id) = queue.pop_front() {
            let mut seen = HashSet::new();
            for child in self.children_of(id) {
                if !seen.insert(child) {
                    continue;
                }
                if let Some(degree) = indegree.get_mut(child) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(child);
                    }
                }
            }
        }
        for id in &ids {
            if indegree.get(id).copied().unwrap_or(0) > 0 {
                errors.push(TreeError::Cycle((*id).clone()));
            }
        }

        errors
    }
}

impl FromIterator<Block> for BlockTree {
    fn from_iter<I: IntoIterator<Item = Block>>(iter: I) -> Self {
        Self::from_blocks(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_types::TextStyle;

    fn id(s: &str) -> BlockId {
        BlockId::new(s)
    }

    fn sample() -> BlockTree {
        BlockTree::from_blocks([
            Block::text("root", "", TextStyle::Paragraph).with_children(["a", "b", "c"]),
            Block::text("a", "A", TextStyle::Paragraph).with_children(["a1"]),
            Block::text("a1", "A1", TextStyle::Paragraph),
            Block::text("b", "B", TextStyle::Paragraph),
            Block::text("c", "C", TextStyle::Paragraph),
        ])
    }

    #[test]
    fn test_children_of_preserves_order() {
        let tree = sample();
        assert_eq!(tree.children_of(&id("root")), &[id("a"), id("b"), id("c")]);
        assert!(tree.children_of(&id("missing")).is_empty());
    }

    #[test]
    fn test_remove_strips_parent_references() {
        let tree = sample().remove([&id("b")]);
        assert!(tree.node(&id("b")).is_none());
        assert_eq!(tree.children_of(&id("root")), &[id("a"), id("c")]);
        assert!(tree.integrity_errors().is_empty());
    }

    #[test]
    fn test_remove_leaves_original_untouched() {
        let original = sample();
        let _ = original.remove([&id("a")]);
        assert!(original.contains(&id("a")));
        assert_eq!(original.children_of(&id("root")).len(), 3);
    }

    #[test]
    fn test_replace_only_touches_matching_nodes() {
        let tree = sample().replace(
            |block| block.id == id("c"),
            |block| {
                let mut next = block.clone();
                next.children = vec![id("b")];
                next
            },
        );
        assert_eq!(tree.children_of(&id("c")), &[id("b")]);
        assert_eq!(tree.node(&id("a")), sample().node(&id("a")));
    }

    #[test]
    fn test_replace_rejects_id_change() {
        let tree = sample().update(&id("b"), |block| {
            let mut next = block.clone();
            next.id = id("zzz");
            next
        });
        assert_eq!(tree, sample());
    }

    #[test]
    fn test_append_overwrites_same_id() {
        let tree = sample().append([Block::text("b", "new", TextStyle::H1)]);
        assert_eq!(tree.node(&id("b")).and_then(|b| b.as_text()).map(|t| t.text.as_str()), Some("new"));
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_set_children_collapses_duplicates() {
        let tree = sample().set_children(&id("root"), &[id("c"), id("a"), id("c")]);
        assert_eq!(tree.children_of(&id("root")), &[id("c"), id("a")]);
    }

    #[test]
    fn test_parent_and_descendant_queries() {
        let tree = sample();
        assert_eq!(tree.parent_of(&id("a1")), Some(&id("a")));
        assert_eq!(tree.parent_of(&id("root")), None);
        assert!(tree.is_descendant(&id("root"), &id("a1")));
        assert!(!tree.is_descendant(&id("a"), &id("a")));
        assert!(!tree.is_descendant(&id("b"), &id("a1")));
    }

    #[test]
    fn test_subtree_is_depth_first() {
        let tree = sample();
        let order: Vec<&str> = tree.subtree(&id("root")).iter().map(|b| b.id.as_str()).collect();
        assert_eq!(order, vec!["root", "a", "a1", "b", "c"]);
    }

    #[test]
    fn test_integrity_errors_reports_violations() {
        let tree = BlockTree::from_blocks([
            Block::text("root", "", TextStyle::Paragraph).with_children(["x", "ghost", "x"]),
            Block::text("other", "", TextStyle::Paragraph).with_children(["x"]),
            Block::text("x", "", TextStyle::Paragraph),
        ]);
        let errors = tree.integrity_errors();
        assert!(errors.contains(&TreeError::DanglingChild { parent: id("root"), child: id("ghost") }));
        assert!(errors.contains(&TreeError::DuplicateChild { parent: id("root"), child: id("x") }));
        assert!(errors.contains(&TreeError::MultipleParents { child: id("x"), count: 2 }));
    }

    #[test]
    fn test_integrity_errors_detects_cycle() {
        let tree = BlockTree::from_blocks([
            Block::text("a", "", TextStyle::Paragraph).with_children(["b"]),
            Block::text("b", "", TextStyle::Paragraph).with_children(["a"]),
        ]);
        let errors = tree.integrity_errors();
        assert!(errors.contains(&TreeError::Cycle(id("a"))));
        assert_eq!(tree.subtree(&id("a")).len(), 2);
    }
}
