//! Pure `(tree, event) → tree` transition function.

use tracing::{debug, warn};

use folio_types::{Block, BlockId, Content};

use crate::event::{DocEvent, TextChange};
use crate::tree::BlockTree;

/// Apply one event, returning the next snapshot.
///
/// Never fails: events that cannot be applied are logged and return an
/// unchanged clone of `tree`.
pub fn reduce(tree: &BlockTree, event: &DocEvent) -> BlockTree {
    match event {
        DocEvent::ShowObject { blocks, .. } | DocEvent::ReplaceTree { blocks } => {
            BlockTree::from_blocks(blocks.iter().cloned())
        }
        DocEvent::AppendNodes { blocks } => tree.append(blocks.iter().cloned()),
        DocEvent::SetChildren { parent, children } => {
            if !tree.contains(parent) {
                warn!(%parent, "set_children for unknown block");
                return tree.clone();
            }
            tree.set_children(parent, children)
        }
        DocEvent::DeleteNodes { ids } => tree.remove(ids),
        DocEvent::GranularTextChange { id, change } => granular_text(tree, id, change),
        DocEvent::UpdateFile { id, change } => update_content(tree, id, "file", |content| {
            match content {
                Content::File(file) => Some(Content::File(change.apply_to(file))),
                _ => None,
            }
        }),
        DocEvent::UpdateBookmark { id, change } => update_content(tree, id, "bookmark", |content| {
            match content {
                Content::Bookmark(bookmark) => Some(Content::Bookmark(change.apply_to(bookmark))),
                _ => None,
            }
        }),
        DocEvent::UpdateLink { id, change } => update_content(tree, id, "link", |content| {
            match content {
                Content::Link(link) => Some(Content::Link(change.apply_to(link))),
                _ => None,
            }
        }),
        DocEvent::UpdateDivider { id, style } => update_content(tree, id, "divider", |content| {
            match content {
                Content::Divider(divider) => {
                    let mut next = divider.clone();
                    next.style = *style;
                    Some(Content::Divider(next))
                }
                _ => None,
            }
        }),
        DocEvent::SetRelationKey { id, key } => update_content(tree, id, "relation", |content| {
            match content {
                Content::RelationBlock(relation) => {
                    let mut next = relation.clone();
                    next.key = Some(key.clone());
                    Some(Content::RelationBlock(next))
                }
                _ => None,
            }
        }),
        DocEvent::UpdateFields { id, fields } => {
            if !tree.contains(id) {
                warn!(%id, "update_fields for unknown block");
                return tree.clone();
            }
            tree.update(id, |block| block.clone().with_fields(fields.clone()))
        }
        DocEvent::UpdateDetails { .. }
        | DocEvent::UnsetDetails { .. }
        | DocEvent::SetRelations { .. }
        | DocEvent::RemoveRelations { .. } => tree.clone(),
        DocEvent::Unknown => {
            debug!("ignoring unknown event kind");
            tree.clone()
        }
    }
}

/// Fold a batch of events in order.
pub fn reduce_all<'a>(tree: &BlockTree, events: impl IntoIterator<Item = &'a DocEvent>) -> BlockTree {
    events
        .into_iter()
        .fold(tree.clone(), |acc, event| reduce(&acc, event))
}

fn granular_text(tree: &BlockTree, id: &BlockId, change: &TextChange) -> BlockTree {
    update_content(tree, id, "text", |content| match content {
        Content::Text(text) => Some(Content::Text(change.apply_to(text))),
        // Relation blocks only take the background color from a text change.
        Content::RelationBlock(relation) => {
            let mut next = relation.clone();
            if let Some(background) = &change.background_color {
                next.background = Some(background.clone());
            }
            Some(Content::RelationBlock(next))
        }
        _ => None,
    })
}

/// Replace the content of node `id` with `merge(content)`.
///
/// `merge` returns `None` when the node holds the wrong variant; that case,
/// like a missing node, is logged and leaves the tree unchanged.
fn update_content<F>(tree: &BlockTree, id: &BlockId, expected: &str, merge: F) -> BlockTree
where
    F: Fn(&Content) -> Option<Content>,
{
    let Some(block) = tree.node(id) else {
        warn!(%id, expected, "change for unknown block");
        return tree.clone();
    };
    let Some(content) = merge(&block.content) else {
        warn!(%id, expected, found = block.content.kind_name(), "change for wrong content variant");
        return tree.clone();
    };
    tree.update(id, |block| Block { content: content.clone(), ..block.clone() })
}
