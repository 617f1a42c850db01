//! Property-based ordering tests for the renderer.
//!
//! For any well-formed tree the rendered body lists blocks in depth-first
//! document order. Layouts are flattened in place and collapsed toggles hide
//! their subtree.

use std::collections::BTreeSet;

use folio_render::{
    DetailsSnapshot, EditorMode, Focus, RelationsSnapshot, RenderContext, ToggleSet, UrlBuilder,
    render_document,
};
use folio_tree::BlockTree;
use folio_types::{Block, BlockId, Content, LayoutContent, SmartContent, TextStyle};
use proptest::prelude::*;

#[derive(Clone, Copy, Debug)]
enum Shape {
    Paragraph,
    Layout,
    Toggle,
}

/// A random tree rooted at `b0`, plus the toggles that are expanded.
#[derive(Debug)]
struct Doc {
    tree: BlockTree,
    toggles: ToggleSet,
}

// ── Strategies ──────────────────────────────────────────────────────────

fn shape_strategy() -> impl Strategy<Value = Shape> {
    prop_oneof![
        3 => Just(Shape::Paragraph),
        1 => Just(Shape::Layout),
        1 => Just(Shape::Toggle),
    ]
}

/// Node `i` hangs under some node `< i`; node 0 is the root.
fn doc_strategy() -> impl Strategy<Value = Doc> {
    (1usize..40).prop_flat_map(|n| {
        let parents = proptest::collection::vec(any::<prop::sample::Index>(), n);
        let shapes = proptest::collection::vec(shape_strategy(), n);
        let expanded = proptest::collection::vec(any::<bool>(), n);
        (parents, shapes, expanded).prop_map(move |(parents, shapes, expanded)| {
            let mut children: Vec<Vec<String>> = vec![Vec::new(); n + 1];
            for (i, pick) in parents.iter().enumerate() {
                let node = i + 1;
                children[pick.index(node)].push(format!("b{node}"));
            }

            let root = Block::new("b0", Content::Smart(SmartContent::default()))
                .with_children(children[0].clone());
            let mut blocks = vec![root];
            let mut toggles = ToggleSet::new();
            for i in 1..=n {
                let id = format!("b{i}");
                let block = match shapes[i - 1] {
                    Shape::Paragraph => Block::text(id.as_str(), "text", TextStyle::Paragraph),
                    Shape::Layout => {
                        Block::new(id.as_str(), Content::Layout(LayoutContent::default()))
                    }
                    Shape::Toggle => {
                        if expanded[i - 1] {
                            toggles.expand(BlockId::new(id.as_str()));
                        }
                        Block::text(id.as_str(), "text", TextStyle::Toggle)
                    }
                };
                blocks.push(block.with_children(children[i].clone()));
            }
            Doc { tree: BlockTree::from_blocks(blocks), toggles }
        })
    })
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Depth-first visit order the renderer must reproduce.
fn expected_order(doc: &Doc, anchor: &BlockId, out: &mut Vec<String>) {
    for child in doc.tree.children_of(anchor) {
        let Some(block) = doc.tree.node(child) else { continue };
        match &block.content {
            Content::Layout(_) => expected_order(doc, child, out),
            Content::Text(text) if text.style == TextStyle::Toggle => {
                out.push(child.as_str().to_owned());
                if doc.toggles.is_expanded(child) {
                    expected_order(doc, child, out);
                }
            }
            _ => {
                out.push(child.as_str().to_owned());
                expected_order(doc, child, out);
            }
        }
    }
}

/// Rendered ids with the document header dropped.
fn rendered_order(doc: &Doc, root: &BlockId) -> Vec<String> {
    let mode = EditorMode::Edit;
    let focus = Focus::none();
    let multi_select = BTreeSet::new();
    let details = DetailsSnapshot::new();
    let relations = RelationsSnapshot::new();
    let urls = UrlBuilder::new("http://localhost");
    let ctx = RenderContext {
        tree: &doc.tree,
        root,
        mode: &mode,
        focus: &focus,
        toggles: &doc.toggles,
        multi_select: &multi_select,
        details: &details,
        relations: &relations,
        urls: &urls,
        featured_relations_enabled: false,
    };
    render_document(&ctx)
        .iter()
        .map(|item| item.id())
        .filter(|id| *id != root)
        .map(|id| id.as_str().to_owned())
        .collect()
}

// ── Properties ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn render_preserves_document_order(doc in doc_strategy()) {
        let root = BlockId::new("b0");
        let mut expected = Vec::new();
        expected_order(&doc, &root, &mut expected);

        prop_assert_eq!(rendered_order(&doc, &root), expected);
    }

    #[test]
    fn render_emits_each_block_at_most_once(doc in doc_strategy()) {
        let root = BlockId::new("b0");
        let rendered = rendered_order(&doc, &root);
        let unique: BTreeSet<&String> = rendered.iter().collect();

        prop_assert_eq!(unique.len(), rendered.len());
    }
}
