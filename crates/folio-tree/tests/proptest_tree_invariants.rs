//! Property-based invariant tests for the block tree and reducer.
//!
//! 1. `remove` never leaves a dangling child reference
//! 2. `remove` keeps the relative order of surviving siblings
//! 3. Granular text changes are idempotent
//! 4. Granular text changes never revert fields they do not carry

use std::collections::HashSet;

use folio_tree::{BlockTree, DocEvent, TextChange, reduce};
use folio_types::{Block, BlockId, TextStyle};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

/// A random well-formed tree: node `i` hangs under some node `< i`.
fn tree_strategy() -> impl Strategy<Value = (BlockTree, usize)> {
    (1usize..40).prop_flat_map(|n| {
        let parents = proptest::collection::vec(any::<prop::sample::Index>(), n);
        (Just(n), parents).prop_map(|(n, parents)| {
            let mut children: Vec<Vec<String>> = vec![Vec::new(); n + 1];
            for (i, pick) in parents.iter().enumerate() {
                let node = i + 1;
                let parent = pick.index(node);
                children[parent].push(format!("b{node}"));
            }
            let blocks = (0..=n).map(|i| {
                Block::text(format!("b{i}"), format!("text {i}"), TextStyle::Paragraph)
                    .with_children(children[i].clone())
            });
            (BlockTree::from_blocks(blocks), n + 1)
        })
    })
}

fn style_strategy() -> impl Strategy<Value = TextStyle> {
    prop_oneof![
        Just(TextStyle::Paragraph),
        Just(TextStyle::Numbered),
        Just(TextStyle::Bulleted),
        Just(TextStyle::Toggle),
        Just(TextStyle::H1),
    ]
}

fn change_strategy() -> impl Strategy<Value = TextChange> {
    (
        proptest::option::of("[a-z]{0,8}"),
        proptest::option::of(style_strategy()),
        proptest::option::of(any::<bool>()),
        proptest::option::of("(red|blue|green)"),
    )
        .prop_map(|(text, style, checked, color)| TextChange {
            text,
            style,
            checked,
            color,
            ..Default::default()
        })
}

// ═══════════════════════════════════════════════════════════════════════
// 1-2. Removal safety and order
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn remove_never_leaves_dangling_children(
        (tree, len) in tree_strategy(),
        picks in proptest::collection::vec(any::<prop::sample::Index>(), 0..8),
    ) {
        let doomed: Vec<BlockId> = picks
            .iter()
            .map(|pick| BlockId::new(format!("b{}", pick.index(len))))
            .collect();
        let next = tree.remove(&doomed);

        for id in &doomed {
            prop_assert!(!next.contains(id));
        }
        for block in next.blocks() {
            for child in &block.children {
                prop_assert!(next.contains(child), "dangling {child} under {}", block.id);
            }
        }
    }

    #[test]
    fn remove_preserves_sibling_order(
        (tree, len) in tree_strategy(),
        pick in any::<prop::sample::Index>(),
    ) {
        let victim = BlockId::new(format!("b{}", pick.index(len)));
        let next = tree.remove([&victim]);

        for block in next.blocks() {
            let before: Vec<&BlockId> = tree
                .children_of(&block.id)
                .iter()
                .filter(|child| **child != victim)
                .collect();
            let after: Vec<&BlockId> = next.children_of(&block.id).iter().collect();
            prop_assert_eq!(before, after);
        }
    }

    #[test]
    fn generated_trees_are_well_formed((tree, _len) in tree_strategy()) {
        prop_assert!(tree.integrity_errors().is_empty());
        let reachable: HashSet<&BlockId> =
            tree.subtree(&BlockId::new("b0")).iter().map(|b| &b.id).collect();
        prop_assert_eq!(reachable.len(), tree.len());
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 3-4. Granular merge
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn granular_change_is_idempotent(
        (tree, len) in tree_strategy(),
        pick in any::<prop::sample::Index>(),
        change in change_strategy(),
    ) {
        let event = DocEvent::text_change(format!("b{}", pick.index(len)), change);
        let once = reduce(&tree, &event);
        let twice = reduce(&once, &event);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn absent_fields_are_never_reverted(
        first in change_strategy(),
        second in change_strategy(),
    ) {
        let tree = BlockTree::from_blocks([Block::text("p", "seed", TextStyle::Quote)]);
        let after_first = reduce(&tree, &DocEvent::text_change("p", first.clone()));
        let after_both = reduce(&after_first, &DocEvent::text_change("p", second.clone()));

        let mid = after_first.node(&BlockId::new("p")).and_then(|b| b.as_text()).cloned();
        let end = after_both.node(&BlockId::new("p")).and_then(|b| b.as_text()).cloned();
        let (mid, end) = match (mid, end) {
            (Some(mid), Some(end)) => (mid, end),
            _ => return Err(TestCaseError::fail("text block vanished")),
        };

        if second.text.is_none() {
            prop_assert_eq!(&end.text, &mid.text);
        }
        if second.style.is_none() {
            prop_assert_eq!(end.style, mid.style);
        }
        if second.checked.is_none() {
            prop_assert_eq!(end.is_checked, mid.is_checked);
        }
        if second.color.is_none() {
            prop_assert_eq!(&end.color, &mid.color);
        }
    }
}
