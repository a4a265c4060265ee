//! Locator resolution against a semantic tree.
//!
//! Attribute strategies match by exact equality and must match exactly one
//! node. Hierarchy paths walk down from the root by sibling position,
//! regardless of each child's type.

use crate::locator::{HierarchyPath, Locator, LocatorStrategy};
use crate::result::ResolutionError;
use crate::tree::{NodeId, SemanticNode, SemanticTree};

/// Resolve a locator to exactly one node
pub fn resolve(locator: &Locator, tree: &SemanticTree) -> Result<NodeId, ResolutionError> {
    match locator.strategy {
        LocatorStrategy::StableTag => unique(locator, tree, |n| n.tag.as_deref()),
        LocatorStrategy::Text => unique(locator, tree, |n| n.text.as_deref()),
        LocatorStrategy::AccessibilityDescription => {
            unique(locator, tree, |n| n.description.as_deref())
        }
        LocatorStrategy::HierarchyPath => {
            let path = HierarchyPath::parse(&locator.value)?;
            resolve_path(&path, tree).map_err(|reason| ResolutionError::InvalidPath {
                path: locator.value.clone(),
                reason,
            })
        }
    }
}

fn unique<F>(locator: &Locator, tree: &SemanticTree, field: F) -> Result<NodeId, ResolutionError>
where
    F: Fn(&SemanticNode) -> Option<&str>,
{
    let mut matches = tree
        .nodes()
        .filter(|n| field(n) == Some(locator.value.as_str()))
        .map(SemanticNode::id);
    let Some(first) = matches.next() else {
        return Err(ResolutionError::NotFound {
            locator: locator.to_string(),
        });
    };
    let extra = matches.count();
    if extra > 0 {
        return Err(ResolutionError::Ambiguous {
            locator: locator.to_string(),
            count: extra + 1,
        });
    }
    Ok(first)
}

/// Walk a parsed path down the tree, one sibling index per level
pub fn resolve_path(path: &HierarchyPath, tree: &SemanticTree) -> Result<NodeId, String> {
    let mut current = tree.root();
    for (depth, segment) in path.segments().iter().enumerate().skip(1) {
        let Some(index) = segment.index else {
            return Err(format!("segment '{}' lacks a sibling index", segment.name));
        };
        let child = current.children().get(index).copied().ok_or_else(|| {
            format!(
                "index {index} out of range at depth {depth} ({} has {} children)",
                current.display_name(),
                current.children().len()
            )
        })?;
        current = tree
            .get(child)
            .ok_or_else(|| format!("dangling child {child} at depth {depth}"))?;
    }
    Ok(current.id())
}

/// Compute the hierarchy path of a node by walking parent links upward.
///
/// Returns `None` when any level cannot be located among its parent's
/// children; callers treat that as unresolved.
#[must_use]
pub fn compute_path(tree: &SemanticTree, node: NodeId) -> Option<HierarchyPath> {
    let mut levels = Vec::new();
    let mut current = tree.get(node)?;
    while let Some(parent) = current.parent() {
        let index = tree.get(parent)?.children().iter().position(|c| *c == current.id())?;
        levels.push((current.display_name(), index));
        current = tree.get(parent)?;
    }
    if current.id() != NodeId::ROOT {
        return None;
    }
    levels.reverse();
    Some(HierarchyPath::from_indices(levels))
}

/// Most stable attribute locator that uniquely identifies `node`.
///
/// Only node-attached identifiers qualify: a unique stable tag first, then a
/// unique accessibility description.
#[must_use]
pub fn stable_locator_for(tree: &SemanticTree, node: NodeId) -> Option<Locator> {
    let target = tree.get(node)?;
    if let Some(ref tag) = target.tag {
        let candidate = Locator::stable_tag(tag.clone());
        if resolve(&candidate, tree).ok() == Some(node) {
            return Some(candidate.with_rationale("unique stable tag"));
        }
    }
    if let Some(ref desc) = target.description {
        let candidate = Locator::description(desc.clone());
        if resolve(&candidate, tree).ok() == Some(node) {
            return Some(candidate.with_rationale("unique accessibility description"));
        }
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::tree::NodeSpec;
    use proptest::prelude::*;

    fn list_screen() -> SemanticTree {
        NodeSpec::new("Column")
            .child(NodeSpec::new("Text").text("Inbox").description("inbox title"))
            .child(
                NodeSpec::new("LazyColumn")
                    .child(
                        NodeSpec::new("Row")
                            .child(NodeSpec::new("Text").text("Delete"))
                            .child(NodeSpec::new("Button").tag("archive").text("Archive")),
                    )
                    .child(
                        NodeSpec::new("Row")
                            .child(NodeSpec::new("Text").text("Delete"))
                            .child(NodeSpec::new("Icon").description("star")),
                    ),
            )
            .build()
    }

    mod attribute_tests {
        use super::*;

        #[test]
        fn test_tag_resolves_uniquely() {
            let tree = list_screen();
            let id = resolve(&Locator::stable_tag("archive"), &tree).unwrap();
            assert_eq!(tree.get(id).unwrap().text.as_deref(), Some("Archive"));
        }

        #[test]
        fn test_duplicate_text_is_ambiguous() {
            let tree = list_screen();
            let err = resolve(&Locator::text("Delete"), &tree).unwrap_err();
            assert_eq!(
                err,
                ResolutionError::Ambiguous {
                    locator: "text=\"Delete\"".to_string(),
                    count: 2
                }
            );
        }

        #[test]
        fn test_missing_description_not_found() {
            let tree = list_screen();
            let err = resolve(&Locator::description("settings"), &tree).unwrap_err();
            assert!(matches!(err, ResolutionError::NotFound { .. }));
        }

        #[test]
        fn test_text_match_is_exact() {
            let tree = list_screen();
            assert!(resolve(&Locator::text("Inbo"), &tree).is_err());
            assert!(resolve(&Locator::text("inbox"), &tree).is_err());
            assert!(resolve(&Locator::text("Inbox"), &tree).is_ok());
        }
    }

    mod path_tests {
        use super::*;

        #[test]
        fn test_path_walks_by_position() {
            let tree = list_screen();
            let locator = Locator::new(
                LocatorStrategy::HierarchyPath,
                "Root>LazyColumn[1]>Row[1]>Icon[1]",
            );
            let id = resolve(&locator, &tree).unwrap();
            assert_eq!(tree.get(id).unwrap().description.as_deref(), Some("star"));
        }

        #[test]
        fn test_path_ignores_segment_names() {
            let tree = list_screen();
            let locator = Locator::new(LocatorStrategy::HierarchyPath, "Root>X[1]>Y[0]>Z[1]");
            let id = resolve(&locator, &tree).unwrap();
            assert_eq!(tree.get(id).unwrap().tag.as_deref(), Some("archive"));
        }

        #[test]
        fn test_out_of_range_is_invalid_path() {
            let tree = list_screen();
            let locator = Locator::new(LocatorStrategy::HierarchyPath, "Root>LazyColumn[1]>Row[5]");
            let err = resolve(&locator, &tree).unwrap_err();
            match err {
                ResolutionError::InvalidPath { reason, .. } => {
                    assert!(reason.contains("out of range"));
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn test_root_path_resolves_root() {
            let tree = list_screen();
            let locator = Locator::new(LocatorStrategy::HierarchyPath, "Root");
            assert_eq!(resolve(&locator, &tree).unwrap(), NodeId::ROOT);
        }

        #[test]
        fn test_compute_path_for_nested_node() {
            let tree = list_screen();
            let star = tree
                .nodes()
                .find(|n| n.description.as_deref() == Some("star"))
                .unwrap()
                .id();
            let path = compute_path(&tree, star).unwrap();
            assert_eq!(path.to_string(), "Root>LazyColumn[1]>Row[1]>Icon[1]");
        }

        #[test]
        fn test_compute_path_of_root() {
            let tree = list_screen();
            assert_eq!(compute_path(&tree, NodeId::ROOT).unwrap().to_string(), "Root");
        }
    }

    mod stable_locator_tests {
        use super::*;

        #[test]
        fn test_prefers_tag() {
            let tree = list_screen();
            let id = resolve(&Locator::text("Archive"), &tree).unwrap();
            let best = stable_locator_for(&tree, id).unwrap();
            assert_eq!(best.strategy, LocatorStrategy::StableTag);
            assert_eq!(best.value, "archive");
        }

        #[test]
        fn test_falls_back_to_description() {
            let tree = list_screen();
            let id = resolve(&Locator::text("Inbox"), &tree).unwrap();
            let best = stable_locator_for(&tree, id).unwrap();
            assert_eq!(best.strategy, LocatorStrategy::AccessibilityDescription);
        }

        #[test]
        fn test_none_without_identifiers() {
            let tree = NodeSpec::new("Column")
                .child(NodeSpec::new("Text").text("Hello"))
                .build();
            let id = resolve(&Locator::text("Hello"), &tree).unwrap();
            assert!(stable_locator_for(&tree, id).is_none());
        }

        #[test]
        fn test_duplicate_tag_not_used() {
            let tree = NodeSpec::new("Column")
                .child(NodeSpec::new("Button").tag("item").text("One"))
                .child(NodeSpec::new("Button").tag("item").text("Two"))
                .build();
            let id = resolve(&Locator::text("Two"), &tree).unwrap();
            assert!(stable_locator_for(&tree, id).is_none());
        }
    }

    fn arb_spec() -> impl Strategy<Value = NodeSpec> {
        let leaf = prop_oneof![Just("Text"), Just("Button"), Just("Icon")]
            .prop_map(|class| NodeSpec::new(class));
        leaf.prop_recursive(4, 40, 5, |inner| {
            (
                prop_oneof![Just("Row"), Just("Column"), Just("Box")],
                prop::collection::vec(inner, 0..5),
            )
                .prop_map(|(class, children)| {
                    children
                        .into_iter()
                        .fold(NodeSpec::new(class), NodeSpec::child)
                })
        })
    }

    proptest! {
        #[test]
        fn prop_path_round_trip(spec in arb_spec(), pick in any::<prop::sample::Index>()) {
            let tree = spec.build();
            let node = NodeId::ROOT;
            let target = tree.nodes().nth(pick.index(tree.len())).map_or(node, SemanticNode::id);
            let path = compute_path(&tree, target).expect("path");
            let reparsed = HierarchyPath::parse(&path.to_string()).expect("parse");
            prop_assert_eq!(resolve_path(&reparsed, &tree), Ok(target));
        }
    }
}
