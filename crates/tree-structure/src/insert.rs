//! Attaching nodes and subtrees to a flat edge list
//!
//! Every function here takes the current list by reference and returns a new
//! one, so a rejected attachment leaves the caller's structure untouched. The
//! result is not sorted; run [`sort_structure`](crate::sort_structure) on it.

use crate::error::{Result, StructureError};
use crate::model::{EdgeId, EdgeRecord, NodeKey, NodeSummary, SubtreeDetail, TreeKey};
use log::{debug, warn};
use std::collections::{HashMap, HashSet};

/// The existing edge whose child becomes the parent of an attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub child: NodeKey,
    pub level: u32,
}

impl Anchor {
    pub fn new(child: impl Into<NodeKey>, level: u32) -> Self {
        Self {
            child: child.into(),
            level,
        }
    }

    /// Anchor on an edge already present in the structure
    pub fn on(edge: &EdgeRecord) -> Self {
        Self::new(edge.child.clone(), edge.level)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.child.is_empty() {
            return Err(StructureError::Validation("anchor has no child id".into()));
        }
        Ok(())
    }
}

/// Position of the first edge whose child is the anchor
pub fn anchor_position(edges: &[EdgeRecord], anchor: &Anchor) -> Result<usize> {
    edges
        .iter()
        .position(|edge| edge.child == anchor.child)
        .ok_or_else(|| StructureError::AnchorNotFound(anchor.child.clone()))
}

/// `start` and every node reachable from it by following parent links
///
/// All incoming edges are followed, so a node listed under several parents
/// contributes every one of them.
pub fn lineage<'a>(edges: &'a [EdgeRecord], start: &'a NodeKey) -> HashSet<&'a NodeKey> {
    let mut parents_of: HashMap<&NodeKey, Vec<&NodeKey>> = HashMap::new();
    for edge in edges {
        if let Some(parent) = &edge.parent {
            parents_of.entry(&edge.child).or_default().push(parent);
        }
    }

    let mut seen = HashSet::from([start]);
    let mut pending = vec![start];
    while let Some(current) = pending.pop() {
        for &parent in parents_of.get(current).into_iter().flatten() {
            if seen.insert(parent) {
                pending.push(parent);
            }
        }
    }
    seen
}

/// Attach `node` as a new child of the anchor
///
/// The new edge carries no id, sits one level below the anchor and is placed
/// right after the anchor's edge.
pub fn attach_node(
    edges: &[EdgeRecord],
    anchor: &Anchor,
    node: &NodeSummary,
    tree: &TreeKey,
) -> Result<Vec<EdgeRecord>> {
    anchor.validate()?;
    if node.id.is_empty() {
        return Err(StructureError::Validation("node to attach has no id".into()));
    }

    let position = anchor_position(edges, anchor)?;
    ensure_not_attached(edges, anchor, &node.id)?;
    if lineage(edges, &anchor.child).contains(&node.id) {
        warn!("Refused to attach {} under its descendant {}", node.id, anchor.child);
        return Err(StructureError::CircularAttachment {
            node: node.id.clone(),
            anchor: anchor.child.clone(),
        });
    }

    let edge = EdgeRecord {
        id: EdgeId::Unassigned,
        name: Some(node.name.clone()),
        parent: Some(anchor.child.clone()),
        child: node.id.clone(),
        level: anchor.level.saturating_add(1),
        tree: tree.clone(),
    };
    debug!("Attaching {} under {} at level {}", edge.child, anchor.child, edge.level);

    Ok(splice(edges, position, std::iter::once(edge)))
}

/// Attach a subtree fetched from another tree under the anchor
///
/// `node` is the node the subtree was requested for; when `detail` holds no
/// structure for it, the node is attached on its own. Otherwise the edges of
/// the tree whose root edge comes first in `detail` are copied with that root
/// re-parented to the anchor, levels shifted so the root sits one below the
/// anchor, and a temporary id derived from `stamp` and the edge's index.
/// Names missing from the subtree fall back to `node.name`.
///
/// A (parent, child) pair already present in `edges` is not copied again, so
/// a subtree that is already part of the structure only gains its new root
/// edge.
pub fn attach_subtree(
    edges: &[EdgeRecord],
    anchor: &Anchor,
    node: &NodeSummary,
    detail: &SubtreeDetail,
    tree: &TreeKey,
    stamp: i64,
) -> Result<Vec<EdgeRecord>> {
    anchor.validate()?;
    if detail.tree_structures.is_empty() || detail.node.is_none() {
        debug!("No structure rooted at {}, attaching it as a single node", node.id);
        return attach_node(edges, anchor, node, tree);
    }

    let root = detail.root_edge().ok_or_else(|| {
        StructureError::Validation(format!("subtree of {} has no root edge", node.id))
    })?;
    let position = anchor_position(edges, anchor)?;
    ensure_not_attached(edges, anchor, &root.child)?;

    let source: Vec<&EdgeRecord> = detail
        .tree_structures
        .iter()
        .filter(|edge| edge.tree == root.tree)
        .collect();

    let lineage = lineage(edges, &anchor.child);
    if let Some(moved) = source.iter().find(|edge| lineage.contains(&edge.child)) {
        warn!("Refused to attach subtree containing {} under {}", moved.child, anchor.child);
        return Err(StructureError::CircularAttachment {
            node: moved.child.clone(),
            anchor: anchor.child.clone(),
        });
    }

    let level_diff = i64::from(anchor.level) + 1 - i64::from(root.level);
    let mut pairs: HashSet<(Option<&NodeKey>, &NodeKey)> = edges
        .iter()
        .map(|edge| (edge.parent.as_ref(), &edge.child))
        .collect();

    let mut remapped = Vec::with_capacity(source.len());
    for edge in source {
        let parent = edge.parent.as_ref().unwrap_or(&anchor.child);
        if !pairs.insert((Some(parent), &edge.child)) {
            debug!("{} is already under {}, not copying it", edge.child, parent);
            continue;
        }

        let level = (i64::from(edge.level) + level_diff).max(0);
        remapped.push(EdgeRecord {
            id: EdgeId::temporary(stamp, remapped.len()),
            name: Some(
                edge.name
                    .clone()
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| node.name.clone()),
            ),
            parent: Some(parent.clone()),
            child: edge.child.clone(),
            level: u32::try_from(level).unwrap_or(u32::MAX),
            tree: tree.clone(),
        });
    }

    debug!(
        "Attaching {} edge(s) rooted at {} under {} (level shift {})",
        remapped.len(),
        root.child,
        anchor.child,
        level_diff
    );

    Ok(splice(edges, position, remapped))
}

/// One edge per (parent, child) pair
fn ensure_not_attached(edges: &[EdgeRecord], anchor: &Anchor, child: &NodeKey) -> Result<()> {
    let duplicate = edges
        .iter()
        .any(|edge| edge.parent.as_ref() == Some(&anchor.child) && &edge.child == child);
    if duplicate {
        return Err(StructureError::Validation(format!(
            "{} is already attached under {}",
            child, anchor.child
        )));
    }
    Ok(())
}

fn splice(
    edges: &[EdgeRecord],
    position: usize,
    inserted: impl IntoIterator<Item = EdgeRecord>,
) -> Vec<EdgeRecord> {
    let mut result = Vec::with_capacity(edges.len() + 1);
    result.extend_from_slice(&edges[..=position]);
    result.extend(inserted);
    result.extend_from_slice(&edges[position + 1..]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::sort_structure;
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<EdgeRecord> {
        vec![
            EdgeRecord::root("A", "A"),
            EdgeRecord::under("A", "B", "B", 1),
        ]
    }

    fn tree() -> TreeKey {
        TreeKey::from("1")
    }

    #[test]
    fn test_attach_after_anchor() {
        let edges = sample();
        let result = attach_node(
            &edges,
            &Anchor::new("B", 1),
            &NodeSummary::new("C", "C"),
            &tree(),
        )
        .unwrap();

        assert_eq!(result.len(), 3);
        let added = &result[2];
        assert_eq!(added.parent, Some(NodeKey::from("B")));
        assert_eq!(added.child, NodeKey::from("C"));
        assert_eq!(added.level, 2);
        assert_eq!(added.id, EdgeId::Unassigned);
        assert_eq!(added.tree, tree());
    }

    #[test]
    fn test_splice_keeps_following_edges() {
        let mut edges = sample();
        edges.push(EdgeRecord::under("A", "D", "D", 1));

        let result = attach_node(
            &edges,
            &Anchor::new("B", 1),
            &NodeSummary::new("C", "C"),
            &tree(),
        )
        .unwrap();

        let order: Vec<&str> = result.iter().map(|e| e.child.as_str()).collect();
        assert_eq!(order, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_attach_under_itself() {
        let edges = sample();
        let err = attach_node(
            &edges,
            &Anchor::new("A", 0),
            &NodeSummary::new("A", "A"),
            &tree(),
        )
        .unwrap_err();

        assert!(matches!(err, StructureError::CircularAttachment { .. }));
        assert_eq!(edges, sample());
    }

    #[test]
    fn test_attach_ancestor_under_descendant() {
        let err = attach_node(
            &sample(),
            &Anchor::new("B", 1),
            &NodeSummary::new("A", "A"),
            &tree(),
        )
        .unwrap_err();

        match err {
            StructureError::CircularAttachment { node, anchor } => {
                assert_eq!(node, NodeKey::from("A"));
                assert_eq!(anchor, NodeKey::from("B"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_anchor() {
        let edges = sample();
        let err = attach_node(
            &edges,
            &Anchor::new("Z", 3),
            &NodeSummary::new("C", "C"),
            &tree(),
        )
        .unwrap_err();

        assert!(matches!(err, StructureError::AnchorNotFound(key) if key.as_str() == "Z"));
    }

    #[test]
    fn test_missing_ids_rejected() {
        let edges = sample();
        let c = NodeSummary::new("C", "C");
        let empty_anchor = attach_node(&edges, &Anchor::new("", 0), &c, &tree());
        assert!(matches!(empty_anchor, Err(StructureError::Validation(_))));

        let unnamed = NodeSummary::new("", "C");
        let empty_node = attach_node(&edges, &Anchor::new("B", 1), &unnamed, &tree());
        assert!(matches!(empty_node, Err(StructureError::Validation(_))));
    }

    #[test]
    fn test_same_pair_twice() {
        let err = attach_node(
            &sample(),
            &Anchor::new("A", 0),
            &NodeSummary::new("B", "B"),
            &tree(),
        )
        .unwrap_err();

        assert!(matches!(err, StructureError::Validation(_)));
    }

    #[test]
    fn test_lineage_follows_every_parent() {
        let edges = vec![
            EdgeRecord::root("p1", "P1"),
            EdgeRecord::root("p2", "P2"),
            EdgeRecord::under("p1", "s", "S", 1),
            EdgeRecord::under("p2", "s", "S", 1),
        ];
        let start = NodeKey::from("s");
        let found = lineage(&edges, &start);

        assert_eq!(found.len(), 3);
        assert!(found.contains(&NodeKey::from("p2")));
    }

    fn subtree() -> SubtreeDetail {
        let mut root = EdgeRecord::root("X", "Assembly X");
        root.level = 2;
        root.id = EdgeId::Persisted("40".into());
        let mut y = EdgeRecord::under("X", "Y", "Y", 3);
        y.id = EdgeId::Persisted("41".into());
        let mut z = EdgeRecord::under("Y", "Z", "", 4);
        z.id = EdgeId::Persisted("42".into());

        SubtreeDetail {
            tree_structures: vec![root, y, z],
            node: Some(NodeSummary::new("X", "Assembly X")),
            ..Default::default()
        }
    }

    #[test]
    fn test_subtree_levels_shift() {
        let edges = sample();
        let result = attach_subtree(
            &edges,
            &Anchor::new("A", 0),
            &NodeSummary::new("X", "Fallback"),
            &subtree(),
            &tree(),
            1700,
        )
        .unwrap();

        let attached = &result[1..4];
        let levels: Vec<u32> = attached.iter().map(|e| e.level).collect();
        assert_eq!(levels, vec![1, 2, 3]);
        assert_eq!(attached[0].parent, Some(NodeKey::from("A")));
        assert_eq!(attached[1].parent, Some(NodeKey::from("X")));
        assert_eq!(attached[2].parent, Some(NodeKey::from("Y")));
        assert_eq!(attached[2].name(), "Fallback");
        assert_eq!(result[4].child, NodeKey::from("B"));
    }

    #[test]
    fn test_subtree_ids_are_unique_temporaries() {
        let result = attach_subtree(
            &sample(),
            &Anchor::new("B", 1),
            &NodeSummary::new("X", "X"),
            &subtree(),
            &tree(),
            99,
        )
        .unwrap();

        let ids: Vec<&str> = result[2..].iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["temp_99_0", "temp_99_1", "temp_99_2"]);
        assert!(result[2..].iter().all(|e| e.tree == tree()));
    }

    #[test]
    fn test_subtree_containing_anchor() {
        let mut edges = sample();
        edges.push(EdgeRecord::under("B", "Y", "Y", 2));
        let err = attach_subtree(
            &edges,
            &Anchor::new("Y", 2),
            &NodeSummary::new("X", "X"),
            &subtree(),
            &tree(),
            1,
        )
        .unwrap_err();

        assert!(matches!(err, StructureError::CircularAttachment { .. }));
    }

    #[test]
    fn test_empty_subtree_attaches_single_node() {
        let result = attach_subtree(
            &sample(),
            &Anchor::new("B", 1),
            &NodeSummary::new("N", "New"),
            &SubtreeDetail::default(),
            &tree(),
            1,
        )
        .unwrap();

        assert_eq!(result.len(), 3);
        assert_eq!(result[2].child, NodeKey::from("N"));
        assert_eq!(result[2].id, EdgeId::Unassigned);
    }

    fn pair_counts(edges: &[EdgeRecord]) -> HashMap<(Option<&str>, &str), usize> {
        let mut counts = HashMap::new();
        for edge in edges {
            let pair = (edge.parent.as_ref().map(NodeKey::as_str), edge.child.as_str());
            *counts.entry(pair).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn test_subtree_already_in_structure() {
        let edges = vec![
            EdgeRecord::root("A", "A"),
            EdgeRecord::under("A", "B", "B", 1),
            EdgeRecord::under("B", "X", "X", 2),
            EdgeRecord::under("X", "Y", "Y", 3),
        ];
        let detail = SubtreeDetail {
            tree_structures: vec![
                EdgeRecord::root("X", "X"),
                EdgeRecord::under("X", "Y", "Y", 1),
            ],
            node: Some(NodeSummary::new("X", "X")),
            ..Default::default()
        };

        let result = attach_subtree(
            &edges,
            &Anchor::new("A", 0),
            &NodeSummary::new("X", "X"),
            &detail,
            &tree(),
            5,
        )
        .unwrap();

        assert_eq!(result.len(), 5);
        assert_eq!(result[1].parent, Some(NodeKey::from("A")));
        assert_eq!(result[1].child, NodeKey::from("X"));
        assert_eq!(result[1].id.as_str(), "temp_5_0");
        assert!(pair_counts(&sort_structure(&result)).values().all(|&n| n == 1));
    }

    #[test]
    fn test_subtree_rooted_in_two_trees() {
        let in_tree = |mut edge: EdgeRecord, tree: &str| {
            edge.tree = TreeKey::from(tree);
            edge
        };
        let detail = SubtreeDetail {
            tree_structures: vec![
                in_tree(EdgeRecord::root("X", "X"), "4"),
                in_tree(EdgeRecord::under("X", "Y", "Y", 1), "4"),
                in_tree(EdgeRecord::root("X", "X"), "5"),
                in_tree(EdgeRecord::under("X", "Y", "Y", 1), "5"),
                in_tree(EdgeRecord::under("Y", "W", "W", 2), "5"),
            ],
            node: Some(NodeSummary::new("X", "X")),
            ..Default::default()
        };

        let result = attach_subtree(
            &sample(),
            &Anchor::new("B", 1),
            &NodeSummary::new("X", "X"),
            &detail,
            &tree(),
            8,
        )
        .unwrap();

        let added: Vec<(Option<&str>, &str)> = result[2..]
            .iter()
            .map(|e| (e.parent.as_ref().map(NodeKey::as_str), e.child.as_str()))
            .collect();
        assert_eq!(added, vec![(Some("B"), "X"), (Some("X"), "Y")]);
        assert!(pair_counts(&result).values().all(|&n| n == 1));
    }

    #[test]
    fn test_attach_at_deepest_level() {
        let edges = vec![EdgeRecord::root("A", "A")];
        let result = attach_node(
            &edges,
            &Anchor::new("A", u32::MAX),
            &NodeSummary::new("B", "B"),
            &tree(),
        )
        .unwrap();

        assert_eq!(result[1].level, u32::MAX);
    }

    #[test]
    fn test_subtree_without_root() {
        let mut detail = subtree();
        detail.tree_structures.remove(0);
        let err = attach_subtree(
            &sample(),
            &Anchor::new("B", 1),
            &NodeSummary::new("X", "X"),
            &detail,
            &tree(),
            1,
        )
        .unwrap_err();

        assert!(matches!(err, StructureError::Validation(_)));
    }
}
