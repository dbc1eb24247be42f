//! Positional view over a sorted edge list

use crate::model::{EdgeRecord, NodeKey};
use crate::sort::sort_structure;
use crate::tree::{Node, NodeId, NodeKind, Tree, TreeTraversal};
use std::collections::HashMap;

/// A [`Tree`] whose nodes are the edges of a structure
///
/// The edges are sorted on construction. The parent of an edge is the first
/// edge whose child is the edge's parent key; sorting guarantees that edge
/// comes earlier, so the view has no cycles.
pub struct StructureTree {
    nodes: Vec<Node<EdgeRecord>>,
    parents: Vec<Option<NodeId>>,
    children: Vec<Vec<NodeId>>,
    roots: Vec<NodeId>,
}

impl StructureTree {
    pub fn new(edges: &[EdgeRecord]) -> Self {
        let sorted = sort_structure(edges);

        let mut first_by_child: HashMap<&NodeKey, NodeId> = HashMap::new();
        let mut parents = Vec::with_capacity(sorted.len());
        let mut children = vec![Vec::new(); sorted.len()];
        let mut roots = Vec::new();

        for (index, edge) in sorted.iter().enumerate() {
            let id = NodeId::new(index);
            let parent = edge
                .parent
                .as_ref()
                .and_then(|key| first_by_child.get(key).copied());
            match parent {
                Some(parent) => children[parent.get()].push(id),
                None => roots.push(id),
            }
            parents.push(parent);
            first_by_child.entry(&edge.child).or_insert(id);
        }

        let nodes = sorted
            .iter()
            .zip(&children)
            .map(|(edge, below)| {
                let kind = if below.is_empty() {
                    NodeKind::Leaf
                } else {
                    NodeKind::Branch
                };
                Node::new(edge.name(), kind, edge.clone())
            })
            .collect();

        Self {
            nodes,
            parents,
            children,
            roots,
        }
    }

    /// The edge behind a node
    pub fn edge(&self, id: NodeId) -> Option<&EdgeRecord> {
        self.get(id).map(|node| &node.data)
    }
}

impl Tree for StructureTree {
    type NodeData = EdgeRecord;

    fn roots(&self) -> Vec<NodeId> {
        self.roots.clone()
    }

    fn get(&self, id: NodeId) -> Option<&Node<EdgeRecord>> {
        self.nodes.get(id.get())
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(id.get()).copied().flatten()
    }

    fn children(&self, id: NodeId) -> Box<dyn Iterator<Item = NodeId> + '_> {
        Box::new(
            self.children
                .get(id.get())
                .map(|c| c.iter().copied())
                .into_iter()
                .flatten(),
        )
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Render a structure as an outline, two spaces of indent per level
pub fn render_outline(edges: &[EdgeRecord]) -> String {
    let tree = StructureTree::new(edges);
    tree.walk()
        .filter_map(|id| {
            let name = tree.name(id)?;
            Some(format!("{:indent$}{}", "", name, indent = tree.depth(id) * 2))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn structure() -> Vec<EdgeRecord> {
        vec![
            EdgeRecord::under("frame", "nut", "Nut M6", 1),
            EdgeRecord::root("frame", "Frame"),
            EdgeRecord::under("arm", "bolt", "Bolt M6", 2),
            EdgeRecord::under("frame", "arm", "Arm", 1),
            EdgeRecord::root("spare", "Spare kit"),
        ]
    }

    fn named(tree: &StructureTree, name: &str) -> NodeId {
        tree.walk().find(|&id| tree.name(id) == Some(name)).unwrap()
    }

    #[test]
    fn test_view_follows_sorted_order() {
        let tree = StructureTree::new(&structure());
        assert_eq!(tree.node_count(), 5);
        assert_eq!(tree.roots().len(), 2);

        let arm = named(&tree, "Arm");
        let bolt = named(&tree, "Bolt M6");
        assert!(!tree.is_leaf(arm));
        assert!(tree.is_leaf(bolt));
        assert_eq!(tree.parent(bolt), Some(arm));
        assert_eq!(tree.edge(bolt).map(|e| e.level), Some(2));
        assert_eq!(tree.leaves().len(), 3);
    }

    #[test]
    fn test_depth_matches_level() {
        let tree = StructureTree::new(&structure());
        for id in tree.walk() {
            assert_eq!(tree.depth(id) as u32, tree.edge(id).unwrap().level);
        }
    }

    #[test]
    fn test_render_outline() {
        insta::assert_snapshot!(render_outline(&structure()), @r"
        Frame
          Arm
            Bolt M6
          Nut M6
        Spare kit
        ");
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_outline(&[]), "");
    }
}
