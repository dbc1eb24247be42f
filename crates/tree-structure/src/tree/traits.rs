//! Navigation traits over a forest of named nodes

use crate::tree::{Node, NodeId, NodeKind};

/// A forest: several roots, each node with at most one parent
///
/// Implementors provide the primitive lookups; everything else is derived.
pub trait Tree {
    /// Data stored at each node
    type NodeData;

    /// Root nodes in display order
    fn roots(&self) -> Vec<NodeId>;

    /// Returns `None` if the ID is invalid.
    fn get(&self, id: NodeId) -> Option<&Node<Self::NodeData>>;

    /// Returns `None` for roots and invalid IDs.
    fn parent(&self, id: NodeId) -> Option<NodeId>;

    /// Children in display order; empty for leaves and invalid IDs.
    fn children(&self, id: NodeId) -> Box<dyn Iterator<Item = NodeId> + '_>;

    fn node_count(&self) -> usize;

    fn is_leaf(&self, id: NodeId) -> bool {
        self.get(id)
            .map(|n| n.kind == NodeKind::Leaf)
            .unwrap_or(false)
    }

    fn name(&self, id: NodeId) -> Option<&str> {
        self.get(id).map(|n| n.name.as_str())
    }

    /// Number of parent hops to a root (root = 0)
    fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).len()
    }

    /// Ancestors from parent to root
    fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut ancestors = Vec::new();
        let mut current = self.parent(id);
        while let Some(parent_id) = current {
            if ancestors.contains(&parent_id) {
                break;
            }
            ancestors.push(parent_id);
            current = self.parent(parent_id);
        }
        ancestors
    }
}

/// Walking, implemented for every [`Tree`]
pub trait TreeTraversal: Tree {
    /// Walk every root in order, parents before children
    fn walk(&self) -> TreeWalker<'_, Self>
    where
        Self: Sized,
    {
        TreeWalker::new(self, self.roots())
    }

    fn leaves(&self) -> Vec<NodeId>
    where
        Self: Sized,
    {
        self.walk().filter(|&id| self.is_leaf(id)).collect()
    }
}

impl<T: Tree> TreeTraversal for T {}

/// Pre-order iterator over a forest
pub struct TreeWalker<'a, T: Tree + ?Sized> {
    tree: &'a T,
    stack: Vec<NodeId>,
}

impl<'a, T: Tree + ?Sized> TreeWalker<'a, T> {
    pub fn new(tree: &'a T, starts: Vec<NodeId>) -> Self {
        let mut stack = starts;
        stack.reverse();
        Self { tree, stack }
    }
}

impl<'a, T: Tree + ?Sized> Iterator for TreeWalker<'a, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        let children: Vec<_> = self.tree.children(current).collect();
        self.stack.extend(children.into_iter().rev());
        Some(current)
    }
}
