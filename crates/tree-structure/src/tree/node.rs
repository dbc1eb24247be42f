//! Node handles for the positional tree view

/// Position of an edge in a sorted structure
///
/// Only meaningful for the [`StructureTree`](super::StructureTree) it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    pub const fn new(index: usize) -> Self {
        NodeId(index)
    }

    pub const fn get(self) -> usize {
        self.0
    }
}

/// Whether anything hangs below a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Has at least one child edge (an assembly)
    Branch,
    /// Has no child edges (a part)
    Leaf,
}

/// A node of the view: its display name, its kind and the data it wraps
#[derive(Debug, Clone)]
pub struct Node<D> {
    pub name: String,
    pub kind: NodeKind,
    pub data: D,
}

impl<D> Node<D> {
    pub fn new(name: impl Into<String>, kind: NodeKind, data: D) -> Self {
        Self {
            name: name.into(),
            kind,
            data,
        }
    }
}
