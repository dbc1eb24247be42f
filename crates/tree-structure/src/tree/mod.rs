//! Navigable view of a structure
//!
//! The flat edge list is what the backend stores and what the editor
//! mutates; this module turns a sorted list into a forest that can be walked
//! and rendered.

mod node;
mod structure;
mod traits;

pub use node::{Node, NodeId, NodeKind};
pub use structure::{render_outline, StructureTree};
pub use traits::{Tree, TreeTraversal, TreeWalker};

/// Re-export common types for convenience
pub mod prelude {
    pub use super::{render_outline, Node, NodeId, NodeKind, StructureTree, Tree, TreeTraversal};
}
