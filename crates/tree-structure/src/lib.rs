//! Tree Structure Library
//!
//! Client-side editing of a tree's flat edge list: every parent -> child
//! relationship of a tree is one [`EdgeRecord`], and the backend stores and
//! serves them as an unordered list.
//!
//! # Core Concepts
//!
//! - **Sorter**: [`sort_structure`] puts a list in depth-first, name-sorted
//!   order and recomputes every level
//! - **Insertion engine**: [`attach_node`] and [`attach_subtree`] splice new
//!   edges after an [`Anchor`], refusing attachments that would form a cycle
//! - **Gateway**: the [`Gateway`] trait is the only way the library talks to
//!   the backend
//! - **Editor**: [`StructureEditor`] owns one tree's structure, applies edits
//!   speculatively and persists them in one call
//!
//! # Example
//!
//! ```
//! use tree_structure::prelude::*;
//!
//! let edges = vec![
//!     EdgeRecord::under("frame", "bolt", "Bolt", 1),
//!     EdgeRecord::root("frame", "Frame"),
//! ];
//! let sorted = sort_structure(&edges);
//! let updated = attach_node(
//!     &sorted,
//!     &Anchor::on(&sorted[0]),
//!     &NodeSummary::new("nut", "Nut"),
//!     &TreeKey::from("1"),
//! )
//! .unwrap();
//!
//! assert_eq!(render_outline(&updated), "Frame\n  Bolt\n  Nut");
//! ```

mod collate;
mod editor;
mod error;
mod gateway;
mod insert;
mod model;
mod sort;
pub mod tree;

pub use collate::{compare_names, compare_optional_names};
pub use editor::{Attachment, Observer, StructureEditor, UNKNOWN_NODE_NAME, UNNAMED_NODE_NAME};
pub use error::{Result, StructureError};
pub use gateway::Gateway;
pub use insert::{anchor_position, attach_node, attach_subtree, lineage, Anchor};
pub use model::{
    CodeType, EdgeId, EdgeRecord, GeneratedCode, NodeKey, NodeSummary, Prefix, PrefixKey,
    SubtreeDetail, TreeKey, TreeSummary, TEMPORARY_ID_PREFIX,
};
pub use sort::sort_structure;
pub use tree::render_outline;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::tree::prelude::*;
    pub use crate::{
        attach_node, attach_subtree, sort_structure, Anchor, Attachment, EdgeId, EdgeRecord,
        Gateway, NodeKey, NodeSummary, StructureEditor, StructureError, TreeKey,
    };
}
