//! The seam between the structure editor and the backend

use crate::error::Result;
use crate::model::{
    EdgeRecord, GeneratedCode, NodeKey, NodeSummary, PrefixKey, SubtreeDetail, TreeKey,
};
use async_trait::async_trait;

/// Remote source and sink of tree structures
///
/// Implementations report failures as [`StructureError::Network`](crate::StructureError::Network)
/// and never retry; the caller decides what to do with a failed call.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Raw edges of a tree: unsorted and without names
    async fn fetch_structure(&self, tree: &TreeKey) -> Result<Vec<EdgeRecord>>;

    /// The node behind an edge's child, used to put names on edges
    async fn fetch_node(&self, node: &NodeKey) -> Result<NodeSummary>;

    /// Every structure rooted at `node`, for reattaching it elsewhere
    async fn fetch_subtree(&self, node: &NodeKey) -> Result<SubtreeDetail>;

    /// Mint a new code (and its node) from a prefix
    async fn generate_code(&self, prefix: &PrefixKey) -> Result<GeneratedCode>;

    /// Write the whole structure of `tree` and return the persisted records
    async fn bulk_persist(&self, tree: &TreeKey, edges: &[EdgeRecord]) -> Result<Vec<EdgeRecord>>;
}
