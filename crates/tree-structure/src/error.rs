use crate::model::NodeKey;

/// Failure of a structure operation
///
/// No variant leaves a partially applied mutation behind: when an operation
/// returns an error the edge list is exactly as it was before the call.
#[derive(Debug, thiserror::Error)]
pub enum StructureError {
    /// A gateway call failed; the source is whatever the gateway reported
    #[error("remote request failed: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Required anchor or payload fields are missing
    #[error("invalid attachment: {0}")]
    Validation(String),

    /// The node being attached is the anchor or one of its ancestors
    #[error("attaching {node} under {anchor} would create a cycle")]
    CircularAttachment { node: NodeKey, anchor: NodeKey },

    /// No edge in the structure has the anchor as its child
    #[error("no edge in the structure has child {0}")]
    AnchorNotFound(NodeKey),
}

impl StructureError {
    pub fn network(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        StructureError::Network(Box::new(source))
    }
}

pub type Result<T, E = StructureError> = std::result::Result<T, E>;
