use reqwest::StatusCode;
use tree_structure::StructureError;

/// Failure talking to the backend
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status
    #[error("{url} returned {status}: {body}")]
    Status {
        status: StatusCode,
        url: String,
        body: String,
    },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<RemoteError> for StructureError {
    fn from(err: RemoteError) -> Self {
        StructureError::network(err)
    }
}

pub type Result<T> = std::result::Result<T, RemoteError>;
