use std::time::Duration;

/// Where the backend lives and how long to wait for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Root of the API, e.g. `http://localhost:8000/api/`
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl RemoteConfig {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:8000/api/";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}
