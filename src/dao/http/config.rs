use std::time::Duration;

/// Default base URL of the scoring API.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api/v1";
/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Runtime configuration describing how to reach the scoring API.
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL every request path is appended to.
    pub base_url: String,
    /// Timeout applied to each request.
    pub timeout: Duration,
}

impl ApiClientConfig {
    /// Construct a configuration for an explicit base URL with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}
