use std::time::Duration;

/// Configuration for a [`crate::WorkspaceClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, e.g. "http://localhost:8080"
    pub base_url: String,
    /// Session token attached to outgoing requests; owned by the
    /// authentication layer, read-only here
    pub auth_token: Option<String>,
    /// Timeout for one-shot request/response calls. Does not bound the
    /// result stream; stream deadlines travel with each submission.
    pub request_timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_token: None,
            request_timeout: None,
        }
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}
