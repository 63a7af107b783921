use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.dify.ai/v1";
pub const DEFAULT_USER: &str = "skillflow";

pub const ENV_API_URL: &str = "SKILLFLOW_API_URL";
pub const ENV_API_KEY: &str = "SKILLFLOW_API_KEY";
pub const ENV_USER: &str = "SKILLFLOW_USER";

// ─── ClientConfig ─────────────────────────────────────────────────────────

/// Connection settings for a [`WorkflowClient`](crate::WorkflowClient).
///
/// The API key is optional here so a config can be assembled from partial
/// sources; [`WorkflowClient::new`](crate::WorkflowClient::new) rejects a
/// config without one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Client identifier sent as `user` in every request.
    pub user: String,
    /// Connect timeout for the HTTP client. The stream itself is bounded by
    /// [`InvokeOptions::timeout`](crate::InvokeOptions::timeout).
    pub connect_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            user: DEFAULT_USER.to_string(),
            connect_timeout: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    /// Read `SKILLFLOW_API_URL`, `SKILLFLOW_API_KEY` and `SKILLFLOW_USER`.
    /// Unset or blank variables fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            base_url: var(ENV_API_URL).unwrap_or(defaults.base_url),
            api_key: var(ENV_API_KEY),
            user: var(ENV_USER).unwrap_or(defaults.user),
            connect_timeout: None,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// `{base_url}/workflows/run`, tolerating a trailing slash on the base.
    pub fn run_url(&self) -> String {
        format!("{}/workflows/run", self.base_url.trim_end_matches('/'))
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
