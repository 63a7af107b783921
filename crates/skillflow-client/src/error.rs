use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("API request failed: {status} - {body}")]
    Http { status: u16, body: String },

    #[error("no response body")]
    NoResponseBody,

    #[error("failed to parse stream event: {source}\n  line: {line}")]
    Parse {
        line: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("workflow completed but no outputs received")]
    EmptyResult,

    #[error("workflow invocation failed: {0}")]
    Transport(String),

    #[error("workflow invocation cancelled")]
    Cancelled,

    #[error("workflow invocation timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
}

impl From<reqwest::Error> for WorkflowError {
    fn from(e: reqwest::Error) -> Self {
        WorkflowError::Transport(e.to_string())
    }
}
