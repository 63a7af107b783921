//! `skillflow-client` — streaming client for remote workflow runs.
//!
//! Dispatches one workflow invocation with `response_mode: "streaming"` and
//! consumes the reply as a live event stream, turning arbitrarily-chunked
//! network data back into discrete lifecycle events and, finally, a single
//! [`InvocationResult`].
//!
//! # Architecture
//!
//! ```text
//! InvocationRequest
//!     │
//!     ▼
//! WorkflowClient      ← POST {base}/workflows/run, bearer auth
//!     │                  status / empty-body checks
//!     ▼
//! FrameReassembler    ← bytes → newline-delimited frames (carry-over buffer)
//!     │
//!     ▼
//! extract_event       ← `data: {json}` → StreamEvent; junk frames dropped
//!     │                  (EventStream wraps both as a futures::Stream)
//!     ▼
//! LifecycleTracker    ← run id + outputs snapshot, optional Progress observer
//!     │
//!     ▼
//! runner::aggregate   ← InvocationResult { data, metadata } | { error }
//! ```
//!
//! # Quick start
//!
//! ```rust,ignore
//! use skillflow_client::{ClientConfig, InvocationRequest, InvocationResult, WorkflowClient};
//!
//! let client = WorkflowClient::new(ClientConfig::from_env())?;
//! let request = InvocationRequest::new("Summarise the open issues")?.with_depth(4);
//!
//! match client.invoke(&request).await {
//!     InvocationResult::Success { data, metadata } => println!("{}", data.guide),
//!     InvocationResult::Failure { error } => eprintln!("{error}"),
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod frame;
pub mod runner;
pub mod stream;
pub mod tracker;
pub mod types;


pub use client::{InvokeOptions, WorkflowClient};
pub use config::ClientConfig;
pub use error::WorkflowError;
pub use event::extract_event;
pub use frame::FrameReassembler;
pub use stream::EventStream;
pub use tracker::{LifecycleTracker, Progress, ProgressHandler, Snapshot};
pub use types::{
    EventKind, InvocationRequest, InvocationResult, ResultData, ResultMetadata, StreamEvent,
    WorkflowOutputs,
};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, WorkflowError>;

/// Build a client from `config` and run `request` with `options`.
///
/// Configuration errors (such as a missing API key) come back as an
/// [`InvocationResult::Failure`] before any request is sent, so the caller
/// never has to handle an `Err`.
pub async fn invoke(
    config: ClientConfig,
    request: &InvocationRequest,
    options: InvokeOptions,
) -> InvocationResult {
    match WorkflowClient::new(config) {
        Ok(client) => client.invoke_with(request, options).await,
        Err(e) => InvocationResult::from_error(e),
    }
}
