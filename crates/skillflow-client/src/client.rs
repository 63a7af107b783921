use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::Serialize;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::{ClientConfig, ENV_API_KEY};
use crate::runner::{self, Guard};
use crate::stream::EventStream;
use crate::tracker::ProgressHandler;
use crate::types::{InvocationRequest, InvocationResult};
use crate::{Result, WorkflowError};

// ─── Wire body ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct RunBody<'a> {
    inputs: RunInputs<'a>,
    response_mode: &'static str,
    user: &'a str,
}

/// Workflow inputs; the service expects `depth` as a string.
#[derive(Debug, Serialize)]
struct RunInputs<'a> {
    task: &'a str,
    context: &'a str,
    depth: String,
}

impl<'a> RunBody<'a> {
    fn new(request: &'a InvocationRequest, user: &'a str) -> Self {
        Self {
            inputs: RunInputs {
                task: request.task(),
                context: request.context(),
                depth: request.depth().to_string(),
            },
            response_mode: "streaming",
            user,
        }
    }
}

// ─── InvokeOptions ────────────────────────────────────────────────────────

/// Per-invocation knobs: progress observer, cancellation and deadline.
#[derive(Clone, Default)]
pub struct InvokeOptions {
    pub on_progress: Option<ProgressHandler>,
    pub cancel: Option<CancellationToken>,
    /// Upper bound on the whole invocation, dispatch included.
    pub timeout: Option<Duration>,
}

impl InvokeOptions {
    pub fn on_progress(mut self, handler: ProgressHandler) -> Self {
        self.on_progress = Some(handler);
        self
    }

    pub fn cancel_with(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

// ─── WorkflowClient ───────────────────────────────────────────────────────

/// Dispatches workflow runs and consumes their streamed responses.
///
/// Cheap to clone; clones share the underlying connection pool. Each
/// invocation owns its own buffer and snapshot, so concurrent calls do not
/// interact.
#[derive(Clone)]
pub struct WorkflowClient {
    http: reqwest::Client,
    api_key: String,
    run_url: String,
    user: String,
}

impl WorkflowClient {
    /// Validate `config` and build a client. Fails without touching the
    /// network when no API key is configured.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let run_url = config.run_url();
        let api_key = config
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| WorkflowError::Config(format!("missing API key: set {ENV_API_KEY}")))?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| WorkflowError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key,
            run_url,
            user: config.user,
        })
    }

    /// Run the workflow to completion. Never returns an error: every
    /// failure is folded into [`InvocationResult::Failure`].
    pub async fn invoke(&self, request: &InvocationRequest) -> InvocationResult {
        self.invoke_with(request, InvokeOptions::default()).await
    }

    pub async fn invoke_with(
        &self,
        request: &InvocationRequest,
        options: InvokeOptions,
    ) -> InvocationResult {
        let started = Instant::now();
        let guard = Guard::new(options.cancel, options.timeout, started);

        let events = match self.open_stream(request, &guard).await {
            Ok(events) => events,
            Err(e) => return InvocationResult::from_error(e),
        };
        runner::consume(events, options.on_progress, &guard, started).await
    }

    /// Dispatch the request and hand back the raw event stream, for callers
    /// that want to fold events themselves.
    pub async fn stream(&self, request: &InvocationRequest) -> Result<EventStream> {
        self.open_stream(request, &Guard::default()).await
    }

    async fn open_stream(&self, request: &InvocationRequest, guard: &Guard) -> Result<EventStream> {
        tracing::info!(url = %self.run_url, depth = request.depth(), "dispatching workflow");

        let send = self
            .http
            .post(&self.run_url)
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .json(&RunBody::new(request, &self.user))
            .send();
        let response = guard.run(send).await??;

        let status = response.status();
        if !status.is_success() {
            let body = guard.run(response.text()).await??;
            tracing::warn!(status = %status, body = %body, "workflow request rejected");
            return Err(WorkflowError::Http {
                status: status.as_u16(),
                body,
            });
        }

        if status == StatusCode::NO_CONTENT || response.content_length() == Some(0) {
            return Err(WorkflowError::NoResponseBody);
        }

        Ok(EventStream::new(response.bytes_stream()))
    }
}

impl std::fmt::Debug for WorkflowClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowClient")
            .field("run_url", &self.run_url)
            .field("user", &self.user)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
