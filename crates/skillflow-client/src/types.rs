use serde::{Serialize, Serializer};

use crate::{Result, WorkflowError};

pub const MIN_DEPTH: u8 = 1;
pub const MAX_DEPTH: u8 = 5;
pub const DEFAULT_DEPTH: u8 = 3;

// ─── InvocationRequest ────────────────────────────────────────────────────

/// Inputs to a single workflow run.
///
/// Built once per call and immutable afterwards. `depth` is clamped into
/// `[MIN_DEPTH, MAX_DEPTH]` when set; out-of-range values are never rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    task: String,
    context: String,
    depth: u8,
}

impl InvocationRequest {
    /// Create a request for `task`. Fails if the task is empty or whitespace.
    pub fn new(task: impl Into<String>) -> Result<Self> {
        let task = task.into();
        if task.trim().is_empty() {
            return Err(WorkflowError::InvalidRequest("task must not be empty".into()));
        }
        Ok(Self {
            task,
            context: String::new(),
            depth: DEFAULT_DEPTH,
        })
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn with_depth(mut self, depth: i64) -> Self {
        self.depth = clamp_depth(depth);
        self
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    /// The depth that will be transmitted, always within range.
    pub fn depth(&self) -> u8 {
        self.depth
    }
}

/// `max(MIN_DEPTH, min(MAX_DEPTH, depth))`.
pub fn clamp_depth(depth: i64) -> u8 {
    depth.clamp(i64::from(MIN_DEPTH), i64::from(MAX_DEPTH)) as u8
}

// ─── StreamEvent ──────────────────────────────────────────────────────────

/// One parsed unit from the live event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEvent {
    /// Run identifier, when the frame carried a non-empty one.
    pub run_id: Option<String>,
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// `node_started` — a workflow stage began.
    NodeStarted { title: String },
    /// `node_finished` — a workflow stage completed.
    NodeFinished { title: String },
    /// `workflow_finished` — terminal event carrying the final payload.
    WorkflowFinished { outputs: WorkflowOutputs },
    /// Any other event type (`workflow_started`, `ping`, ...). Safe to ignore.
    Other { event: String },
}

impl StreamEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, EventKind::WorkflowFinished { .. })
    }
}

/// Final outputs of a workflow run. Either field may be absent on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowOutputs {
    pub analysis: Option<String>,
    pub guide: Option<String>,
}

// ─── InvocationResult ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultData {
    pub analysis: String,
    pub guide: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetadata {
    pub duration_ms: u64,
    pub run_id: String,
}

/// Terminal outcome of one invocation; the sole return value of
/// [`WorkflowClient::invoke`](crate::WorkflowClient::invoke).
///
/// Serializes as `{"success": true, "data": {...}, "metadata": {...}}` or
/// `{"success": false, "error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationResult {
    Success {
        data: ResultData,
        metadata: ResultMetadata,
    },
    Failure {
        error: String,
    },
}

impl InvocationResult {
    /// Convert any error raised while dispatching or streaming into a
    /// failure carrying its display text.
    pub fn from_error(err: WorkflowError) -> Self {
        InvocationResult::Failure {
            error: err.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, InvocationResult::Success { .. })
    }

    pub fn data(&self) -> Option<&ResultData> {
        match self {
            InvocationResult::Success { data, .. } => Some(data),
            InvocationResult::Failure { .. } => None,
        }
    }

    pub fn metadata(&self) -> Option<&ResultMetadata> {
        match self {
            InvocationResult::Success { metadata, .. } => Some(metadata),
            InvocationResult::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            InvocationResult::Success { .. } => None,
            InvocationResult::Failure { error } => Some(error),
        }
    }
}

impl From<WorkflowError> for InvocationResult {
    fn from(err: WorkflowError) -> Self {
        InvocationResult::from_error(err)
    }
}

#[derive(Serialize)]
struct ResultWire<'a> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a ResultData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a ResultMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl Serialize for InvocationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        ResultWire {
            success: self.is_success(),
            data: self.data(),
            metadata: self.metadata(),
            error: self.error(),
        }
        .serialize(serializer)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
