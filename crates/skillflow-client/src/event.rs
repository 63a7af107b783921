use serde::Deserialize;
use serde_json::Value;

use crate::types::{EventKind, StreamEvent, WorkflowOutputs};
use crate::WorkflowError;

/// Prefix marking an event-bearing frame.
pub const DATA_PREFIX: &str = "data:";

/// End-of-stream sentinel sent after the last event.
pub const DONE_SENTINEL: &str = "[DONE]";

// ─── Wire shapes ──────────────────────────────────────────────────────────

/// One JSON event object as sent by the workflow service.
///
/// `data` stays untyped here because its shape depends on `event`; only the
/// recognised kinds are decoded further. The run id is untyped as well so an
/// unexpected value never costs the rest of the event.
#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(default)]
    event: Option<String>,
    #[serde(default)]
    workflow_run_id: Option<Value>,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Default, Deserialize)]
struct NodeData {
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FinishedData {
    #[serde(default)]
    outputs: Option<RawOutputs>,
}

/// Output fields are decoded one by one: a malformed sibling must not take
/// a valid one down with it.
#[derive(Debug, Default, Deserialize)]
struct RawOutputs {
    #[serde(default)]
    analysis: Value,
    #[serde(default)]
    guide: Value,
}

impl From<RawOutputs> for WorkflowOutputs {
    fn from(raw: RawOutputs) -> Self {
        Self {
            analysis: output_text(raw.analysis),
            guide: output_text(raw.guide),
        }
    }
}

// ─── Extraction ───────────────────────────────────────────────────────────

/// Interpret one complete frame.
///
/// Returns `None` for anything that is not a `data:` frame, for empty
/// payloads, for the `[DONE]` sentinel and for payloads that fail to parse.
/// A bad frame never stops the stream; it is logged and dropped.
pub fn extract_event(frame: &str) -> Option<StreamEvent> {
    let payload = frame.strip_prefix(DATA_PREFIX)?.trim();
    if payload.is_empty() || payload == DONE_SENTINEL {
        return None;
    }

    match parse_event(payload) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::debug!(error = %e, "dropping malformed stream frame");
            None
        }
    }
}

/// Parse the JSON payload of a `data:` frame into a [`StreamEvent`].
pub fn parse_event(payload: &str) -> Result<StreamEvent, WorkflowError> {
    let raw: RawEvent = serde_json::from_str(payload).map_err(|source| WorkflowError::Parse {
        line: truncate(payload, 200).to_owned(),
        source,
    })?;

    let event = raw.event.unwrap_or_default();
    let kind = match event.as_str() {
        "node_started" => EventKind::NodeStarted {
            title: node_title(raw.data),
        },
        "node_finished" => EventKind::NodeFinished {
            title: node_title(raw.data),
        },
        "workflow_finished" => EventKind::WorkflowFinished {
            outputs: serde_json::from_value::<FinishedData>(raw.data)
                .unwrap_or_default()
                .outputs
                .map(WorkflowOutputs::from)
                .unwrap_or_default(),
        },
        _ => EventKind::Other { event },
    };

    let run_id = match raw.workflow_run_id {
        Some(Value::String(id)) if !id.is_empty() => Some(id),
        Some(Value::String(_)) | Some(Value::Null) | None => None,
        Some(other) => {
            tracing::debug!(run_id = %other, "ignoring non-string workflow_run_id");
            None
        }
    };

    Ok(StreamEvent { run_id, kind })
}

/// Strings pass through, null means absent, anything else keeps its JSON text.
fn output_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn node_title(data: Value) -> String {
    serde_json::from_value::<NodeData>(data)
        .unwrap_or_default()
        .title
        .unwrap_or_default()
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

// ─── Tests ────────────────────────────────────────────────────────────────
