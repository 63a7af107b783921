use std::sync::Arc;

use crate::types::{EventKind, StreamEvent};

// ─── Progress ─────────────────────────────────────────────────────────────

/// Lifecycle transitions surfaced to an optional observer, for UI feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    NodeStarted { title: String },
    NodeFinished { title: String },
    WorkflowFinished { run_id: String },
}

/// Callback invoked for every [`Progress`] transition.
pub type ProgressHandler = Arc<dyn Fn(&Progress) + Send + Sync>;

// ─── Snapshot ─────────────────────────────────────────────────────────────

/// Accumulated state of one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Last non-empty run identifier seen; empty until one arrives.
    pub run_id: String,
    pub analysis: String,
    pub guide: String,
    /// Number of `workflow_finished` events observed.
    pub terminal_events: u32,
}

impl Snapshot {
    pub fn has_outputs(&self) -> bool {
        !self.analysis.is_empty() || !self.guide.is_empty()
    }
}

// ─── LifecycleTracker ─────────────────────────────────────────────────────

/// Folds the event stream into a [`Snapshot`]. Has no failure modes.
#[derive(Default)]
pub struct LifecycleTracker {
    snapshot: Snapshot,
    observer: Option<ProgressHandler>,
}

impl LifecycleTracker {
    pub fn new(observer: Option<ProgressHandler>) -> Self {
        Self {
            snapshot: Snapshot::default(),
            observer,
        }
    }

    pub fn apply(&mut self, event: StreamEvent) {
        if let Some(run_id) = event.run_id.filter(|id| !id.is_empty()) {
            self.snapshot.run_id = run_id;
        }

        match event.kind {
            EventKind::NodeStarted { title } => self.notify(Progress::NodeStarted { title }),
            EventKind::NodeFinished { title } => self.notify(Progress::NodeFinished { title }),
            EventKind::WorkflowFinished { outputs } => {
                self.snapshot.terminal_events += 1;
                if self.snapshot.terminal_events > 1 {
                    // Later terminal events still replace the outputs.
                    tracing::warn!(
                        run_id = %self.snapshot.run_id,
                        count = self.snapshot.terminal_events,
                        "received more than one workflow_finished event"
                    );
                }
                self.snapshot.analysis = outputs.analysis.unwrap_or_default();
                self.snapshot.guide = outputs.guide.unwrap_or_default();
                self.notify(Progress::WorkflowFinished {
                    run_id: self.snapshot.run_id.clone(),
                });
            }
            EventKind::Other { .. } => {}
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn into_snapshot(self) -> Snapshot {
        self.snapshot
    }

    fn notify(&self, progress: Progress) {
        if let Some(observer) = &self.observer {
            observer(&progress);
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
