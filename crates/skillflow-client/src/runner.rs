use std::future::Future;
use std::time::Duration;

use futures::{Stream, StreamExt};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::tracker::{LifecycleTracker, ProgressHandler, Snapshot};
use crate::types::{InvocationResult, ResultData, ResultMetadata, StreamEvent};
use crate::{Result, WorkflowError};

// ─── Guard ────────────────────────────────────────────────────────────────

/// Cancellation token and overall deadline for one invocation.
///
/// Every await on the network (the dispatch and each chunk read) goes
/// through [`Guard::run`], so an unresponsive stream cannot hang the task.
#[derive(Debug, Clone, Default)]
pub(crate) struct Guard {
    cancel: Option<CancellationToken>,
    deadline: Option<(Instant, Duration)>,
}

impl Guard {
    pub(crate) fn new(
        cancel: Option<CancellationToken>,
        timeout: Option<Duration>,
        started: Instant,
    ) -> Self {
        Self {
            cancel,
            deadline: timeout.map(|limit| (started + limit, limit)),
        }
    }

    /// Await `fut` unless the token fires or the deadline passes first.
    pub(crate) async fn run<F: Future>(&self, fut: F) -> Result<F::Output> {
        let cancelled = async {
            match &self.cancel {
                Some(token) => token.cancelled().await,
                None => std::future::pending().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some((at, limit)) => {
                    tokio::time::sleep_until(at).await;
                    limit
                }
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancelled => Err(WorkflowError::Cancelled),
            limit = expired => Err(WorkflowError::Timeout(limit)),
            out = fut => Ok(out),
        }
    }
}

// ─── Aggregation ──────────────────────────────────────────────────────────

/// Build the terminal result from the final snapshot.
///
/// A stream that closed cleanly without any outputs is a domain failure,
/// not a transport one.
pub fn aggregate(snapshot: Snapshot, elapsed: Duration) -> InvocationResult {
    if !snapshot.has_outputs() {
        return InvocationResult::from_error(WorkflowError::EmptyResult);
    }

    InvocationResult::Success {
        data: ResultData {
            analysis: snapshot.analysis,
            guide: snapshot.guide,
        },
        metadata: ResultMetadata {
            duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            run_id: snapshot.run_id,
        },
    }
}

// ─── Internal ─────────────────────────────────────────────────────────────

/// Drain `events` into `tracker` until the stream ends.
///
/// Returns the first transport error, cancellation or timeout.
pub(crate) async fn collect<S>(
    mut events: S,
    tracker: &mut LifecycleTracker,
    guard: &Guard,
) -> Result<()>
where
    S: Stream<Item = Result<StreamEvent>> + Unpin,
{
    while let Some(event) = guard.run(events.next()).await? {
        tracker.apply(event?);
    }
    Ok(())
}

/// Consume an event stream to its end and turn it into the final result.
pub(crate) async fn consume<S>(
    events: S,
    observer: Option<ProgressHandler>,
    guard: &Guard,
    started: Instant,
) -> InvocationResult
where
    S: Stream<Item = Result<StreamEvent>> + Unpin,
{
    let mut tracker = LifecycleTracker::new(observer);
    if let Err(e) = collect(events, &mut tracker, guard).await {
        tracing::warn!(error = %e, run_id = %tracker.snapshot().run_id, "workflow stream failed");
        return InvocationResult::from_error(e);
    }

    let snapshot = tracker.into_snapshot();
    let result = aggregate(snapshot, started.elapsed());
    match &result {
        InvocationResult::Success { metadata, .. } => tracing::info!(
            run_id = %metadata.run_id,
            duration_ms = metadata.duration_ms,
            "workflow completed"
        ),
        InvocationResult::Failure { error } => tracing::warn!(%error, "workflow produced no outputs"),
    }
    result
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EventKind, WorkflowOutputs};

    fn started(title: &str) -> Result<StreamEvent> {
        Ok(StreamEvent {
            run_id: Some("run-7".into()),
            kind: EventKind::NodeStarted {
                title: title.into(),
            },
        })
    }

    fn node_finished(title: &str) -> Result<StreamEvent> {
        Ok(StreamEvent {
            run_id: None,
            kind: EventKind::NodeFinished {
                title: title.into(),
            },
        })
    }

    fn finished(analysis: &str, guide: &str) -> Result<StreamEvent> {
        Ok(StreamEvent {
            run_id: None,
            kind: EventKind::WorkflowFinished {
                outputs: WorkflowOutputs {
                    analysis: Some(analysis.into()),
                    guide: Some(guide.into()),
                },
            },
        })
    }

    async fn run_events(events: Vec<Result<StreamEvent>>) -> InvocationResult {
        consume(
            futures::stream::iter(events),
            None,
            &Guard::default(),
            Instant::now(),
        )
        .await
    }

    #[test]
    fn aggregate_empty_snapshot_is_domain_failure() {
        let result = aggregate(Snapshot::default(), Duration::from_millis(5));
        assert_eq!(
            result.error(),
            Some("workflow completed but no outputs received")
        );
    }

    #[test]
    fn aggregate_carries_duration_and_run_id() {
        let snapshot = Snapshot {
            run_id: "r1".into(),
            analysis: "A".into(),
            guide: String::new(),
            terminal_events: 1,
        };
        let result = aggregate(snapshot, Duration::from_millis(1234));
        let metadata = result.metadata().unwrap();
        assert_eq!(metadata.duration_ms, 1234);
        assert_eq!(metadata.run_id, "r1");
        assert_eq!(result.data().unwrap().analysis, "A");
    }

    #[tokio::test]
    async fn consume_success_returns_outputs() {
        let result = run_events(vec![started("Search"), finished("A", "G")]).await;
        assert!(result.is_success());
        let data = result.data().unwrap();
        assert_eq!(data.analysis, "A");
        assert_eq!(data.guide, "G");
        assert_eq!(result.metadata().unwrap().run_id, "run-7");
    }

    #[tokio::test]
    async fn consume_progress_only_is_empty_failure() {
        let result = run_events(vec![started("Search"), node_finished("Search")]).await;
        assert_eq!(
            result.error(),
            Some("workflow completed but no outputs received")
        );
    }

    #[tokio::test]
    async fn consume_transport_error_discards_partial_outputs() {
        let result = run_events(vec![
            finished("A", "G"),
            Err(WorkflowError::Transport("broken pipe".into())),
        ])
        .await;
        assert_eq!(result.error(), Some("workflow invocation failed: broken pipe"));
    }

    #[tokio::test]
    async fn cancelled_token_stops_a_silent_stream() {
        let token = CancellationToken::new();
        token.cancel();
        let guard = Guard::new(Some(token), None, Instant::now());
        let result = consume(
            futures::stream::pending::<Result<StreamEvent>>(),
            None,
            &guard,
            Instant::now(),
        )
        .await;
        assert_eq!(result.error(), Some("workflow invocation cancelled"));
    }

    #[tokio::test]
    async fn deadline_stops_a_silent_stream() {
        let now = Instant::now();
        let guard = Guard::new(None, Some(Duration::from_millis(20)), now);
        let result = consume(
            futures::stream::pending::<Result<StreamEvent>>(),
            None,
            &guard,
            now,
        )
        .await;
        assert_eq!(
            result.error(),
            Some("workflow invocation timed out after 20ms")
        );
    }

    #[tokio::test]
    async fn guard_passes_through_ready_futures() {
        let guard = Guard::new(
            Some(CancellationToken::new()),
            Some(Duration::from_secs(5)),
            Instant::now(),
        );
        assert_eq!(guard.run(async { 7 }).await.unwrap(), 7);
    }
}
