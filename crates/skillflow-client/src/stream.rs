use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::{Stream, StreamExt};

use crate::event::extract_event;
use crate::frame::FrameReassembler;
use crate::types::StreamEvent;
use crate::{Result, WorkflowError};

type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

// ─── EventStream ──────────────────────────────────────────────────────────

/// An async stream of [`StreamEvent`]s decoded from a raw response body.
///
/// Each chunk pulled from the body is fed through a [`FrameReassembler`];
/// every completed frame goes through [`extract_event`], and the events it
/// yields are queued and handed out in order. Frames that are not events
/// (blank lines, comments, `[DONE]`, malformed JSON) produce nothing.
///
/// A transport error is yielded once as `Err` and ends the stream.
///
/// ```rust,ignore
/// use futures::StreamExt;
///
/// let mut events = EventStream::new(response.bytes_stream());
/// while let Some(event) = events.next().await {
///     println!("{:?}", event?);
/// }
/// ```
pub struct EventStream {
    inner: ByteStream,
    reassembler: FrameReassembler,
    pending: VecDeque<StreamEvent>,
    done: bool,
}

impl EventStream {
    pub fn new<S, E>(byte_stream: S) -> Self
    where
        S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
        E: Into<WorkflowError>,
    {
        Self {
            inner: Box::pin(byte_stream.map(|chunk| chunk.map_err(Into::into))),
            reassembler: FrameReassembler::new(),
            pending: VecDeque::new(),
            done: false,
        }
    }

    fn absorb(&mut self, chunk: &[u8]) {
        for frame in self.reassembler.push(chunk) {
            if let Some(event) = extract_event(&frame) {
                self.pending.push_back(event);
            }
        }
    }

    fn close(&mut self) {
        self.done = true;
        let dropped = std::mem::take(&mut self.reassembler).finish();
        if dropped > 0 {
            tracing::debug!(bytes = dropped, "discarding unterminated trailing frame");
        }
    }
}

impl Stream for EventStream {
    type Item = Result<StreamEvent>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if let Some(event) = this.pending.pop_front() {
                return Poll::Ready(Some(Ok(event)));
            }
            if this.done {
                return Poll::Ready(None);
            }

            match this.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => this.absorb(&chunk),
                Poll::Ready(Some(Err(e))) => {
                    this.close();
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Ready(None) => this.close(),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
