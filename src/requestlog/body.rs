use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::body::Body;
use bytes::Bytes;
use http_body::{Body as HttpBody, Frame, SizeHint};
use http_body_util::BodyExt;
use parking_lot::Mutex;

use super::entry::{LogEntry, LogSink};

/// Shared count of request body bytes
///
/// The real body lives here rather than in the request, so the layer can
/// read whatever the handler left behind once it has returned.
pub struct Tally {
    body: Mutex<Option<Body>>,
    bytes: AtomicU64,
}

impl Tally {
    pub fn new(body: Body) -> Arc<Self> {
        Arc::new(Self {
            body: Mutex::new(Some(body)),
            bytes: AtomicU64::new(0),
        })
    }

    /// Read and count the unread remainder, then report the total
    ///
    /// Stops once `limit` more bytes have been read; the total then covers
    /// only what actually came off the wire.
    pub async fn drain(&self, limit: u64) -> u64 {
        let rest = self.body.lock().take();

        if let Some(mut body) = rest {
            let mut drained = 0u64;
            while drained < limit {
                match body.frame().await {
                    Some(Ok(frame)) => {
                        if let Some(data) = frame.data_ref() {
                            drained += data.len() as u64;
                            self.bytes.fetch_add(data.len() as u64, Ordering::Relaxed);
                        }
                    }
                    Some(Err(_)) | None => break,
                }
            }
        }

        self.counted()
    }

    /// Bytes read so far
    pub fn counted(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }
}

/// Request body handed to the inner service
pub struct CountingBody {
    tally: Arc<Tally>,
}

impl CountingBody {
    pub fn new(tally: Arc<Tally>) -> Self {
        Self { tally }
    }
}

impl HttpBody for CountingBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let mut guard = self.tally.body.lock();
        let Some(body) = guard.as_mut() else {
            return Poll::Ready(None);
        };

        let polled = Pin::new(body).poll_frame(cx);
        if let Poll::Ready(Some(Ok(frame))) = &polled {
            if let Some(data) = frame.data_ref() {
                self.tally
                    .bytes
                    .fetch_add(data.len() as u64, Ordering::Relaxed);
            }
        }
        polled
    }

    fn is_end_stream(&self) -> bool {
        self.tally
            .body
            .lock()
            .as_ref()
            .map_or(true, HttpBody::is_end_stream)
    }

    fn size_hint(&self) -> SizeHint {
        self.tally
            .body
            .lock()
            .as_ref()
            .map_or_else(|| SizeHint::with_exact(0), HttpBody::size_hint)
    }
}

/// Entry waiting for the response body to finish
pub(crate) struct Pending {
    pub entry: LogEntry,
    pub sink: Arc<dyn LogSink>,
    pub started: Instant,
}

/// Response body that counts what it streams and emits the log entry once:
/// at end of stream, on error, or when dropped unfinished
pub struct ResponseBody {
    inner: Body,
    sent: u64,
    pending: Option<Pending>,
}

impl ResponseBody {
    pub(crate) fn new(inner: Body, pending: Pending) -> Self {
        Self {
            inner,
            sent: 0,
            pending: Some(pending),
        }
    }

    fn finish(&mut self) {
        if let Some(Pending {
            mut entry,
            sink,
            started,
        }) = self.pending.take()
        {
            entry.response_body_size = self.sent;
            entry.latency = started.elapsed();
            sink.emit(entry);
        }
    }
}

impl HttpBody for ResponseBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let polled = Pin::new(&mut self.inner).poll_frame(cx);
        match &polled {
            Poll::Ready(Some(Ok(frame))) => {
                if let Some(data) = frame.data_ref() {
                    self.sent += data.len() as u64;
                }
            }
            Poll::Ready(Some(Err(_))) | Poll::Ready(None) => self.finish(),
            Poll::Pending => {}
        }
        polled
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl Drop for ResponseBody {
    fn drop(&mut self) {
        self.finish();
    }
}
