//! Structured request logging.
//!
//! [`RequestLogLayer`] wraps the whole application and emits exactly one
//! [`LogEntry`] per exchange once the response body has been sent (or
//! dropped). It only observes: bodies pass through unchanged, with their size
//! hints, and logging never fails a request.

mod body;
mod entry;

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{
        header::{REFERER, USER_AGENT},
        HeaderMap, HeaderName, Request, Response,
    },
};
use chrono::Utc;
use tower::{Layer, Service};
use tracing::debug;

pub use body::{CountingBody, ResponseBody, Tally};
pub use entry::{header_size, LogEntry, LogSink, TracingSink};

use body::Pending;

/// Most unread request body bytes read after the handler returns
pub const MAX_DRAIN_BYTES: u64 = 1024 * 1024;

/// How long the unread remainder may take to arrive unless configured
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct RequestLogLayer {
    sink: Arc<dyn LogSink>,
    server_ip: Option<String>,
    drain_timeout: Duration,
}

impl RequestLogLayer {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            server_ip: None,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }

    /// Bound on reading the body remainder a handler left unread
    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// Address of the bound listener, reported as the server ip
    pub fn with_server_addr(mut self, addr: SocketAddr) -> Self {
        self.server_ip = Some(addr.ip().to_string());
        self
    }
}

impl<S> Layer<S> for RequestLogLayer {
    type Service = RequestLog<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestLog {
            inner,
            sink: self.sink.clone(),
            server_ip: self.server_ip.clone(),
            drain_timeout: self.drain_timeout,
        }
    }
}

#[derive(Clone)]
pub struct RequestLog<S> {
    inner: S,
    sink: Arc<dyn LogSink>,
    server_ip: Option<String>,
    drain_timeout: Duration,
}

impl<S> Service<Request<Body>> for RequestLog<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
    S::Error: Send + 'static,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let started = Instant::now();
        let mut entry = LogEntry {
            received_at: Utc::now(),
            ..LogEntry::default()
        };

        entry.method = request.method().to_string();
        entry.url = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| request.uri().path().to_string());
        entry.protocol = format!("{:?}", request.version());
        entry.user_agent = header_text(request.headers(), &USER_AGENT);
        entry.referer = header_text(request.headers(), &REFERER);
        entry.remote_ip = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_default();
        entry.server_ip = self.server_ip.clone().unwrap_or_default();
        entry.request_header_size = header_size(request.headers());

        let (parts, body) = request.into_parts();
        let tally = Tally::new(body);
        let request = Request::from_parts(parts, Body::new(CountingBody::new(tally.clone())));

        // clone-swap so the service that was polled ready is the one called
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let sink = self.sink.clone();
        let drain_timeout = self.drain_timeout;

        Box::pin(async move {
            let result = inner.call(request).await;
            entry.request_body_size =
                match tokio::time::timeout(drain_timeout, tally.drain(MAX_DRAIN_BYTES)).await {
                    Ok(total) => total,
                    Err(_) => {
                        debug!("request body stalled after {:?}; logging bytes read", drain_timeout);
                        tally.counted()
                    }
                };

            match result {
                Ok(response) => {
                    entry.status = response.status().as_u16();
                    entry.response_header_size = header_size(response.headers());

                    let (parts, body) = response.into_parts();
                    let body = ResponseBody::new(
                        body,
                        Pending {
                            entry,
                            sink,
                            started,
                        },
                    );
                    Ok(Response::from_parts(parts, Body::new(body)))
                }
                Err(e) => {
                    entry.latency = started.elapsed();
                    sink.emit(entry);
                    Err(e)
                }
            }
        })
    }
}

fn header_text(headers: &HeaderMap, name: &HeaderName) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
