use std::time::Duration;

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use tracing::info;

/// Record of one request/response exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub received_at: DateTime<Utc>,
    pub method: String,
    pub url: String,
    pub protocol: String,
    pub user_agent: String,
    pub referer: String,
    pub remote_ip: String,
    pub server_ip: String,
    pub request_header_size: u64,
    pub request_body_size: u64,
    pub status: u16,
    pub response_header_size: u64,
    pub response_body_size: u64,
    pub latency: Duration,
}

impl Default for LogEntry {
    fn default() -> Self {
        Self {
            received_at: Utc::now(),
            method: String::new(),
            url: String::new(),
            protocol: String::new(),
            user_agent: String::new(),
            referer: String::new(),
            remote_ip: String::new(),
            server_ip: String::new(),
            request_header_size: 0,
            request_body_size: 0,
            // a handler that never sets a status answers 200
            status: 200,
            response_header_size: 0,
            response_body_size: 0,
            latency: Duration::ZERO,
        }
    }
}

/// Bytes the header block takes on the wire: `name: value\r\n` per header
/// plus the blank line
pub fn header_size(headers: &HeaderMap) -> u64 {
    let fields: usize = headers
        .iter()
        .map(|(name, value)| name.as_str().len() + 2 + value.len() + 2)
        .sum();
    (fields + 2) as u64
}

/// Where finished entries go
pub trait LogSink: Send + Sync {
    fn emit(&self, entry: LogEntry);
}

/// Emits each entry as one `requestlog` INFO event
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, entry: LogEntry) {
        info!(
            target: "requestlog",
            received_at = %entry.received_at.to_rfc3339(),
            method = %entry.method,
            url = %entry.url,
            protocol = %entry.protocol,
            user_agent = %entry.user_agent,
            referer = %entry.referer,
            remote_ip = %entry.remote_ip,
            server_ip = %entry.server_ip,
            request_header_size = entry.request_header_size,
            request_body_size = entry.request_body_size,
            status = entry.status,
            response_header_size = entry.response_header_size,
            response_body_size = entry.response_body_size,
            latency_ms = entry.latency.as_secs_f64() * 1000.0,
            "{} {} {}",
            entry.method,
            entry.url,
            entry.status
        );
    }
}
