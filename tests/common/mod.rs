#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::oneshot};

use newsletter_api::config::AppConfig;
use newsletter_api::database::memory::{
    MemoryNewsletterStore, MemorySubscriptionStore, MemoryUserStore,
};
use newsletter_api::email::{Email, EmailError, Mailer};
use newsletter_api::requestlog::{LogEntry, LogSink};
use newsletter_api::server;
use newsletter_api::state::AppState;

/// Keeps every email instead of sending it
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<Email>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &Email) -> Result<(), EmailError> {
        self.sent.lock().push(email.clone());
        Ok(())
    }
}

/// Keeps every request log entry
#[derive(Default)]
pub struct CapturingSink {
    pub entries: Mutex<Vec<LogEntry>>,
}

impl LogSink for CapturingSink {
    fn emit(&self, entry: LogEntry) {
        self.entries.lock().push(entry);
    }
}

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
    pub mailer: Arc<RecordingMailer>,
    pub log: Arc<CapturingSink>,
    pub subscriptions: Arc<MemorySubscriptionStore>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

pub fn test_config() -> Result<AppConfig> {
    let vars: HashMap<String, String> = [
        ("SERVER_MAJOR", "1"),
        ("SERVER_MINOR", "0"),
        ("SERVER_PORT", "0"),
        ("SERVER_DEBUG", "true"),
        ("API_SECRET", "integration-secret"),
        ("SERVER_TIMEOUT_READ", "5s"),
        ("SERVER_TIMEOUT_WRITE", "5s"),
        ("SERVER_TIMEOUT_IDLE", "1s"),
        ("DB_DRIVER", "memory"),
        ("EMAIL_PROVIDER", "log"),
        ("SEND_FROM_NAME", "Newsletter"),
        ("SEND_FROM_ADDRESS", "news@example.com"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    Ok(AppConfig::from_map(&vars)?)
}

/// Start an isolated in-process server on a free port
pub async fn spawn_app() -> Result<TestServer> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = TcpListener::bind(("127.0.0.1", port)).await?;

    let mailer = Arc::new(RecordingMailer::default());
    let log = Arc::new(CapturingSink::default());
    let subscriptions = Arc::new(MemorySubscriptionStore::new());

    let state = AppState::new(
        test_config()?,
        Arc::new(MemoryUserStore::new()),
        Arc::new(MemoryNewsletterStore::new()),
        subscriptions.clone(),
        mailer.clone(),
    );

    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(server::serve(listener, state, log.clone(), async move {
        let _ = rx.await;
    }));

    let server = TestServer {
        port,
        base_url: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
        mailer,
        log,
        subscriptions,
        shutdown: Some(tx),
    };
    server.wait_ready(Duration::from_secs(5)).await?;
    Ok(server)
}

impl TestServer {
    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(format!("{}/live", self.base_url)).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn api(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    /// Register an account and return its token
    pub async fn register(&self, email: &str, password: &str) -> Result<String> {
        let res = self
            .client
            .post(self.api("/register"))
            .json(&json!({
                "firstname": "Test",
                "lastname": "User",
                "email": email,
                "password": password,
            }))
            .send()
            .await?;
        anyhow::ensure!(
            res.status() == StatusCode::CREATED,
            "register returned {}",
            res.status()
        );
        Ok(res.json::<String>().await?)
    }

    /// Create a newsletter as the token's owner and return its JSON
    pub async fn create_newsletter(&self, token: &str, name: &str) -> Result<Value> {
        let res = self
            .client
            .post(self.api("/newsletters"))
            .bearer_auth(token)
            .json(&json!({ "name": name, "description": "about things" }))
            .send()
            .await?;
        anyhow::ensure!(
            res.status() == StatusCode::CREATED,
            "create newsletter returned {}",
            res.status()
        );
        Ok(res.json::<Value>().await?)
    }

    /// Wait until `count` log entries have been emitted
    pub async fn log_entries(&self, count: usize) -> Vec<LogEntry> {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            let entries = self.log.entries.lock().clone();
            if entries.len() >= count || Instant::now() > deadline {
                return entries;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }
}
