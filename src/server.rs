use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use thiserror::Error;
use tokio::{net::TcpListener, signal, sync::oneshot};
use tracing::{error, info, warn};

use crate::config::{AppConfig, DatabaseConfig, EmailProvider};
use crate::database::{
    firebase::FirebaseSubscriptionStore,
    memory::{MemoryNewsletterStore, MemorySubscriptionStore, MemoryUserStore},
    postgres::{PgNewsletterStore, PgUserStore},
    DatabaseError, DatabaseManager,
};
use crate::email::{LogMailer, Mailer, SendGridMailer};
use crate::requestlog::{LogSink, RequestLogLayer};
use crate::routes;
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("http client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Shared state plus the pool that has to be closed on shutdown
pub struct Runtime {
    pub state: AppState,
    pub database: Option<DatabaseManager>,
}

/// Build the stores and mailer selected by `config`
pub async fn build_runtime(config: AppConfig) -> Result<Runtime, ServerError> {
    let http = reqwest::Client::builder()
        .timeout(config.server.timeout_write)
        .build()?;

    let mailer: Arc<dyn Mailer> = match &config.email.provider {
        EmailProvider::SendGrid { api_key } => Arc::new(SendGridMailer::new(http.clone(), api_key)),
        EmailProvider::Log => Arc::new(LogMailer),
    };

    let runtime = match &config.database {
        DatabaseConfig::Postgres { rdbms, firebase } => {
            let database = DatabaseManager::connect(rdbms).await?;
            database.health_check().await?;
            let subscriptions = FirebaseSubscriptionStore::new(http, firebase)?;

            Runtime {
                state: AppState::new(
                    config.clone(),
                    Arc::new(PgUserStore::new(database.pool())),
                    Arc::new(PgNewsletterStore::new(database.pool())),
                    Arc::new(subscriptions),
                    mailer,
                ),
                database: Some(database),
            }
        }
        DatabaseConfig::Memory => {
            warn!("Using in-memory stores; data is lost on restart");
            Runtime {
                state: AppState::new(
                    config.clone(),
                    Arc::new(MemoryUserStore::new()),
                    Arc::new(MemoryNewsletterStore::new()),
                    Arc::new(MemorySubscriptionStore::new()),
                    mailer,
                ),
                database: None,
            }
        }
    };

    Ok(runtime)
}

pub async fn bind(port: u16) -> Result<TcpListener, ServerError> {
    let bind_addr = SocketAddr::from(([0, 0, 0, 0], port));
    TcpListener::bind(bind_addr)
        .await
        .map_err(|source| ServerError::Bind { port, source })
}

/// Serve `state` on `listener` until `shutdown` resolves, then give
/// in-flight requests up to the idle timeout to finish
pub async fn serve<F>(
    listener: TcpListener,
    state: AppState,
    sink: Arc<dyn LogSink>,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local_addr = listener.local_addr()?;
    let grace = state.config.server.timeout_idle;
    let request_log = RequestLogLayer::new(sink)
        .with_server_addr(local_addr)
        .with_drain_timeout(state.config.server.timeout_read);
    let app = routes::app(state, request_log);

    info!("Newsletter API listening on http://{}", local_addr);
    run_until(listener, app, grace, shutdown).await
}

async fn run_until<F>(
    listener: TcpListener,
    app: Router,
    grace: Duration,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        let _ = stop_rx.await;
    });
    let mut server = tokio::spawn(server.into_future());

    tokio::select! {
        finished = &mut server => return flatten(finished),
        _ = shutdown => {
            info!("Stopping listener, draining in-flight requests for up to {:?}", grace);
            let _ = stop_tx.send(());
        }
    }

    match tokio::time::timeout(grace, &mut server).await {
        Ok(finished) => flatten(finished),
        Err(_) => {
            warn!("In-flight requests still running after {:?}; aborting", grace);
            server.abort();
            Ok(())
        }
    }
}

fn flatten(
    finished: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), ServerError> {
    match finished {
        Ok(result) => Ok(result?),
        Err(e) => Err(ServerError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            e,
        ))),
    }
}

/// Resolves on Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
