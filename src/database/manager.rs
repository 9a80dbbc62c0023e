use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    ConnectOptions, PgPool,
};
use thiserror::Error;
use tracing::info;

use crate::config::RdbmsConfig;

/// Errors from the relational and document stores
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Remote store error: {0}")]
    Remote(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl DatabaseError {
    /// Unique constraint violations surface as `Conflict`
    pub(crate) fn from_insert(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                DatabaseError::Conflict(db.message().to_string())
            }
            _ => DatabaseError::Sqlx(e),
        }
    }
}

/// Owns the relational connection pool
#[derive(Clone)]
pub struct DatabaseManager {
    pool: PgPool,
}

impl DatabaseManager {
    /// Open the bounded pool described by `config`
    pub async fn connect(config: &RdbmsConfig) -> Result<Self, DatabaseError> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.username)
            .password(&config.password)
            .database(&config.db_name);

        // statement logging only in debug mode
        let options = if config.debug {
            options
        } else {
            options.disable_statement_logging()
        };

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connection_pool)
            .min_connections(config.max_idle_connections.min(config.max_connection_pool))
            .max_lifetime(config.connections_max_lifetime)
            .connect_with(options)
            .await?;

        info!(
            "Created database pool for {}@{}:{}/{}",
            config.username, config.host, config.port, config.db_name
        );
        Ok(Self { pool })
    }

    pub fn pool(&self) -> PgPool {
        self.pool.clone()
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the pool (on shutdown)
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }
}
