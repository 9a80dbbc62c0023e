use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use newsletter_api::config::{AppConfig, DatabaseConfig};
use newsletter_api::requestlog::TracingSink;
use newsletter_api::server;

#[derive(Parser)]
#[command(name = "newsletter-api")]
#[command(about = "Newsletter platform API server")]
#[command(version)]
struct Cli {
    #[arg(long, help = "Load environment variables from this file instead of ./.env")]
    env_file: Option<PathBuf>,

    #[arg(long, help = "Validate the configuration and exit")]
    check_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load .env if present; real environment variables take precedence
    match &cli.env_file {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
        }
        None => {
            let _ = dotenvy::dotenv();
        }
    }

    let config = AppConfig::from_env().context("invalid configuration")?;
    init_tracing(config.server.debug);

    if cli.check_config {
        let driver = match config.database {
            DatabaseConfig::Postgres { .. } => "postgres",
            DatabaseConfig::Memory => "memory",
        };
        tracing::info!(
            "Configuration OK: api {}, port {}, driver {}",
            config.api_version(),
            config.server.port,
            driver
        );
        return Ok(());
    }

    tracing::info!(
        "Starting Newsletter API {}.{} on port {}",
        config.server.major,
        config.server.minor,
        config.server.port
    );

    let listener = server::bind(config.server.port).await?;
    let runtime = server::build_runtime(config).await?;

    let served = server::serve(
        listener,
        runtime.state,
        Arc::new(TracingSink),
        server::shutdown_signal(),
    )
    .await;

    if let Some(database) = runtime.database {
        database.close().await;
    }

    served?;
    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
