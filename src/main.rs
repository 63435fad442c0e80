//! Feedback analytics API server.

use feedback_analytics::api;
use feedback_analytics::cli::Cli;
use feedback_analytics::config::{Config, ConnectionConfig};
use feedback_analytics::error::{AnalyticsError, Result};
use feedback_analytics::logging;
use feedback_analytics::store::{self, FeedbackStore, MockFeedbackStore};
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    logging::init();

    if let Err(e) = run().await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Load configuration file
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    let listen = cli
        .listen
        .clone()
        .unwrap_or_else(|| config.server.listen.clone());

    let store: Arc<dyn FeedbackStore> = if cli.mock_db {
        warn!("Serving from an in-memory mock store; no database is attached");
        Arc::new(MockFeedbackStore::new())
    } else {
        let connection = resolve_connection(&cli, &config)?.ok_or_else(|| {
            AnalyticsError::config(
                "No database connection configured. \
                 Pass a connection string, use --connection, or set DATABASE_URL.",
            )
        })?;
        info!("Connection: {}", connection.display_string());
        store::connect(&connection).await?
    };

    let result = api::serve(&listen, Arc::clone(&store)).await;

    // Drain the pool on the way out, whatever happened to the server
    store.close().await?;
    result
}

/// Resolves the final connection configuration with precedence:
/// CLI arguments, then the named config connection, then the default
/// config connection, then DATABASE_URL, then PG* environment defaults.
fn resolve_connection(cli: &Cli, config: &Config) -> Result<Option<ConnectionConfig>> {
    // Start with CLI connection config if provided
    let mut connection = cli.to_connection_config()?;

    // If no CLI connection, try named connection from config
    if connection.is_none() {
        if let Some(name) = cli.connection_name() {
            connection = config.get_connection(Some(name)).cloned();
            if connection.is_none() {
                return Err(AnalyticsError::config(format!(
                    "Connection '{}' not found in config file",
                    name
                )));
            }
        }
    }

    // If still no connection, try default from config
    if connection.is_none() {
        connection = config.get_connection(None).cloned();
    }

    // Last resort: a full connection string from the environment
    if connection.is_none() {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            connection = Some(ConnectionConfig::from_connection_string(&url)?);
        }
    }

    // Apply environment variable defaults
    if let Some(ref mut conn) = connection {
        conn.apply_env_defaults();
    }

    Ok(connection)
}
