//! Orchard inventory server
//!
//! Binds the HTTP API over the configured database. Startup is fail-fast:
//! an unreachable database or a failed migration aborts the process instead
//! of limping along without persistence.

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use orchard_api::{ApiServer, ApiServerConfig};

/// Fruit-inventory approval backend
#[derive(Parser, Debug)]
#[command(name = "orchard-server")]
#[command(about = "Run the orchard inventory API server", long_about = None)]
#[command(version)]
struct ServerArgs {
    /// API server bind address
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind_addr: SocketAddr,

    /// Database connection URL (SQLite or PostgreSQL)
    #[arg(long, env = "ORCHARD_DATABASE_URL", default_value = "sqlite://orchard.db?mode=rwc")]
    database_url: String,

    /// Secret for signing session tokens
    /// Can also be set via the ORCHARD_JWT_SECRET environment variable
    #[arg(long, env = "ORCHARD_JWT_SECRET")]
    jwt_secret: String,

    /// Session token validity in hours
    #[arg(long, default_value = "24")]
    session_ttl_hours: i64,

    /// Disable the permissive localhost CORS layer (enabled by default for
    /// the development web UI)
    #[arg(long, default_value_t = false)]
    disable_cors: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = ServerArgs::parse();

    // Initialize logging
    init_logging(&args.log_level)?;

    info!("Starting orchard inventory server");
    info!("API endpoint: {}", args.bind_addr);

    // Initialize database connection; a dead database is a startup failure
    info!("Connecting to database: {}", args.database_url);
    let db = orchard_db::connect(&args.database_url).await?;

    orchard_db::migrate(&db)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run database migrations: {}", e))?;

    let config = ApiServerConfig {
        bind_addr: args.bind_addr,
        enable_cors: !args.disable_cors,
        jwt_secret: args.jwt_secret,
        session_ttl_hours: args.session_ttl_hours,
    };

    let server = ApiServer::new(config, db);

    tokio::select! {
        result = server.start() => result?,
        _ = signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    info!("Orchard inventory server stopped");

    Ok(())
}

fn init_logging(log_level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(log_level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(())
}
