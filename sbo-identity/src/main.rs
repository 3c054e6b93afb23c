//! sbo-identity - Customer Identity Resolution Microservice
//!
//! Decides which customer entity a raw insurance record belongs to from
//! its identity signals, cascades resolved identities to unresolved
//! sibling records, and consolidates duplicate customers.
//!
//! Invoked by the import pipeline (batch matching) and by operator
//! actions (assignment, merge) through the gateway, which validates the
//! tenant before forwarding.

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sbo_identity::AppState;

#[derive(Parser, Debug)]
#[command(name = "sbo-identity", about = "SBO customer identity resolution service")]
struct Args {
    /// Root data folder (falls back to SBO_ROOT_FOLDER, config file,
    /// then the platform default)
    #[arg(long)]
    root_folder: Option<String>,

    /// Listen port
    #[arg(long, env = "SBO_IDENTITY_PORT", default_value_t = 5741)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    info!("Starting sbo-identity service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let root_folder = sbo_common::config::resolve_root_folder(args.root_folder.as_deref());
    let db_path = sbo_common::config::database_path(&root_folder);
    info!("Database: {}", db_path.display());

    let db_pool = sbo_common::db::init_database_pool(&db_path).await?;
    info!("Database connection established");

    let state = AppState::new(db_pool);
    let app = sbo_identity::build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", args.port)).await?;
    info!("Listening on http://127.0.0.1:{}", args.port);
    info!("Health check: http://127.0.0.1:{}/health", args.port);

    axum::serve(listener, app).await?;

    Ok(())
}
