// crates/server/src/main.rs
//! Atrium API server binary.
//!
//! Builds the configuration object once from the environment, opens the
//! database, wires the container-runner client, and serves the Axum app.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use atrium_core::AppConfig;
use atrium_db::Database;
use atrium_runner::HttpJobLauncher;
use atrium_server::{create_app, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // The only place the process environment is read.
    let config = AppConfig::from_env()?;
    let port = config.port;

    let db = Database::new(&config.database_path).await?;
    let launcher = Arc::new(HttpJobLauncher::new(
        config.runner_url.clone(),
        config.runner_token.clone(),
    ));

    let state = AppState::new(db, launcher, config);
    let app = create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, version = env!("CARGO_PKG_VERSION"), "atrium api listening");

    axum::serve(listener, app).await?;
    Ok(())
}
