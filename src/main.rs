//! Read-only dashboard viewer service.
//!
//! Serves dashboard files from a directory, the element pack palette, and
//! viewer scenes with variables applied. Editing happens in the browser;
//! nothing here writes to disk.

mod config;
mod routes;
mod services;
mod state;

use config::{Config, ConfigError};
use services::pack::PackLoadError;

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Pack(#[from] PackLoadError),
    #[error("server io: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("dotenv: {e}");
        }
    }
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    let pack = services::pack::load_pack(&config.pack_path).await?;
    tracing::info!(classes = pack.len(), path = %config.pack_path.display(), "element pack loaded");

    let store = services::store::DashboardStore::new(&config.dashboard_dir);
    let state = state::AppState::new(store, pack);

    let app = routes::app(state, config.cors);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    let port = config.port;
    tracing::info!(%port, dir = %config.dashboard_dir.display(), "idc listening");
    axum::serve(listener, app).await?;
    Ok(())
}
