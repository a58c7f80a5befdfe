//! # rolodex-server
//!
//! Contact-management backend.
//!
//! This binary provides:
//! - **REST API** (axum) for listing, searching, creating, updating and
//!   deleting contact records
//! - **Avatar uploads** stored on disk with deterministic names and served
//!   back under `/static/avatars`
//! - **SQLite storage** via `rolodex-store`, with the phone uniqueness
//!   invariant enforced by a unique index

mod api;
mod avatar_store;
mod config;
mod error;

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rolodex_store::Database;

use crate::api::AppState;
use crate::avatar_store::AvatarStore;
use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,rolodex_server=debug")),
        )
        .init();

    info!("Starting rolodex server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = Config::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Initialize subsystems
    // -----------------------------------------------------------------------

    // Contact database (runs migrations on open)
    let db = Database::open(&config.database_path)?;

    // Avatar store (creates the static/avatars directory if missing)
    let avatars = Arc::new(
        AvatarStore::new(config.static_root.clone(), config.max_avatar_size).await?,
    );

    // Application state for the HTTP API
    let http_addr = config.http_addr;
    let app_state = AppState {
        db: Arc::new(Mutex::new(db)),
        avatars,
        config: Arc::new(config),
    };

    // -----------------------------------------------------------------------
    // 4. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    // tokio::select! ensures that if either the HTTP server or a shutdown
    // signal arrives, we exit cleanly.
    tokio::select! {
        result = api::serve(app_state, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
