//! Quill Blog Server Library
//!
//! Posts with uploaded thumbnails, user profiles and avatars, over SQLite
//! and the local filesystem.

pub mod core;
pub mod posts;
pub mod users;

use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::core::auth::JwtKeys;
use crate::core::files::FileStore;
use crate::core::store::{SqliteStore, Store};
use crate::core::{AppState, ServerConfig};
use crate::posts::PostService;
use crate::users::UserService;

/// Wire services over `store` according to `config`.
pub fn build_state(config: ServerConfig, store: Arc<dyn Store>) -> AppState {
    let files = FileStore::new(&config.base_dir);
    AppState {
        jwt: Arc::new(JwtKeys::new(&config.jwt_secret)),
        posts: Arc::new(PostService::new(store.clone(), files.clone())),
        users: Arc::new(UserService::new(store, files.clone())),
        files,
        config,
    }
}

pub async fn run() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_err()
    {
        // Already set, ignore
    }

    info!("=== Quill Server ===");

    let config = ServerConfig::from_env()?;
    config.ensure_dirs().await?;
    info!("Base directory: {:?}", config.base_dir);

    let store = Arc::new(SqliteStore::connect(&config.database_url).await?);
    info!("Store initialized");

    let addr = config.bind_addr;
    let app = crate::core::router(build_state(config, store));

    info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
