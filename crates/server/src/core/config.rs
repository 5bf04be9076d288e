//! Server configuration

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use crate::core::auth::JwtKeys;
use crate::core::files::FileStore;
use crate::posts::PostService;
use crate::users::UserService;

/// Upload destination for post thumbnails, relative to the base directory
pub const THUMBNAILS_DEST: &str = "./public/thumbnails";
/// Upload destination for user avatars, relative to the base directory
pub const AVATARS_DEST: &str = "./public/avatars";

/// Configuration for the Quill server
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to
    pub bind_addr: SocketAddr,
    /// sqlx connection string
    pub database_url: String,
    /// HS256 secret for bearer tokens
    pub jwt_secret: String,
    /// Directory the `./public/...` destinations are resolved against
    pub base_dir: PathBuf,
    /// Max upload size in MB
    pub max_upload_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            database_url: "sqlite://quill.sqlite".to_string(),
            jwt_secret: String::new(),
            base_dir: PathBuf::from("."),
            max_upload_mb: 10,
        }
    }
}

impl ServerConfig {
    /// Read configuration from the environment (and `.env`, if present).
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(addr) = std::env::var("QUILL_ADDR") {
            config.bind_addr = addr
                .parse()
                .with_context(|| format!("QUILL_ADDR is not a socket address: {addr}"))?;
        }
        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database_url = url;
        }
        if let Ok(root) = std::env::var("QUILL_ROOT") {
            config.base_dir = PathBuf::from(root);
        }
        if let Ok(mb) = std::env::var("QUILL_MAX_UPLOAD_MB") {
            config.max_upload_mb = mb
                .parse()
                .with_context(|| format!("QUILL_MAX_UPLOAD_MB is not a number: {mb}"))?;
        }
        config.jwt_secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

        Ok(config)
    }

    /// Create config with custom base directory
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }

    /// Ensure all upload directories exist
    pub async fn ensure_dirs(&self) -> anyhow::Result<()> {
        for dest in [THUMBNAILS_DEST, AVATARS_DEST] {
            let dir = self.base_dir.join(dest);
            tokio::fs::create_dir_all(&dir)
                .await
                .with_context(|| format!("Failed to create {:?}", dir))?;
        }
        Ok(())
    }
}

/// App state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    pub jwt: Arc<JwtKeys>,
    pub files: FileStore,
    pub posts: Arc<PostService>,
    pub users: Arc<UserService>,
}
