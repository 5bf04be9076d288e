//! Image file storage
//!
//! Uploads land under `./public/...` destinations relative to the base
//! directory. Records store the public path: the destination with its
//! leading `.` dropped, joined with the file name
//! (`./public/thumbnails` + `a.jpg` -> `/public/thumbnails/a.jpg`).

use crate::core::error::{Error, Result};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Write `data` to `destination/filename`, replacing any existing file,
    /// and return the public path to store on the record.
    pub async fn save(&self, destination: &str, filename: &str, data: &[u8]) -> Result<String> {
        let public = public_path(destination, filename);
        let disk = self.disk_path(&public)?;

        if let Some(parent) = disk.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&disk, data).await?;

        info!("Stored upload {} ({} bytes)", public, data.len());
        Ok(public)
    }

    pub async fn remove(&self, public: &str) -> Result<()> {
        let disk = self.disk_path(public)?;
        fs::remove_file(&disk).await?;
        info!("Removed upload {}", public);
        Ok(())
    }

    /// Remove the file behind `public`, logging instead of failing.
    /// Returns whether a file was removed.
    pub async fn remove_best_effort(&self, public: &str) -> bool {
        match self.remove(public).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Could not remove upload {}: {}", public, e);
                false
            }
        }
    }

    pub async fn exists(&self, public: &str) -> bool {
        match self.disk_path(public) {
            Ok(disk) => fs::try_exists(disk).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Map a stored public path back onto disk. Only plain path segments
    /// are accepted.
    pub fn disk_path(&self, public: &str) -> Result<PathBuf> {
        let relative = Path::new(public.trim_start_matches('/'));
        if relative.as_os_str().is_empty()
            || !relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(Error::Validation(format!("Invalid file path: {}", public)));
        }
        Ok(self.base_dir.join(relative))
    }
}

/// Public path for a file written to `destination`.
pub fn public_path(destination: &str, filename: &str) -> String {
    let dir = destination.strip_prefix('.').unwrap_or(destination);
    format!("{}/{}", dir.trim_end_matches('/'), filename)
}

/// Fresh collision-free name for a stored image. Original names and content
/// types are ignored.
pub fn random_jpg_name() -> String {
    format!("{}.jpg", Uuid::new_v4())
}

/// Validate a client-supplied file name before anything is written.
pub fn client_file_name(name: Option<&str>) -> Result<String> {
    let name = name.map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(Error::Validation(
            "A `filename` field is required when uploading a thumbnail".to_string(),
        ));
    }
    if name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name.chars().any(char::is_control)
    {
        return Err(Error::Validation(format!("Invalid filename: {}", name)));
    }
    Ok(name.to_string())
}

/// Stored name for a client-named thumbnail: `<post-id>-<filename>`.
///
/// The post id prefix keeps one post's uploads from landing on a file that
/// belongs to another post. Post id characters outside `[A-Za-z0-9-]` map to
/// `_` so titles with slashes or dots stay a single plain segment.
pub fn post_file_name(post_id: &str, name: Option<&str>) -> Result<String> {
    let name = client_file_name(name)?;
    let prefix: String = post_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    Ok(format!("{}-{}", prefix, name))
}
