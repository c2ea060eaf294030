//! Upload storage
//!
//! Files live under `<root>/permanent/<uuid>.<ext>`; the database stores the
//! path relative to `<root>`. A file is written before it is decoded and is
//! removed again whenever it turns out not to be a usable image.

use std::path::{Component, Path, PathBuf};

use uuid::Uuid;
use wallctl_core::models::Resolution;

/// Accepted upload extensions (compared case-insensitively)
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

const PERMANENT_DIR: &str = "permanent";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("unsupported file type '{0}', expected one of: jpg, jpeg, png")]
    UnsupportedExtension(String),

    #[error("empty file")]
    Empty,

    #[error("file is not a valid image: {0}")]
    InvalidImage(String),

    #[error("invalid stored path '{0}'")]
    InvalidPath(String),

    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A verified, persisted upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// `permanent/<uuid>.<ext>`
    pub relative_path: String,
    pub extension: String,
    pub resolution: Resolution,
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

/// Lowercased extension of `filename` if it is an accepted image type.
pub fn image_extension(filename: &str) -> Result<String, StorageError> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(StorageError::UnsupportedExtension(ext))
    }
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_dirs(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(self.root.join(PERMANENT_DIR)).await?;
        Ok(())
    }

    /// Absolute path for a stored relative path.
    ///
    /// Only plain relative paths are accepted, so a tampered row can never
    /// point outside the upload root.
    pub fn absolute(&self, relative: &str) -> Result<PathBuf, StorageError> {
        let rel = Path::new(relative);
        let plain = rel.components().all(|c| matches!(c, Component::Normal(_)));
        if relative.is_empty() || !plain {
            return Err(StorageError::InvalidPath(relative.to_owned()));
        }
        Ok(self.root.join(rel))
    }

    /// Persist `bytes` under a fresh name, then decode it to verify it and
    /// read its resolution. The file is removed if decoding fails.
    pub async fn save_verified(&self, filename: &str, bytes: &[u8]) -> Result<StoredImage, StorageError> {
        let extension = image_extension(filename)?;
        if bytes.is_empty() {
            return Err(StorageError::Empty);
        }

        self.ensure_dirs().await?;
        let relative_path = format!("{PERMANENT_DIR}/{}.{extension}", Uuid::new_v4());
        let path = self.root.join(&relative_path);
        tokio::fs::write(&path, bytes).await?;

        let decode_path = path.clone();
        let decoded = tokio::task::spawn_blocking(move || decode_dimensions(&decode_path))
            .await
            .map_err(|e| StorageError::Io(std::io::Error::other(e)))
            .and_then(|r| r);

        match decoded {
            Ok(resolution) => {
                tracing::debug!(path = %relative_path, %resolution, "upload stored");
                Ok(StoredImage {
                    relative_path,
                    extension,
                    resolution,
                })
            }
            Err(err) => {
                tracing::warn!(path = %relative_path, error = %err, "rejecting upload");
                self.remove(&relative_path).await;
                Err(err)
            }
        }
    }

    /// Best-effort removal; failures are logged only.
    pub async fn remove(&self, relative: &str) {
        let path = match self.absolute(relative) {
            Ok(path) => path,
            Err(e) => {
                tracing::error!(error = %e, "refusing to remove file");
                return;
            }
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::debug!(path = %path.display(), "file removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::error!(path = %path.display(), error = %e, "failed to remove file"),
        }
    }

    pub async fn read(&self, relative: &str) -> Result<Vec<u8>, StorageError> {
        Ok(tokio::fs::read(self.absolute(relative)?).await?)
    }
}

fn decode_dimensions(path: &Path) -> Result<Resolution, StorageError> {
    let img = image::ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| StorageError::InvalidImage(e.to_string()))?;
    Ok(Resolution::new(img.width(), img.height()))
}
