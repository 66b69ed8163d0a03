//! Last good site config, kept on disk.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use comanda_core::SiteConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// File-backed copy of the most recent site config.
#[derive(Debug, Clone)]
pub struct SiteConfigCache {
    path: PathBuf,
}

impl SiteConfigCache {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cached config.
    ///
    /// A missing file is `None`. An unreadable or corrupt file is logged and
    /// also treated as `None`.
    pub async fn load(&self) -> Option<SiteConfig> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read site config cache");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Corrupt site config cache");
                None
            }
        }
    }

    /// Overwrite the cache with `config`.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the directory cannot be created or the file
    /// cannot be written.
    pub async fn store(&self, config: &SiteConfig) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(config)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn scratch_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("comanda-cache-{}", uuid::Uuid::new_v4()))
            .join("site-config.json")
    }

    #[tokio::test]
    async fn test_missing_file_is_none() {
        assert!(SiteConfigCache::new(scratch_path()).load().await.is_none());
    }

    #[tokio::test]
    async fn test_store_then_load() {
        let cache = SiteConfigCache::new(scratch_path());
        let config = SiteConfig {
            open_time: Some("20:00".to_string()),
            close_time: Some("02:00".to_string()),
            open_days: Some(vec![4, 5, 6]),
            closed_dates: vec!["2026-12-25".to_string()],
        };

        cache.store(&config).await.unwrap();
        assert_eq!(cache.load().await, Some(config));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_none() {
        let cache = SiteConfigCache::new(scratch_path());
        tokio::fs::create_dir_all(cache.path().parent().unwrap())
            .await
            .unwrap();
        tokio::fs::write(cache.path(), b"{not json").await.unwrap();
        assert!(cache.load().await.is_none());
    }
}
