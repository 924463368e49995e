//! Maps a cover image URL to a file in the local image cache.
//!
//! The cache is filled by an external scraper; files are named `<sha1(url)>.<ext>`.
//! Purely a local lookup, nothing is fetched.

use crate::domain::DomainError;
use sha1::{Digest, Sha1};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Suffix used when none is configured explicitly.
pub const DEFAULT_IMAGE_SUFFIX: &str = ".jpg";

#[derive(Debug, Clone)]
pub struct ImageResolver {
    base_path: Option<PathBuf>,
    /// `Some(".jpg")`: only `<digest>.jpg` counts. `None`: any `<digest>.<ext>`.
    suffix: Option<String>,
}

impl ImageResolver {
    /// `base_path` is kept only if it exists and is a directory; otherwise every lookup misses.
    pub fn new(base_path: Option<impl AsRef<Path>>, suffix: Option<String>) -> Self {
        let base_path = base_path.and_then(|p| {
            let p = p.as_ref();
            let resolved = p.canonicalize().unwrap_or_else(|_| p.to_path_buf());
            if resolved.is_dir() {
                info!(path = %resolved.display(), "image base path");
                Some(resolved)
            } else {
                warn!(path = %p.display(), "image base path is not a directory, covers disabled");
                None
            }
        });
        let suffix = suffix.filter(|s| !s.is_empty());
        Self { base_path, suffix }
    }

    /// Resolver that never finds anything.
    pub fn disabled() -> Self {
        Self {
            base_path: None,
            suffix: Some(DEFAULT_IMAGE_SUFFIX.to_string()),
        }
    }

    pub fn base_path(&self) -> Option<&Path> {
        self.base_path.as_deref()
    }

    /// Lowercase SHA-1 hex digest of the URL's UTF-8 bytes.
    pub fn digest(url: &str) -> String {
        format!("{:x}", Sha1::digest(url.as_bytes()))
    }

    /// Find the cached file for `url`, if any.
    pub async fn find_image_file(&self, url: Option<&str>) -> Option<PathBuf> {
        let url = url.filter(|u| !u.is_empty())?;
        let base = self.base_path.as_deref()?;

        let hex_digest = Self::digest(url);
        info!(hash = %hex_digest, url, "looking up cached image");

        let image = match &self.suffix {
            Some(suffix) => {
                let candidate = base.join(format!("{}{}", hex_digest, suffix));
                match fs::metadata(&candidate).await {
                    Ok(meta) if meta.is_file() => Some(candidate),
                    _ => None,
                }
            }
            None => Self::scan_for_digest(base, &hex_digest)
                .await
                .unwrap_or_else(|e| {
                    warn!(error = %e, "image cache lookup failed");
                    None
                }),
        };

        match &image {
            Some(path) => info!(url, path = %path.display(), "image found locally"),
            None => debug!(url, "no cached image"),
        }
        image
    }

    /// First file in `dir` named `<digest>.<ext>`, in directory order. `ext` may contain dots.
    async fn scan_for_digest(dir: &Path, digest: &str) -> Result<Option<PathBuf>, DomainError> {
        let prefix = format!("{}.", digest);
        let mut entries = fs::read_dir(dir)
            .await
            .map_err(|e| DomainError::Image(format!("cannot read {}: {}", dir.display(), e)))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DomainError::Image(format!("cannot scan {}: {}", dir.display(), e)))?
        {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.len() > prefix.len() && name.starts_with(&prefix) && entry.path().is_file() {
                return Ok(Some(entry.path()));
            }
        }
        Ok(None)
    }
}
