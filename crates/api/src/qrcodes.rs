//! QR artifact store.
//!
//! Each exercise has one PNG at `{dir}/{slug}.png` encoding the AR deep
//! link `{base_url}/{slug}`. The store keeps that directory in step with
//! the catalog: handlers call the `sync_*` methods after a successful
//! database write, and the maintenance endpoints call
//! [`QrArtifactStore::cleanup_orphans`] and [`QrArtifactStore::regenerate_all`].
//!
//! Artifact failures never fail the catalog operation that triggered them;
//! the `sync_*` methods log and move on.

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use gymar_core::qr::{self, QrRenderError};
use serde::Serialize;

use crate::config::ServerConfig;

/// Prefix of in-flight temporary files in the artifact directory.
const TEMP_PREFIX: &str = ".qr-";

/// Temporary files older than this are leftovers from an interrupted write.
const STALE_TEMP_AGE: Duration = Duration::from_secs(300);

/// Errors from a single artifact operation.
#[derive(Debug, thiserror::Error)]
pub enum QrArtifactError {
    #[error(transparent)]
    Render(#[from] QrRenderError),

    #[error("QR artifact IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of [`QrArtifactStore::cleanup_orphans`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// Orphaned artifacts removed.
    pub cleaned: usize,
    /// Artifacts that could not be removed.
    pub errors: usize,
}

/// Outcome of [`QrArtifactStore::regenerate_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegenerateReport {
    pub generated: usize,
    pub failed: usize,
}

/// Directory of QR artifacts, one per exercise slug.
#[derive(Debug, Clone)]
pub struct QrArtifactStore {
    dir: PathBuf,
    base_url: String,
}

impl QrArtifactStore {
    pub fn new(dir: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.qr_dir(), config.ar_base_url.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn deep_link(&self, slug: &str) -> String {
        qr::deep_link(&self.base_url, slug)
    }

    pub fn path_for(&self, slug: &str) -> PathBuf {
        self.dir.join(qr::artifact_file_name(slug))
    }

    /// Render and write the artifact for `slug`, replacing any existing one.
    ///
    /// The PNG is written to a uniquely named temporary file in the same
    /// directory and renamed into place, so readers never see a partial file
    /// and concurrent writers of one slug never share a temporary file.
    pub async fn generate(&self, slug: &str) -> Result<PathBuf, QrArtifactError> {
        let png = qr::render_qr_png(&self.deep_link(slug))?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(slug);
        let dir = self.dir.clone();
        let target = path.clone();
        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let mut tmp = tempfile::Builder::new()
                .prefix(TEMP_PREFIX)
                .suffix(".tmp")
                .tempfile_in(&dir)?;
            tmp.write_all(&png)?;
            tmp.persist(&target).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(std::io::Error::other)??;

        tracing::debug!(slug, path = %path.display(), "QR artifact written");
        Ok(path)
    }

    /// Delete the artifact for `slug`. Returns `false` if none existed.
    pub async fn remove(&self, slug: &str) -> Result<bool, QrArtifactError> {
        match tokio::fs::remove_file(self.path_for(slug)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove every `.png` artifact whose slug is not in `valid_slugs`.
    ///
    /// Temporary files abandoned by an interrupted write are removed too,
    /// once they are old enough not to belong to a write in progress. Other
    /// files are left alone. A missing directory means there is nothing to
    /// clean.
    pub async fn cleanup_orphans(
        &self,
        valid_slugs: &HashSet<String>,
    ) -> Result<CleanupReport, QrArtifactError> {
        let mut report = CleanupReport::default();

        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(report),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };

            if name.starts_with(TEMP_PREFIX) {
                if is_stale(&entry).await {
                    match tokio::fs::remove_file(entry.path()).await {
                        Ok(()) => {
                            tracing::info!(file = name, "Removed abandoned QR temp file");
                            report.cleaned += 1;
                        }
                        Err(e) => {
                            tracing::warn!(file = name, error = %e, "Failed to remove QR temp file");
                            report.errors += 1;
                        }
                    }
                }
                continue;
            }

            let Some(slug) = qr::slug_from_file_name(name) else {
                continue;
            };
            if valid_slugs.contains(slug) {
                continue;
            }

            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => {
                    tracing::info!(slug, "Removed orphaned QR artifact");
                    report.cleaned += 1;
                }
                Err(e) => {
                    tracing::warn!(slug, error = %e, "Failed to remove orphaned QR artifact");
                    report.errors += 1;
                }
            }
        }

        Ok(report)
    }

    /// Regenerate the artifact for every slug. Failures are counted, not fatal.
    pub async fn regenerate_all(&self, slugs: &[String]) -> RegenerateReport {
        let mut report = RegenerateReport::default();
        for slug in slugs {
            match self.generate(slug).await {
                Ok(_) => report.generated += 1,
                Err(e) => {
                    tracing::warn!(slug = %slug, error = %e, "Failed to regenerate QR artifact");
                    report.failed += 1;
                }
            }
        }
        report
    }

    /// Best-effort artifact creation after an exercise is created.
    pub async fn sync_created(&self, slug: &str) {
        if let Err(e) = self.generate(slug).await {
            tracing::error!(slug, error = %e, "Failed to generate QR artifact");
        }
    }

    /// Best-effort artifact refresh after an exercise's name or slug changed.
    pub async fn sync_updated(&self, old_slug: &str, new_slug: &str) {
        if old_slug != new_slug {
            self.sync_deleted(old_slug).await;
        }
        self.sync_created(new_slug).await;
    }

    /// Best-effort artifact removal after an exercise is deleted.
    pub async fn sync_deleted(&self, slug: &str) {
        if let Err(e) = self.remove(slug).await {
            tracing::error!(slug, error = %e, "Failed to remove QR artifact");
        }
    }
}

async fn is_stale(entry: &tokio::fs::DirEntry) -> bool {
    let Ok(modified) = entry.metadata().await.and_then(|m| m.modified()) else {
        return false;
    };
    SystemTime::now()
        .duration_since(modified)
        .is_ok_and(|age| age >= STALE_TEMP_AGE)
}
