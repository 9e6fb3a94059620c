//! Digest-addressed artifact publication.
//!
//! Artifacts are written to `<directory>/<digest_path>`, with an optional
//! `<digest_path>.gz` sidecar. A digest path names one fixed byte sequence,
//! so an existing file is never rewritten; concurrent publishers racing on
//! the same path at worst write identical bytes twice.

use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::{debug, info};

use crate::error::ManifestError;
use crate::fsutil::{target_path, write_atomically};

/// What a [`Publisher::publish`] call actually wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishOutcome {
    /// The artifact file was written (it did not exist before).
    pub wrote: bool,
    /// The gzip sidecar was written (it did not exist before).
    pub gzipped: bool,
}

/// Writes artifact bytes into an output directory exactly once per digest.
#[derive(Debug, Clone)]
pub struct Publisher {
    directory: PathBuf,
    gzip: bool,
}

impl Publisher {
    /// Creates a publisher for `directory`. The directory is created lazily.
    pub fn new(directory: &Path, gzip: bool) -> Self {
        Self {
            directory: directory.to_path_buf(),
            gzip,
        }
    }

    /// The output directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Whether gzip sidecars are enabled.
    pub fn gzip_enabled(&self) -> bool {
        self.gzip
    }

    /// Returns the on-disk path for a digest path.
    ///
    /// Digest paths with `..`, root, or empty segments are rejected.
    pub fn target_path(&self, digest_path: &str) -> Result<PathBuf, ManifestError> {
        target_path(&self.directory, digest_path)
    }

    /// Publishes `bytes` at `digest_path` unless it already exists.
    ///
    /// When `compressible` is set and gzip is enabled, a `.gz` sidecar is
    /// also written unless it already exists. Sidecar failures are returned
    /// as [`ManifestError::Gzip`].
    pub fn publish(
        &self,
        digest_path: &str,
        bytes: &[u8],
        compressible: bool,
    ) -> Result<PublishOutcome, ManifestError> {
        let target = self.target_path(digest_path)?;
        let mut outcome = PublishOutcome::default();

        if target.exists() {
            debug!(target = %target.display(), "skipping, already exists");
        } else {
            info!(target = %target.display(), "writing");
            write_atomically(&target, |f| f.write_all(bytes))
                .map_err(ManifestError::io(&target))?;
            outcome.wrote = true;
        }

        if compressible && self.gzip {
            let sidecar = gzip_sidecar_path(&target);
            if sidecar.exists() {
                debug!(target = %sidecar.display(), "skipping, already exists");
            } else {
                info!(target = %sidecar.display(), "writing");
                write_atomically(&sidecar, |f| {
                    let mut encoder = GzEncoder::new(f, Compression::best());
                    encoder.write_all(bytes)?;
                    encoder.finish()?;
                    Ok(())
                })
                .map_err(|source| ManifestError::Gzip {
                    path: sidecar.clone(),
                    source,
                })?;
                outcome.gzipped = true;
            }
        }

        Ok(outcome)
    }

    /// Deletes a published artifact and its sidecar. Missing files are ignored.
    ///
    /// Returns `true` if anything was deleted.
    pub fn unpublish(&self, digest_path: &str) -> Result<bool, ManifestError> {
        let target = self.target_path(digest_path)?;
        let removed_file = remove_if_exists(&target)?;
        let removed_sidecar = remove_if_exists(&gzip_sidecar_path(&target))?;
        Ok(removed_file || removed_sidecar)
    }

    /// Reads a published artifact back from disk.
    pub fn read(&self, digest_path: &str) -> Result<Vec<u8>, ManifestError> {
        let target = self.target_path(digest_path)?;
        std::fs::read(&target).map_err(ManifestError::io(target))
    }
}

/// Returns `<path>.gz`.
pub fn gzip_sidecar_path(path: &Path) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(".gz");
    PathBuf::from(s)
}

fn remove_if_exists(path: &Path) -> Result<bool, ManifestError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(ManifestError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
