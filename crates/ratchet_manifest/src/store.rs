//! High-level manifest orchestrator.
//!
//! [`ManifestStore`] ties together the manifest document, the publisher,
//! link expansion, and callback dispatch. All manifest mutations go through
//! one lock, and every mutating operation persists the document before
//! returning.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::dispatch::{AssetCallback, CallbackRegistry, Dispatcher};
use crate::error::ManifestError;
use crate::links::LinkExpander;
use crate::locator::ManifestLocation;
use crate::manifest::{ManifestData, ManifestEntry};
use crate::publisher::Publisher;
use crate::resolver::{ResolvedAsset, Resolver};
use crate::retention::RetentionPolicy;

/// Runtime switches for a [`ManifestStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManifestOptions {
    /// Write `.gz` sidecars for compressible artifacts.
    pub gzip: bool,
    /// Run exporters and postprocessors on a worker pool.
    pub concurrent: bool,
    /// Worker pool size; zero picks one worker per CPU.
    pub workers: usize,
}

impl Default for ManifestOptions {
    fn default() -> Self {
        Self {
            gzip: true,
            concurrent: true,
            workers: 0,
        }
    }
}

/// A manifest file plus the output directory it describes.
///
/// The store is `Sync`: several threads may compile, remove, or clean
/// through one shared reference.
pub struct ManifestStore {
    location: ManifestLocation,
    data: Mutex<ManifestData>,
    resolver: Option<Arc<dyn Resolver>>,
    publisher: Publisher,
    dispatcher: Dispatcher,
    exporters: CallbackRegistry,
    postprocessors: CallbackRegistry,
}

impl ManifestStore {
    /// Opens the manifest for `path`, which names either a manifest file or
    /// an output directory.
    ///
    /// A missing or corrupt manifest opens as empty.
    pub fn open(path: &Path, options: ManifestOptions) -> Result<Self, ManifestError> {
        Self::at(ManifestLocation::locate(path), options)
    }

    /// Opens the manifest at an already-resolved location.
    pub fn at(location: ManifestLocation, options: ManifestOptions) -> Result<Self, ManifestError> {
        let data = ManifestData::load(&location.filename);
        let dispatcher = if options.concurrent {
            Dispatcher::concurrent(options.workers)?
        } else {
            Dispatcher::sequential()
        };
        debug!(
            manifest = %location.filename.display(),
            kind = ?location.kind,
            files = data.files.len(),
            "opened manifest"
        );
        Ok(Self {
            publisher: Publisher::new(&location.directory, options.gzip),
            location,
            data: Mutex::new(data),
            resolver: None,
            dispatcher,
            exporters: CallbackRegistry::new(),
            postprocessors: CallbackRegistry::new(),
        })
    }

    /// Attaches the resolver used by [`compile`](Self::compile) and [`find`](Self::find).
    pub fn with_resolver(mut self, resolver: Arc<dyn Resolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Registers an exporter for `mime_type` (or `*/*`).
    pub fn register_exporter(
        &mut self,
        mime_type: impl Into<String>,
        callback: Arc<dyn AssetCallback>,
    ) {
        self.exporters.register(mime_type, callback);
    }

    /// Registers a postprocessor for `mime_type` (or `*/*`). Postprocessors
    /// run after the exporters for the same artifact are dispatched.
    pub fn register_postprocessor(
        &mut self,
        mime_type: impl Into<String>,
        callback: Arc<dyn AssetCallback>,
    ) {
        self.postprocessors.register(mime_type, callback);
    }

    /// The output directory.
    pub fn directory(&self) -> &Path {
        &self.location.directory
    }

    /// The manifest file path.
    pub fn filename(&self) -> &Path {
        &self.location.filename
    }

    /// How the manifest file was located.
    pub fn location(&self) -> &ManifestLocation {
        &self.location
    }

    /// A snapshot of the manifest document.
    pub fn data(&self) -> ManifestData {
        self.data.lock().clone()
    }

    /// A snapshot of the logical path → digest path mapping.
    pub fn assets(&self) -> BTreeMap<String, String> {
        self.data.lock().assets.clone()
    }

    /// A snapshot of the published files table.
    pub fn files(&self) -> BTreeMap<String, ManifestEntry> {
        self.data.lock().files.clone()
    }

    /// Resolves `paths` and everything they link to without publishing.
    pub fn find<S: AsRef<str>>(&self, paths: &[S]) -> Result<Vec<ResolvedAsset>, ManifestError> {
        let resolver = self
            .resolver
            .as_deref()
            .ok_or(ManifestError::MissingResolver)?;
        LinkExpander::new(resolver).expand(paths)
    }

    /// Compiles `paths` and their links into the output directory.
    ///
    /// Each new digest is written once, callbacks are dispatched, and the
    /// manifest is updated and saved. Returns the on-disk path of every
    /// artifact in the expanded set. On failure the manifest document is not
    /// updated, though artifacts already written stay on disk.
    ///
    /// Publishing and dispatch run without the manifest lock, so a concurrent
    /// [`remove`](Self::remove) or [`clean`](Self::clean) may delete a
    /// superseded artifact this compile is about to make current again. Such
    /// artifacts are written back under the lock before they are recorded.
    pub fn compile<S: AsRef<str>>(&self, paths: &[S]) -> Result<Vec<PathBuf>, ManifestError> {
        let assets = self.find(paths)?;

        let mut targets = Vec::with_capacity(assets.len());
        for asset in &assets {
            self.publisher
                .publish(&asset.digest_path, &asset.bytes, asset.compressible)?;
            targets.push(self.publisher.target_path(&asset.digest_path)?);
        }

        let ran = self.dispatcher.dispatch(
            self.directory(),
            &assets,
            &self.exporters,
            &self.postprocessors,
        )?;

        let mtime = Utc::now();
        let mut data = self.data.lock();
        for asset in &assets {
            let outcome = self
                .publisher
                .publish(&asset.digest_path, &asset.bytes, asset.compressible)?;
            if outcome.wrote {
                debug!(digest_path = %asset.digest_path, "republished artifact removed during compile");
            }
        }
        for asset in &assets {
            data.record(
                &asset.digest_path,
                ManifestEntry {
                    logical_path: asset.logical_path.clone(),
                    mtime,
                    size: asset.size(),
                    digest: asset.digest.clone(),
                    integrity: asset.integrity.clone(),
                },
            );
        }
        data.save(self.filename())?;

        info!(
            assets = assets.len(),
            callbacks = ran,
            manifest = %self.filename().display(),
            "compiled"
        );
        Ok(targets)
    }

    /// Deletes a published artifact, its sidecar, and its manifest entry.
    ///
    /// Unknown digest paths are a no-op. Returns `true` if an entry was removed.
    pub fn remove(&self, digest_path: &str) -> Result<bool, ManifestError> {
        let mut data = self.data.lock();
        if !self.remove_locked(&mut data, digest_path)? {
            return Ok(false);
        }
        data.save(self.filename())?;
        Ok(true)
    }

    /// Deletes superseded versions per [`RetentionPolicy`]: `keep` versions
    /// per logical path (counting the current one), plus any younger than
    /// `max_age`. Returns the removed digest paths.
    pub fn clean(&self, keep: usize, max_age: Duration) -> Result<Vec<String>, ManifestError> {
        let policy = RetentionPolicy::new(keep, max_age);
        let mut data = self.data.lock();
        let stale = policy.stale_entries(&data, Utc::now());

        let mut removed = Vec::with_capacity(stale.len());
        let outcome = stale.iter().try_for_each(|digest_path| {
            self.remove_locked(&mut data, digest_path)?;
            removed.push(digest_path.clone());
            Ok::<(), ManifestError>(())
        });
        // Persist whatever was removed before surfacing a failure.
        if !removed.is_empty() {
            data.save(self.filename())?;
        }
        outcome?;
        Ok(removed)
    }

    /// Deletes the whole output directory and forgets every entry.
    ///
    /// A missing directory is not an error.
    pub fn clobber(&self) -> Result<(), ManifestError> {
        let mut data = self.data.lock();
        match std::fs::remove_dir_all(self.directory()) {
            Ok(()) => info!(directory = %self.directory().display(), "removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(ManifestError::io(self.directory())(e)),
        }
        *data = ManifestData::new();
        Ok(())
    }

    /// Reads the published bytes for each logical path present in the
    /// manifest, skipping unknown ones. The resolver is not consulted.
    pub fn find_sources<S: AsRef<str>>(&self, paths: &[S]) -> Result<Vec<Vec<u8>>, ManifestError> {
        let digest_paths: Vec<String> = {
            let data = self.data.lock();
            paths
                .iter()
                .filter_map(|p| data.current(p.as_ref()).map(str::to_string))
                .collect()
        };
        digest_paths
            .iter()
            .map(|digest_path| self.publisher.read(digest_path))
            .collect()
    }

    /// Writes the manifest document to disk.
    pub fn save(&self) -> Result<(), ManifestError> {
        self.data.lock().save(self.filename())
    }

    fn remove_locked(&self, data: &mut ManifestData, digest_path: &str) -> Result<bool, ManifestError> {
        if !data.files.contains_key(digest_path) {
            return Ok(false);
        }
        self.publisher.unpublish(digest_path)?;
        data.remove(digest_path);
        info!(digest_path, "removed");
        Ok(true)
    }
}

impl std::fmt::Debug for ManifestStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManifestStore")
            .field("location", &self.location)
            .field("has_resolver", &self.resolver.is_some())
            .field("dispatcher", &self.dispatcher)
            .field("exporters", &self.exporters)
            .field("postprocessors", &self.postprocessors)
            .finish()
    }
}
