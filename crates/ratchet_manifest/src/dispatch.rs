//! Exporter and postprocessor dispatch.
//!
//! Callbacks are registered per mime type and run once for every published
//! artifact of that type. Dispatch either runs every callback on a bounded
//! worker pool with no ordering between tasks, or one at a time in
//! registration order.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use crate::error::ManifestError;
use crate::fsutil::target_path;
use crate::resolver::ResolvedAsset;

/// Error type returned by callbacks.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// The artifact handed to a callback.
#[derive(Debug, Clone, Copy)]
pub struct Export<'a> {
    /// The resolved asset.
    pub asset: &'a ResolvedAsset,
    /// The output directory.
    pub directory: &'a Path,
    /// Where the asset is published.
    pub target: &'a Path,
}

/// An exporter or postprocessor.
pub trait AssetCallback: Send + Sync {
    /// Name used in logs and error messages.
    fn name(&self) -> &str;

    /// Processes one published artifact.
    fn process(&self, export: &Export<'_>) -> Result<(), CallbackError>;
}

/// Callbacks keyed by mime type, in registration order.
#[derive(Clone, Default)]
pub struct CallbackRegistry {
    by_mime: BTreeMap<String, Vec<Arc<dyn AssetCallback>>>,
}

impl CallbackRegistry {
    /// Mime pattern matching every artifact.
    pub const ANY_MIME: &'static str = "*/*";

    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` for `mime_type` (or [`ANY_MIME`](Self::ANY_MIME)).
    pub fn register(&mut self, mime_type: impl Into<String>, callback: Arc<dyn AssetCallback>) {
        self.by_mime.entry(mime_type.into()).or_default().push(callback);
    }

    /// Callbacks that apply to `mime_type`: wildcard registrations first,
    /// then exact ones, each in registration order.
    pub fn for_mime<'a>(
        &'a self,
        mime_type: &str,
    ) -> impl Iterator<Item = &'a Arc<dyn AssetCallback>> + 'a {
        let wildcard = self.by_mime.get(Self::ANY_MIME).into_iter().flatten();
        let exact = if mime_type == Self::ANY_MIME {
            None
        } else {
            self.by_mime.get(mime_type)
        };
        wildcard.chain(exact.into_iter().flatten())
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.by_mime.values().all(Vec::is_empty)
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (mime, callbacks) in &self.by_mime {
            let names: Vec<&str> = callbacks.iter().map(|c| c.name()).collect();
            map.entry(mime, &names);
        }
        map.finish()
    }
}

/// One callback invocation.
struct Job<'a> {
    asset: &'a ResolvedAsset,
    target: PathBuf,
    callback: &'a Arc<dyn AssetCallback>,
}

/// Runs callbacks sequentially or on a worker pool.
pub struct Dispatcher {
    pool: Option<rayon::ThreadPool>,
}

impl Dispatcher {
    /// Runs callbacks one at a time in registration order.
    pub fn sequential() -> Self {
        Self { pool: None }
    }

    /// Runs callbacks on a pool of `workers` threads (zero picks one per CPU).
    pub fn concurrent(workers: usize) -> Result<Self, ManifestError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("ratchet-export-{i}"))
            .build()
            .map_err(|e| ManifestError::WorkerPool {
                reason: e.to_string(),
            })?;
        Ok(Self { pool: Some(pool) })
    }

    /// Whether callbacks run on a worker pool.
    pub fn is_concurrent(&self) -> bool {
        self.pool.is_some()
    }

    /// Runs every exporter, then every postprocessor, registered for each
    /// artifact's mime type. Returns the number of callbacks run.
    ///
    /// Blocks until all started callbacks finish. The first failure stops
    /// further callbacks from starting and is returned.
    pub fn dispatch(
        &self,
        directory: &Path,
        assets: &[ResolvedAsset],
        exporters: &CallbackRegistry,
        postprocessors: &CallbackRegistry,
    ) -> Result<usize, ManifestError> {
        let mut jobs: Vec<Job<'_>> = Vec::new();
        for asset in assets {
            let target = target_path(directory, &asset.digest_path)?;
            let callbacks = exporters
                .for_mime(&asset.mime_type)
                .chain(postprocessors.for_mime(&asset.mime_type));
            for callback in callbacks {
                jobs.push(Job {
                    asset,
                    target: target.clone(),
                    callback,
                });
            }
        }

        let run = |job: &Job<'_>| run_job(directory, job);
        match &self.pool {
            Some(pool) => pool.install(|| jobs.par_iter().try_for_each(run))?,
            None => jobs.iter().try_for_each(run)?,
        }
        Ok(jobs.len())
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("workers", &self.pool.as_ref().map(|p| p.current_num_threads()))
            .finish()
    }
}

fn run_job(directory: &Path, job: &Job<'_>) -> Result<(), ManifestError> {
    let export = Export {
        asset: job.asset,
        directory,
        target: &job.target,
    };
    debug!(
        callback = job.callback.name(),
        digest_path = %job.asset.digest_path,
        "running callback"
    );
    job.callback
        .process(&export)
        .map_err(|source| ManifestError::Callback {
            callback: job.callback.name().to_string(),
            digest_path: job.asset.digest_path.clone(),
            source,
        })
}
