//! Error types for manifest operations.

use std::path::PathBuf;

use crate::resolver::ResolveError;

/// Errors that can occur while compiling, removing, or cleaning assets.
///
/// A corrupt or missing manifest document is not an error: it loads as an
/// empty manifest. Everything here aborts the operation that raised it.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// `compile` was called on a store that has no resolver.
    #[error("manifest requires a resolver for compilation")]
    MissingResolver,

    /// Two link declarations published different sources under one logical path.
    #[error(
        "multiple files with the logical path '{logical_path}' linked from {parent}: \
         {last_source} and {conflicting_source}"
    )]
    DoubleLink {
        /// The requested path whose link walk hit the conflict.
        parent: String,
        /// The contested logical path.
        logical_path: String,
        /// The source that first claimed the logical path.
        last_source: String,
        /// The conflicting source.
        conflicting_source: String,
    },

    /// The resolver could not produce a requested or linked asset.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// An exporter or postprocessor failed.
    #[error("{callback} failed for {digest_path}: {source}")]
    Callback {
        /// Name of the failing callback.
        callback: String,
        /// The artifact being processed.
        digest_path: String,
        /// The callback's own error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A digest path would resolve outside the output directory.
    #[error("digest path '{digest_path}' escapes the output directory")]
    InvalidDigestPath {
        /// The offending digest path.
        digest_path: String,
    },

    /// An I/O error occurred while reading or writing output files.
    #[error("manifest I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Writing a gzip sidecar failed.
    #[error("failed to write gzip sidecar {path}: {source}")]
    Gzip {
        /// The sidecar path.
        path: PathBuf,
        /// The underlying I/O error from the encoder or the file.
        source: std::io::Error,
    },

    /// The manifest document could not be serialized.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },

    /// The export worker pool could not be started.
    #[error("failed to start export worker pool: {reason}")]
    WorkerPool {
        /// Description of the pool failure.
        reason: String,
    },
}

impl ManifestError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
