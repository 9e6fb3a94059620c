//! The asset resolution capability the manifest consumes.
//!
//! A [`Resolver`] turns a logical path into compiled bytes plus the metadata
//! needed to publish them. Finding sources on a load path, running
//! transforms, and computing digests all happen behind this trait.

use std::path::PathBuf;

/// A compiled asset ready for publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    /// Canonical logical path. Index files are collapsed onto their
    /// directory name (`coffee/index.js` resolves as `coffee.js`), so this may
    /// differ from the path that was requested.
    pub logical_path: String,

    /// Identity of the source the asset was built from, usually its filename.
    /// Two assets with one logical path but different sources conflict.
    pub source: String,

    /// Content-addressed output path relative to the output directory.
    pub digest_path: String,

    /// Compiled bytes.
    pub bytes: Vec<u8>,

    /// Opaque content digest.
    pub digest: String,

    /// Subresource integrity string, when the resolver computes one.
    pub integrity: Option<String>,

    /// Mime type used to select exporters and postprocessors.
    pub mime_type: String,

    /// Whether a gzip sidecar is worth writing for this content type.
    pub compressible: bool,

    /// Paths of assets that must be published alongside this one, in
    /// declaration order. Each is passed back to [`Resolver::resolve`].
    pub links: Vec<String>,
}

impl ResolvedAsset {
    /// Byte length of the compiled (uncompressed) asset.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Errors raised while resolving an asset.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// No asset exists for the requested path.
    #[error("couldn't find asset '{0}'")]
    NotFound(String),

    /// A source file could not be read.
    #[error("failed to read asset source {path}: {source}")]
    Io {
        /// The source file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An absolute path was given that lies outside every load path.
    #[error("{} is not inside any load path", .0.display())]
    OutsideLoadPath(PathBuf),
}

/// Maps a logical path to a compiled artifact.
///
/// Implementations must be shareable across the export worker pool.
pub trait Resolver: Send + Sync {
    /// Resolves `path` (a logical path, or any link string the resolver
    /// itself produced) to a compiled asset.
    fn resolve(&self, path: &str) -> Result<ResolvedAsset, ResolveError>;
}

impl<R: Resolver + ?Sized> Resolver for std::sync::Arc<R> {
    fn resolve(&self, path: &str) -> Result<ResolvedAsset, ResolveError> {
        (**self).resolve(path)
    }
}
