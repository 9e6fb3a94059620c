//! An in-memory [`Resolver`] for embedding and tests.
//!
//! Assets are registered with their bytes, mime type, and links. Digest
//! paths are derived from the bytes with [`Fingerprint`], so replacing an
//! asset's content moves it to a new digest path exactly as a recompiled
//! source would.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use ratchet_common::{canonical_logical_path, digest_path, split_extension, Fingerprint};

use crate::resolver::{ResolveError, ResolvedAsset, Resolver};

/// An asset definition for [`MemoryResolver`].
#[derive(Debug, Clone)]
pub struct MemoryAsset {
    path: String,
    source: Option<String>,
    bytes: Vec<u8>,
    mime_type: String,
    compressible: bool,
    links: Vec<String>,
}

impl MemoryAsset {
    /// Creates an asset at `path`, guessing its mime type from the extension.
    pub fn new(path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let path = path.into();
        let (mime_type, compressible) = guess_mime(&path);
        Self {
            path,
            source: None,
            bytes: bytes.into(),
            mime_type: mime_type.to_string(),
            compressible,
            links: Vec::new(),
        }
    }

    /// Overrides the mime type and compressibility.
    pub fn mime_type(mut self, mime_type: impl Into<String>, compressible: bool) -> Self {
        self.mime_type = mime_type.into();
        self.compressible = compressible;
        self
    }

    /// Overrides the source identity (defaults to `memory:<path>`).
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Adds a link to another registered path.
    pub fn link(mut self, path: impl Into<String>) -> Self {
        self.links.push(path.into());
        self
    }
}

/// A thread-safe resolver over registered in-memory assets.
///
/// Every registered path is also reachable through its canonical logical
/// path, so registering `coffee/index.js` makes `coffee.js` resolvable too.
#[derive(Debug, Default)]
pub struct MemoryResolver {
    assets: RwLock<HashMap<String, MemoryAsset>>,
    resolves: AtomicUsize,
}

impl MemoryResolver {
    /// Creates an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) an asset.
    pub fn insert(&self, asset: MemoryAsset) {
        let canonical = canonical_logical_path(&asset.path);
        let mut assets = self.assets.write();
        if canonical != asset.path {
            assets.insert(canonical, asset.clone());
        }
        assets.insert(asset.path.clone(), asset);
    }

    /// Registers an asset, builder style.
    pub fn with(self, asset: MemoryAsset) -> Self {
        self.insert(asset);
        self
    }

    /// Replaces the bytes of a registered asset, keeping its other settings.
    ///
    /// Returns `false` if nothing is registered at `path`.
    pub fn set_content(&self, path: &str, bytes: impl Into<Vec<u8>>) -> bool {
        let existing = self.assets.read().get(path).cloned();
        match existing {
            Some(mut asset) => {
                asset.bytes = bytes.into();
                self.insert(asset);
                true
            }
            None => false,
        }
    }

    /// Number of `resolve` calls served so far.
    pub fn resolve_count(&self) -> usize {
        self.resolves.load(Ordering::Relaxed)
    }
}

impl Resolver for MemoryResolver {
    fn resolve(&self, path: &str) -> Result<ResolvedAsset, ResolveError> {
        self.resolves.fetch_add(1, Ordering::Relaxed);
        let assets = self.assets.read();
        let asset = assets
            .get(path)
            .ok_or_else(|| ResolveError::NotFound(path.to_string()))?;

        let logical_path = canonical_logical_path(&asset.path);
        let hash = Fingerprint::of(&asset.bytes);
        Ok(ResolvedAsset {
            digest_path: digest_path(&logical_path, &hash),
            source: asset
                .source
                .clone()
                .unwrap_or_else(|| format!("memory:{}", asset.path)),
            logical_path,
            bytes: asset.bytes.clone(),
            digest: hash.to_hex(),
            integrity: None,
            mime_type: asset.mime_type.clone(),
            compressible: asset.compressible,
            links: asset.links.clone(),
        })
    }
}

fn guess_mime(path: &str) -> (&'static str, bool) {
    match split_extension(path).1 {
        ".js" => ("application/javascript", true),
        ".css" => ("text/css", true),
        ".html" => ("text/html", true),
        ".json" => ("application/json", true),
        ".svg" => ("image/svg+xml", true),
        ".txt" => ("text/plain", true),
        ".png" => ("image/png", false),
        ".jpg" | ".jpeg" => ("image/jpeg", false),
        ".gif" => ("image/gif", false),
        ".woff2" => ("font/woff2", false),
        _ => ("application/octet-stream", false),
    }
}
