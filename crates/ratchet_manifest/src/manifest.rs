//! The persisted manifest document.
//!
//! The document records every published artifact under `files`, keyed by
//! digest path, and the current digest path for each logical path under
//! `assets`:
//!
//! ```json
//! {
//!   "files":  { "app-<hash>.js": { "logical_path": "app.js", "mtime": "...", "size": 12, "digest": "..." } },
//!   "assets": { "app.js": "app-<hash>.js" }
//! }
//! ```

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ManifestError;
use crate::fsutil::{is_contained, write_atomically};

/// Metadata for one published, digest-qualified artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// The logical path the artifact was published for.
    pub logical_path: String,

    /// When the artifact was first published.
    pub mtime: DateTime<Utc>,

    /// Byte length of the uncompressed artifact.
    pub size: u64,

    /// Content digest supplied by the resolver.
    pub digest: String,

    /// Subresource integrity string, if the resolver supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrity: Option<String>,
}

/// The manifest document: published files and current logical mappings.
///
/// Every value in `assets` is a key in `files`. `files` may hold several
/// historical entries for one logical path; `assets` names the current one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestData {
    /// Published artifacts keyed by digest path.
    #[serde(default)]
    pub files: BTreeMap<String, ManifestEntry>,

    /// Current digest path for each logical path.
    #[serde(default)]
    pub assets: BTreeMap<String, String>,
}

impl ManifestData {
    /// Creates an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the manifest at `path`.
    ///
    /// This never fails: a missing, empty, or unparseable document loads as
    /// an empty manifest. `files` entries whose digest path would escape the
    /// output directory are dropped, then `assets` entries pointing at
    /// unknown files.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_json(&content),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "no readable manifest, starting empty");
                Self::new()
            }
        }
    }

    /// Parses a manifest document with the same fail-safe rules as [`load`](Self::load).
    pub fn from_json(content: &str) -> Self {
        if content.trim().is_empty() {
            return Self::new();
        }
        let mut data: Self = match serde_json::from_str(content) {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "ignoring invalid manifest document");
                return Self::new();
            }
        };
        let escaping = data.drop_escaping_files();
        if escaping > 0 {
            warn!(dropped = escaping, "dropped files entries outside the output directory");
        }
        let dropped = data.drop_dangling_assets();
        if dropped > 0 {
            debug!(dropped, "dropped assets entries without a matching file");
        }
        data
    }

    /// Serializes the whole document, replacing `path` atomically.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save(&self, path: &Path) -> Result<(), ManifestError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| ManifestError::Serialization {
            reason: e.to_string(),
        })?;
        write_atomically(path, |f| f.write_all(json.as_bytes())).map_err(ManifestError::io(path))
    }

    /// Records a published artifact and makes it current for its logical path.
    ///
    /// An existing entry for the same digest path is left untouched: equal
    /// digests mean equal bytes, so its metadata is still accurate. Returns
    /// `true` if a new `files` entry was added.
    pub fn record(&mut self, digest_path: &str, entry: ManifestEntry) -> bool {
        self.assets
            .insert(entry.logical_path.clone(), digest_path.to_string());
        if self.files.contains_key(digest_path) {
            return false;
        }
        self.files.insert(digest_path.to_string(), entry);
        true
    }

    /// Removes a `files` entry, and its `assets` pointer if it was current.
    pub fn remove(&mut self, digest_path: &str) -> Option<ManifestEntry> {
        let entry = self.files.remove(digest_path)?;
        if self.assets.get(&entry.logical_path).map(String::as_str) == Some(digest_path) {
            self.assets.remove(&entry.logical_path);
        }
        Some(entry)
    }

    /// Returns the current digest path for a logical path.
    pub fn current(&self, logical_path: &str) -> Option<&str> {
        self.assets.get(logical_path).map(String::as_str)
    }

    /// Groups `files` by logical path.
    pub fn versions(&self) -> BTreeMap<&str, Vec<(&str, &ManifestEntry)>> {
        let mut grouped: BTreeMap<&str, Vec<(&str, &ManifestEntry)>> = BTreeMap::new();
        for (digest_path, entry) in &self.files {
            grouped
                .entry(entry.logical_path.as_str())
                .or_default()
                .push((digest_path.as_str(), entry));
        }
        grouped
    }

    /// Returns `true` if every `assets` value is a key in `files`.
    pub fn is_consistent(&self) -> bool {
        self.assets.values().all(|d| self.files.contains_key(d))
    }

    fn drop_escaping_files(&mut self) -> usize {
        let before = self.files.len();
        self.files.retain(|digest_path, _| is_contained(digest_path));
        before - self.files.len()
    }

    fn drop_dangling_assets(&mut self) -> usize {
        let before = self.assets.len();
        let files = &self.files;
        self.assets.retain(|_, digest_path| files.contains_key(digest_path));
        before - self.assets.len()
    }
}
