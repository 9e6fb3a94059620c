//! Manifest file discovery and naming.
//!
//! A manifest is addressed either by its own path or by the output directory
//! that holds it. Given a directory, an existing `manifest.json` /
//! `manifest-*.json` wins, then an existing `.sprockets-manifest-<hex>.json`;
//! otherwise a fresh randomized name is generated. Nothing is written until
//! the first save.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;
use tracing::warn;

/// Prefix of generated manifest filenames.
pub const MANIFEST_PREFIX: &str = ".sprockets-manifest-";

static MANIFEST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\.sprockets-manifest-[0-9a-f]{32}\.json$").expect("manifest pattern is valid")
});

static LEGACY_MANIFEST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^manifest(-.+)?\.json$").expect("manifest pattern is valid")
});

/// How a manifest filename was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    /// The caller named the file explicitly.
    Explicit,
    /// An existing `manifest(-*).json` in the directory.
    Legacy,
    /// An existing `.sprockets-manifest-<hex>.json` in the directory.
    Hashed,
    /// A new randomized name; the file does not exist yet.
    Generated,
}

/// A concrete manifest file and the output directory it describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestLocation {
    /// Output directory that artifacts are published into.
    pub directory: PathBuf,
    /// Absolute manifest file path.
    pub filename: PathBuf,
    /// How `filename` was chosen.
    pub kind: ManifestKind,
}

impl ManifestLocation {
    /// Resolves a user-supplied path that is either a manifest file or an
    /// output directory.
    ///
    /// An existing directory is always treated as a directory. Otherwise a
    /// path ending in `.json` is taken to name the manifest file.
    pub fn locate(path: &Path) -> Self {
        if !path.is_dir() && path.extension().is_some_and(|ext| ext == "json") {
            Self::for_file(path)
        } else {
            Self::for_directory(path)
        }
    }

    /// Uses `path` as the manifest file; its parent is the output directory.
    pub fn for_file(path: &Path) -> Self {
        let filename = absolute(path);
        let directory = filename
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"));
        Self {
            directory,
            filename,
            kind: ManifestKind::Explicit,
        }
    }

    /// Publishes into `directory` with the manifest at `filename`, which is
    /// taken relative to `directory` unless absolute.
    pub fn with_filename(directory: &Path, filename: &Path) -> Self {
        let directory = absolute(directory);
        Self {
            filename: directory.join(filename),
            directory,
            kind: ManifestKind::Explicit,
        }
    }

    /// Discovers the manifest inside `directory`, or generates a name for one.
    ///
    /// The directory need not exist.
    pub fn for_directory(directory: &Path) -> Self {
        let directory = absolute(directory);
        let (name, kind) = find_directory_manifest(&directory)
            .unwrap_or_else(|| (generate_manifest_name(), ManifestKind::Generated));
        Self {
            filename: directory.join(name),
            directory,
            kind,
        }
    }
}

/// Generates `.sprockets-manifest-<32 random lowercase hex>.json`.
pub fn generate_manifest_name() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    format!("{MANIFEST_PREFIX}{}.json", hex::encode(bytes))
}

/// Returns `true` for generated-style manifest names.
pub fn is_manifest_name(name: &str) -> bool {
    MANIFEST_RE.is_match(name)
}

/// Returns `true` for legacy `manifest(-*).json` names.
pub fn is_legacy_manifest_name(name: &str) -> bool {
    LEGACY_MANIFEST_RE.is_match(name)
}

/// Finds an existing manifest file in `directory`.
///
/// Legacy names take priority over generated names. Among several matches
/// of the same kind the alphabetically first is chosen, with a warning.
pub fn find_directory_manifest(directory: &Path) -> Option<(String, ManifestKind)> {
    let entries = std::fs::read_dir(directory).ok()?;
    let mut legacy = Vec::new();
    let mut hashed = Vec::new();
    for entry in entries.flatten() {
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if is_legacy_manifest_name(&name) {
            legacy.push(name);
        } else if is_manifest_name(&name) {
            hashed.push(name);
        }
    }

    let (mut candidates, kind) = if !legacy.is_empty() {
        (legacy, ManifestKind::Legacy)
    } else if !hashed.is_empty() {
        (hashed, ManifestKind::Hashed)
    } else {
        return None;
    };
    candidates.sort();
    if candidates.len() > 1 {
        warn!(
            directory = %directory.display(),
            found = ?candidates,
            chosen = %candidates[0],
            "found multiple manifests, choosing the first alphabetically"
        );
    }
    candidates.into_iter().next().map(|name| (name, kind))
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
