//! Logical path helpers.
//!
//! Logical paths are always `/`-separated and relative (e.g. `admin/app.js`),
//! independent of the host platform's path separator.

use crate::fingerprint::Fingerprint;

/// Splits a logical path into `(stem, extension)`, where the extension
/// includes its leading dot and only the final extension is split off.
///
/// Dotfiles (`.htaccess`) and names without a dot have an empty extension.
pub fn split_extension(logical_path: &str) -> (&str, &str) {
    let name_start = logical_path.rfind('/').map_or(0, |i| i + 1);
    let name = &logical_path[name_start..];
    match name.rfind('.') {
        Some(0) | None => (logical_path, ""),
        Some(dot) => logical_path.split_at(name_start + dot),
    }
}

/// Builds the digest-qualified output path for a logical path:
/// `admin/app.js` becomes `admin/app-<hash>.js`.
pub fn digest_path(logical_path: &str, hash: &Fingerprint) -> String {
    let (stem, ext) = split_extension(logical_path);
    format!("{stem}-{hash}{ext}")
}

/// Collapses a directory index file onto its directory name:
/// `coffee/index.js` becomes `coffee.js`.
///
/// A top-level `index.js` has no directory to collapse onto and is returned
/// unchanged.
pub fn canonical_logical_path(logical_path: &str) -> String {
    if let Some(slash) = logical_path.rfind('/') {
        let (dir, name) = (&logical_path[..slash], &logical_path[slash + 1..]);
        if let Some(rest) = name.strip_prefix("index") {
            if rest.starts_with('.') && !dir.is_empty() {
                return format!("{dir}{rest}");
            }
        }
    }
    logical_path.to_string()
}

/// Returns the directory part of a logical path, or `""` for top-level names.
pub fn logical_dirname(logical_path: &str) -> &str {
    logical_path.rfind('/').map_or("", |i| &logical_path[..i])
}
