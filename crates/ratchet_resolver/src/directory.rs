//! A [`Resolver`] over an ordered list of load-path directories.

use std::fs;
use std::path::{Component, Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine};
use ratchet_common::{canonical_logical_path, digest_path, logical_dirname, split_extension, Fingerprint};
use ratchet_manifest::{ResolveError, ResolvedAsset, Resolver};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::directives::{parse_header, Directive};
use crate::mime::mime_for;

/// Resolves logical paths against load-path directories, first match wins.
///
/// `a/b.js` is looked up as `<load>/a/b.js`, then `<load>/a/b/index.js`.
/// Absolute paths are accepted when they lie inside a load path; that is the
/// form `link_directory` and `link_tree` produce, so two load paths holding
/// the same relative file stay distinguishable.
#[derive(Debug, Clone)]
pub struct DirectoryResolver {
    load_paths: Vec<PathBuf>,
}

/// A source file and its path relative to the load path it was found in.
struct Located {
    file: PathBuf,
    relative: String,
}

impl DirectoryResolver {
    /// Creates a resolver over `load_paths`, made absolute against the
    /// current directory.
    pub fn new<I, P>(load_paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let load_paths = load_paths
            .into_iter()
            .map(|p| {
                let p = p.as_ref();
                std::path::absolute(p).unwrap_or_else(|_| p.to_path_buf())
            })
            .collect();
        Self { load_paths }
    }

    /// The load paths, in search order.
    pub fn load_paths(&self) -> &[PathBuf] {
        &self.load_paths
    }

    fn locate(&self, path: &str) -> Result<Located, ResolveError> {
        let requested = Path::new(path);
        if requested.is_absolute() {
            return self.locate_absolute(path, requested);
        }
        if requested
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(ResolveError::NotFound(path.to_string()));
        }

        let relative = path.trim_start_matches("./");
        let (stem, ext) = split_extension(relative);
        let index = (!ext.is_empty()).then(|| format!("{stem}/index{ext}"));

        for load_path in &self.load_paths {
            let file = load_path.join(relative);
            if file.is_file() {
                return Ok(Located {
                    file,
                    relative: relative.to_string(),
                });
            }
            if let Some(index) = &index {
                let file = load_path.join(index);
                if file.is_file() {
                    return Ok(Located {
                        file,
                        relative: index.clone(),
                    });
                }
            }
        }
        Err(ResolveError::NotFound(path.to_string()))
    }

    fn locate_absolute(&self, path: &str, requested: &Path) -> Result<Located, ResolveError> {
        let Some(relative) = self
            .load_paths
            .iter()
            .find_map(|load_path| requested.strip_prefix(load_path).ok())
        else {
            return Err(ResolveError::OutsideLoadPath(requested.to_path_buf()));
        };
        if !requested.is_file() {
            return Err(ResolveError::NotFound(path.to_string()));
        }
        Ok(Located {
            file: requested.to_path_buf(),
            relative: to_logical(relative),
        })
    }

    /// Turns directives into link strings the resolver accepts back.
    fn links(&self, relative: &str, directives: &[Directive]) -> Vec<String> {
        let base = logical_dirname(relative);
        let mut links = Vec::new();
        for directive in directives {
            match directive {
                Directive::Link(path) => links.push(join_relative(base, path)),
                Directive::LinkDirectory(dir) => {
                    self.each_directory(&join_relative(base, dir), |root| {
                        list_files(root, Some(1), &mut links)
                    });
                }
                Directive::LinkTree(dir) => {
                    self.each_directory(&join_relative(base, dir), |root| {
                        list_files(root, None, &mut links)
                    });
                }
            }
        }
        links
    }

    fn each_directory(&self, dir: &str, mut visit: impl FnMut(&Path)) {
        let mut found = false;
        for load_path in &self.load_paths {
            let root = load_path.join(dir);
            if root.is_dir() {
                found = true;
                visit(&root);
            }
        }
        if !found {
            warn!(directory = dir, "linked directory not found in any load path");
        }
    }
}

impl Resolver for DirectoryResolver {
    fn resolve(&self, path: &str) -> Result<ResolvedAsset, ResolveError> {
        let Located { file, relative } = self.locate(path)?;
        let logical_path = canonical_logical_path(&relative);
        let mime = mime_for(&logical_path);

        let raw = fs::read(&file).map_err(|source| ResolveError::Io {
            path: file.clone(),
            source,
        })?;
        let (bytes, links) = if mime.compressible {
            match String::from_utf8(raw) {
                Ok(text) => {
                    let header = parse_header(&text);
                    let links = self.links(&relative, &header.directives);
                    (header.body.into_bytes(), links)
                }
                Err(e) => (e.into_bytes(), Vec::new()),
            }
        } else {
            (raw, Vec::new())
        };

        let sha = Sha256::digest(&bytes);
        debug!(path, file = %file.display(), links = links.len(), "resolved");
        Ok(ResolvedAsset {
            digest_path: digest_path(&logical_path, &Fingerprint::of(&bytes)),
            source: file.display().to_string(),
            logical_path,
            digest: hex::encode(&sha),
            integrity: Some(format!("sha256-{}", STANDARD.encode(&sha))),
            mime_type: mime.name.to_string(),
            compressible: mime.compressible,
            links,
            bytes,
        })
    }
}

/// Resolves `./` and `../` prefixed paths against a logical directory.
/// Anything else is already a logical path.
fn join_relative(base: &str, path: &str) -> String {
    if !(path == "." || path.starts_with("./") || path.starts_with("../")) {
        return path.to_string();
    }
    let mut parts: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }
    parts.join("/")
}

fn list_files(root: &Path, max_depth: Option<usize>, out: &mut Vec<String>) {
    let mut walk = WalkDir::new(root).sort_by_file_name();
    if let Some(depth) = max_depth {
        walk = walk.max_depth(depth);
    }
    for entry in walk {
        match entry {
            Ok(entry) if entry.file_type().is_file() => {
                out.push(entry.path().display().to_string());
            }
            Ok(_) => {}
            Err(err) => debug!(%err, root = %root.display(), "skipping path during link walk"),
        }
    }
}

fn to_logical(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
