//! Configuration types deserialized from `ratchet.toml`.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The top-level project configuration parsed from `ratchet.toml`.
#[derive(Debug, Deserialize)]
pub struct RatchetConfig {
    /// Where compiled artifacts and the manifest are written.
    pub output: OutputConfig,
    /// Where source assets are looked up.
    #[serde(default)]
    pub resolver: ResolverConfig,
    /// Compile behavior (gzip sidecars, concurrency).
    #[serde(default)]
    pub compile: CompileConfig,
    /// Default retention policy for `clean`.
    #[serde(default)]
    pub clean: CleanConfig,
}

/// Output location settings.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Output directory, relative to the project root unless absolute.
    pub directory: String,
    /// Explicit manifest file. When absent the manifest is discovered in
    /// (or generated for) the output directory.
    #[serde(default)]
    pub manifest: Option<String>,
}

/// Source lookup settings for the filesystem resolver.
#[derive(Debug, Default, Deserialize)]
pub struct ResolverConfig {
    /// Ordered load paths; the first directory containing an asset wins.
    #[serde(default)]
    pub load_paths: Vec<String>,
}

/// Compile-time behavior switches.
#[derive(Debug, Deserialize)]
pub struct CompileConfig {
    /// Write `.gz` sidecars for compressible artifacts.
    #[serde(default = "default_true")]
    pub gzip: bool,
    /// Run exporters and postprocessors on a worker pool.
    #[serde(default = "default_true")]
    pub concurrent: bool,
    /// Worker pool size. Zero lets the pool pick one worker per CPU.
    #[serde(default)]
    pub workers: usize,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            gzip: true,
            concurrent: true,
            workers: 0,
        }
    }
}

/// Retention defaults for `clean`.
#[derive(Debug, Deserialize)]
pub struct CleanConfig {
    /// Number of versions kept per logical path, counting the current one.
    #[serde(default = "default_keep")]
    pub keep: usize,
    /// Superseded versions younger than this many seconds are kept.
    #[serde(default = "default_max_age")]
    pub max_age: u64,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            keep: default_keep(),
            max_age: default_max_age(),
        }
    }
}

impl CleanConfig {
    /// Returns `max_age` as a [`Duration`].
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age)
    }
}

fn default_true() -> bool {
    true
}

fn default_keep() -> usize {
    2
}

fn default_max_age() -> u64 {
    3600
}

impl RatchetConfig {
    /// Absolute output directory for a project rooted at `root`.
    pub fn output_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.output.directory)
    }

    /// Absolute explicit manifest path, if one is configured.
    pub fn manifest_path(&self, root: &Path) -> Option<PathBuf> {
        self.output.manifest.as_ref().map(|m| root.join(m))
    }

    /// Absolute load paths, in configured order.
    pub fn load_paths(&self, root: &Path) -> Vec<PathBuf> {
        self.resolver.load_paths.iter().map(|p| root.join(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_defaults() {
        let c = CompileConfig::default();
        assert!(c.gzip);
        assert!(c.concurrent);
        assert_eq!(c.workers, 0);
    }

    #[test]
    fn clean_defaults() {
        let c = CleanConfig::default();
        assert_eq!(c.keep, 2);
        assert_eq!(c.max_age(), Duration::from_secs(3600));
    }

    #[test]
    fn paths_join_project_root() {
        let config: RatchetConfig = toml::from_str(
            r#"
[output]
directory = "public/assets"
manifest = "public/assets/manifest.json"

[resolver]
load_paths = ["app/assets", "vendor/assets"]
"#,
        )
        .unwrap();
        let root = Path::new("/srv/site");
        assert_eq!(config.output_dir(root), PathBuf::from("/srv/site/public/assets"));
        assert_eq!(
            config.manifest_path(root),
            Some(PathBuf::from("/srv/site/public/assets/manifest.json"))
        );
        assert_eq!(
            config.load_paths(root),
            vec![
                PathBuf::from("/srv/site/app/assets"),
                PathBuf::from("/srv/site/vendor/assets")
            ]
        );
    }

    #[test]
    fn absolute_output_directory_is_kept() {
        let config: RatchetConfig = toml::from_str(
            r#"
[output]
directory = "/var/www/assets"
"#,
        )
        .unwrap();
        assert_eq!(
            config.output_dir(Path::new("/srv/site")),
            PathBuf::from("/var/www/assets")
        );
        assert!(config.manifest_path(Path::new("/srv/site")).is_none());
    }
}
