//! Shared project helpers for CLI commands.
//!
//! Locates the project root, loads `ratchet.toml`, and opens the manifest
//! store and resolver it describes.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ratchet_config::{load_config, RatchetConfig, CONFIG_FILE};
use ratchet_manifest::{ManifestLocation, ManifestOptions, ManifestStore};
use ratchet_resolver::DirectoryResolver;
use tracing::debug;

use crate::GlobalArgs;

/// A loaded project: its root directory and configuration.
pub struct Project {
    /// Directory containing `ratchet.toml`.
    pub root: PathBuf,
    /// The parsed configuration.
    pub config: RatchetConfig,
}

impl Project {
    /// Loads the project selected by the global CLI args.
    pub fn load(global: &GlobalArgs) -> Result<Self, Box<dyn std::error::Error>> {
        let root = resolve_project_root(global)?;
        let config = load_config(&root)?;
        debug!(root = %root.display(), "loaded project");
        Ok(Self { root, config })
    }

    /// Manifest options from the `[compile]` table.
    pub fn options(&self) -> ManifestOptions {
        ManifestOptions {
            gzip: self.config.compile.gzip,
            concurrent: self.config.compile.concurrent,
            workers: self.config.compile.workers,
        }
    }

    /// Opens the manifest store, preferring an explicitly configured
    /// manifest file over the output directory.
    pub fn open_store(
        &self,
        options: ManifestOptions,
    ) -> Result<ManifestStore, Box<dyn std::error::Error>> {
        let location = match self.config.manifest_path(&self.root) {
            Some(file) => ManifestLocation::for_file(&file),
            None => ManifestLocation::for_directory(&self.config.output_dir(&self.root)),
        };
        Ok(ManifestStore::at(location, options)?)
    }

    /// Opens the manifest store with the configured resolver attached.
    pub fn open_compiler(
        &self,
        options: ManifestOptions,
    ) -> Result<ManifestStore, Box<dyn std::error::Error>> {
        let load_paths = self.config.load_paths(&self.root);
        if load_paths.is_empty() {
            return Err(format!("no resolver.load_paths configured in {CONFIG_FILE}").into());
        }
        let resolver = DirectoryResolver::new(load_paths);
        Ok(self.open_store(options)?.with_resolver(Arc::new(resolver)))
    }
}

/// Walks up from `start` looking for the nearest directory containing `ratchet.toml`.
///
/// Returns the directory containing `ratchet.toml`, or an error if none is found.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Resolves the project root directory from global CLI args.
///
/// If `--config` is specified, uses that path (file → parent dir, dir → itself).
/// Otherwise walks up from the current directory looking for `ratchet.toml`.
pub fn resolve_project_root(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(ref config_path) = global.config {
        let p = PathBuf::from(config_path);
        if p.is_file() {
            Ok(p.parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".")))
        } else {
            Ok(p)
        }
    } else {
        find_project_root(&std::env::current_dir()?)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;

    /// Writes a project with two assets under `app/` and returns global
    /// args pointing at it.
    pub(crate) fn make_project(root: &Path) -> GlobalArgs {
        fs::write(
            root.join(CONFIG_FILE),
            r#"
[output]
directory = "public/assets"

[resolver]
load_paths = ["app"]

[compile]
concurrent = false
"#,
        )
        .unwrap();
        fs::create_dir_all(root.join("app")).unwrap();
        fs::write(root.join("app/application.js"), "//= link site.css\nvar app;\n").unwrap();
        fs::write(root.join("app/site.css"), "body {}\n").unwrap();
        GlobalArgs {
            quiet: true,
            verbose: false,
            config: Some(root.display().to_string()),
        }
    }

    #[test]
    fn find_project_root_in_current_dir() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "").unwrap();
        let root = find_project_root(tmp.path()).unwrap();
        assert_eq!(root, tmp.path());
    }

    #[test]
    fn find_project_root_in_parent() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "").unwrap();
        let sub = tmp.path().join("app").join("admin");
        fs::create_dir_all(&sub).unwrap();
        let root = find_project_root(&sub).unwrap();
        assert_eq!(root, tmp.path());
    }

    #[test]
    fn find_project_root_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let result = find_project_root(tmp.path());
        assert!(result.is_err());
    }

    #[test]
    fn config_flag_accepts_file_or_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let global = make_project(tmp.path());
        assert_eq!(resolve_project_root(&global).unwrap(), tmp.path());

        let by_file = GlobalArgs {
            config: Some(tmp.path().join(CONFIG_FILE).display().to_string()),
            ..global
        };
        assert_eq!(resolve_project_root(&by_file).unwrap(), tmp.path());
    }

    #[test]
    fn load_reads_config_and_options() {
        let tmp = tempfile::tempdir().unwrap();
        let project = Project::load(&make_project(tmp.path())).unwrap();
        assert_eq!(project.config.output.directory, "public/assets");
        let options = project.options();
        assert!(options.gzip);
        assert!(!options.concurrent);
    }

    #[test]
    fn open_compiler_requires_load_paths() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "[output]\ndirectory = \"public\"\n",
        )
        .unwrap();
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            config: Some(tmp.path().display().to_string()),
        };
        let project = Project::load(&global).unwrap();
        assert!(project.open_compiler(project.options()).is_err());
        assert!(project.open_store(project.options()).is_ok());
    }

    #[test]
    fn explicit_manifest_path_is_used() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "[output]\ndirectory = \"public\"\nmanifest = \"public/manifest.json\"\n",
        )
        .unwrap();
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            config: Some(tmp.path().display().to_string()),
        };
        let project = Project::load(&global).unwrap();
        let store = project.open_store(project.options()).unwrap();
        assert_eq!(store.filename(), tmp.path().join("public/manifest.json"));
    }

    #[test]
    fn explicit_manifest_path_need_not_end_in_json() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "[output]\ndirectory = \"public\"\nmanifest = \"public/assets.manifest\"\n",
        )
        .unwrap();
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            config: Some(tmp.path().display().to_string()),
        };
        let project = Project::load(&global).unwrap();
        let store = project.open_store(project.options()).unwrap();
        assert_eq!(store.filename(), tmp.path().join("public/assets.manifest"));
        assert_eq!(store.directory(), tmp.path().join("public"));
    }
}
