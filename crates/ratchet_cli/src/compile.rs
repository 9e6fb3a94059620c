//! The `ratchet compile` and `ratchet sources` commands.

use std::io::Write;

use tracing::warn;

use crate::project::Project;
use crate::{CompileArgs, GlobalArgs};

/// Runs the `ratchet compile` command.
///
/// Prints the on-disk path of every artifact in the compiled set.
pub fn run(args: &CompileArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = Project::load(global)?;
    let mut options = project.options();
    if args.no_gzip {
        options.gzip = false;
    }
    if args.sequential {
        options.concurrent = false;
    }

    let store = project.open_compiler(options)?;
    let targets = store.compile(&args.paths)?;

    if !global.quiet {
        for target in &targets {
            println!("{}", target.display());
        }
    }
    Ok(0)
}

/// Runs the `ratchet sources` command, writing each asset's published bytes
/// to stdout in request order.
///
/// Paths missing from the manifest are skipped with a warning.
pub fn sources(paths: &[String], global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = Project::load(global)?;
    let store = project.open_store(project.options())?;

    let assets = store.assets();
    for missing in paths.iter().filter(|p| !assets.contains_key(p.as_str())) {
        warn!(logical_path = %missing, "not in manifest, skipping");
    }

    let mut stdout = std::io::stdout().lock();
    for bytes in store.find_sources(paths)? {
        stdout.write_all(&bytes)?;
    }
    stdout.flush()?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::tests::make_project;

    fn compile_args(paths: &[&str]) -> CompileArgs {
        CompileArgs {
            paths: paths.iter().map(|p| p.to_string()).collect(),
            no_gzip: false,
            sequential: false,
        }
    }

    #[test]
    fn compile_publishes_links_and_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        let global = make_project(tmp.path());
        assert_eq!(run(&compile_args(&["application.js"]), &global).unwrap(), 0);

        let project = Project::load(&global).unwrap();
        let store = project.open_store(project.options()).unwrap();
        let assets = store.assets();
        assert!(assets.contains_key("application.js"));
        assert!(assets.contains_key("site.css"));
        let out = tmp.path().join("public/assets");
        assert!(out.join(&assets["site.css"]).is_file());
        assert!(out.join(format!("{}.gz", assets["site.css"])).is_file());
    }

    #[test]
    fn no_gzip_skips_sidecars() {
        let tmp = tempfile::tempdir().unwrap();
        let global = make_project(tmp.path());
        let args = CompileArgs {
            no_gzip: true,
            ..compile_args(&["site.css"])
        };
        run(&args, &global).unwrap();

        let project = Project::load(&global).unwrap();
        let store = project.open_store(project.options()).unwrap();
        let digest_path = store.assets()["site.css"].clone();
        let out = tmp.path().join("public/assets");
        assert!(out.join(&digest_path).is_file());
        assert!(!out.join(format!("{digest_path}.gz")).exists());
    }

    #[test]
    fn compile_unknown_asset_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let global = make_project(tmp.path());
        let err = run(&compile_args(&["missing.js"]), &global).unwrap_err();
        assert!(err.to_string().contains("missing.js"));
    }

    #[test]
    fn sources_succeeds_with_missing_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let global = make_project(tmp.path());
        run(&compile_args(&["site.css"]), &global).unwrap();
        let paths = vec!["site.css".to_string(), "missing.js".to_string()];
        assert_eq!(sources(&paths, &global).unwrap(), 0);
    }
}
