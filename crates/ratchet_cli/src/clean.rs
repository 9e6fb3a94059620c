//! The `ratchet remove`, `ratchet clean` and `ratchet clobber` commands.

use std::time::Duration;

use crate::project::Project;
use crate::{CleanArgs, GlobalArgs};

/// Runs the `ratchet remove` command. Returns exit code 1 if the digest path
/// is not in the manifest.
pub fn remove(digest_path: &str, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = Project::load(global)?;
    let store = project.open_store(project.options())?;
    if store.remove(digest_path)? {
        Ok(0)
    } else {
        eprintln!("{digest_path} is not in the manifest");
        Ok(1)
    }
}

/// Runs the `ratchet clean` command. Flags override the `[clean]` table.
pub fn run(args: &CleanArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = Project::load(global)?;
    let keep = args.keep.unwrap_or(project.config.clean.keep);
    let max_age = args
        .max_age
        .map(Duration::from_secs)
        .unwrap_or_else(|| project.config.clean.max_age());

    let store = project.open_store(project.options())?;
    let removed = store.clean(keep, max_age)?;
    if !global.quiet {
        println!("removed {} superseded file(s)", removed.len());
    }
    Ok(0)
}

/// Runs the `ratchet clobber` command.
pub fn clobber(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = Project::load(global)?;
    project.open_store(project.options())?.clobber()?;
    Ok(0)
}
