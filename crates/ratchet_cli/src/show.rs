//! The `ratchet show` command.

use crate::project::Project;
use crate::GlobalArgs;

/// Prints the manifest document as pretty JSON.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = Project::load(global)?;
    let store = project.open_store(project.options())?;
    if global.verbose {
        eprintln!("manifest: {}", store.filename().display());
    }
    println!("{}", serde_json::to_string_pretty(&store.data())?);
    Ok(0)
}
