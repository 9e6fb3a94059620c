//! Link-graph expansion.
//!
//! Compiling an asset also publishes everything it links to, transitively.
//! The expander walks links depth first, publishing each digest path once,
//! and refuses to let two different sources claim the same logical path.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::ManifestError;
use crate::resolver::{ResolvedAsset, Resolver};

/// Expands requested paths into the full set of assets to publish.
pub struct LinkExpander<'r> {
    resolver: &'r dyn Resolver,
}

impl<'r> LinkExpander<'r> {
    /// Creates an expander over `resolver`.
    pub fn new(resolver: &'r dyn Resolver) -> Self {
        Self { resolver }
    }

    /// Resolves every requested path and everything reachable through links.
    ///
    /// The result is in discovery order: each requested asset, then its links
    /// depth first, before the next requested path. An asset reached again
    /// through another path or alias is skipped. Reaching one logical path
    /// from two different sources fails with [`ManifestError::DoubleLink`].
    pub fn expand<S: AsRef<str>>(
        &self,
        requested: &[S],
    ) -> Result<Vec<ResolvedAsset>, ManifestError> {
        let mut visited: HashSet<String> = HashSet::new();
        let mut claimed: HashMap<String, String> = HashMap::new();
        let mut expanded = Vec::new();

        for path in requested {
            let parent = path.as_ref();
            let mut stack = vec![parent.to_string()];

            while let Some(next) = stack.pop() {
                let asset = self.resolver.resolve(&next)?;

                match claimed.get(&asset.logical_path) {
                    Some(last) if *last != asset.source => {
                        return Err(ManifestError::DoubleLink {
                            parent: parent.to_string(),
                            logical_path: asset.logical_path,
                            last_source: last.clone(),
                            conflicting_source: asset.source,
                        });
                    }
                    Some(_) => {}
                    None => {
                        claimed.insert(asset.logical_path.clone(), asset.source.clone());
                    }
                }

                if !visited.insert(asset.digest_path.clone()) {
                    debug!(digest_path = %asset.digest_path, via = %next, "already linked");
                    continue;
                }

                // Reversed so the first declared link is expanded first.
                stack.extend(asset.links.iter().rev().cloned());
                expanded.push(asset);
            }
        }

        Ok(expanded)
    }
}
