//! Retention policy for superseded artifact versions.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::manifest::ManifestData;

/// How many versions of each logical path to keep, and for how long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Versions kept per logical path, counting the current one.
    pub keep: usize,
    /// Superseded versions younger than this are kept regardless of rank.
    pub max_age: Duration,
}

impl RetentionPolicy {
    /// Creates a policy.
    pub fn new(keep: usize, max_age: Duration) -> Self {
        Self { keep, max_age }
    }

    /// Returns the digest paths this policy would delete, as of `now`.
    ///
    /// The current version of a logical path is never selected. Older
    /// versions are walked newest first; each is kept while it is within
    /// `keep` versions of the newest or younger than `max_age`, and the first
    /// one failing both tests is selected together with everything older.
    pub fn stale_entries(&self, data: &ManifestData, now: DateTime<Utc>) -> Vec<String> {
        let mut stale = Vec::new();

        for (logical_path, mut versions) in data.versions() {
            let current = data.current(logical_path);
            versions.retain(|(digest_path, _)| Some(*digest_path) != current);
            versions.sort_by(|(a_path, a), (b_path, b)| {
                b.mtime.cmp(&a.mtime).then_with(|| a_path.cmp(b_path))
            });

            let first_rank = usize::from(current.is_some());
            let cut = versions.iter().enumerate().position(|(i, (_, entry))| {
                let age = (now - entry.mtime).to_std().unwrap_or(Duration::ZERO);
                first_rank + i >= self.keep && age >= self.max_age
            });

            if let Some(cut) = cut {
                stale.extend(versions[cut..].iter().map(|(d, _)| d.to_string()));
            }
        }

        stale
    }
}
