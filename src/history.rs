//! Merged-history index and its per-run cache.
//!
//! Scanning a protected branch walks its whole ancestry, so each branch is
//! scanned at most once per run. The cache is never refreshed: history that
//! changes underneath a running pass is not picked up.

use crate::change_id::extract_change_id;
use crate::git::RepositoryClient;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

/// Every `Change-Id` reachable from one branch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryIndex {
    ids: HashSet<String>,
}

impl HistoryIndex {
    #[must_use]
    pub fn contains(&self, change_id: &str) -> bool {
        self.ids.contains(change_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for HistoryIndex {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Streams the log of `branch` and collects every `Change-Id` footer.
///
/// Lines are matched with the same pattern as branch tips, so a footer found
/// at a tip is always found in history.
///
/// Duplicates collapse: several commits sharing an identifier (cherry-picks,
/// rebased copies) count as the same change.
pub fn scan_history(client: &dyn RepositoryClient, branch: &str) -> anyhow::Result<HistoryIndex> {
    let mut ids = HashSet::new();
    client.scan_history(branch, &mut |line| {
        if let Some(id) = extract_change_id(line) {
            ids.insert(id.to_string());
        }
    })?;
    Ok(HistoryIndex { ids })
}

/// Get-or-scan cache of [`HistoryIndex`] keyed by branch name.
///
/// Owned by one cleanup run and dropped with it. Failed scans are not cached.
#[derive(Debug, Default)]
pub struct HistoryCache {
    entries: HashMap<String, HistoryIndex>,
}

impl HistoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_scan(
        &mut self,
        client: &dyn RepositoryClient,
        branch: &str,
    ) -> anyhow::Result<&HistoryIndex> {
        match self.entries.entry(branch.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => Ok(entry.insert(scan_history(client, branch)?)),
        }
    }

    #[must_use]
    pub fn is_cached(&self, branch: &str) -> bool {
        self.entries.contains_key(branch)
    }
}
