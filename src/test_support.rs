//! In-memory [`RepositoryClient`] used by unit tests.

use crate::git::RepositoryClient;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

/// Canned repository state. Every call is recorded as a short command line
/// (`show featY`, `log master`, `branch -D featY`, ...).
#[derive(Debug, Default)]
pub struct FakeRepo {
    listing: Option<String>,
    tips: HashMap<String, String>,
    histories: HashMap<String, Vec<String>>,
    refs: HashMap<String, String>,
    failing_branch_deletes: HashSet<String>,
    failing_tag_deletes: HashSet<String>,
    calls: RefCell<Vec<String>>,
}

impl FakeRepo {
    pub fn new(listing: &str) -> Self {
        Self {
            listing: Some(listing.to_string()),
            ..Self::default()
        }
    }

    /// A repository whose branch listing fails.
    pub fn broken() -> Self {
        Self::default()
    }

    /// Sets the tip commit of `branch` and registers its short ref.
    pub fn tip(mut self, branch: &str, show: &str) -> Self {
        self.tips.insert(branch.to_string(), show.to_string());
        self.short_ref(&format!("refs/heads/{}", branch), &short_hash(branch))
    }

    /// Sets the tip commit of `branch` without a resolvable short ref.
    pub fn tip_without_ref(mut self, branch: &str, show: &str) -> Self {
        self.tips.insert(branch.to_string(), show.to_string());
        self
    }

    pub fn history(mut self, branch: &str, lines: &[&str]) -> Self {
        self.histories.insert(
            branch.to_string(),
            lines.iter().map(|l| l.to_string()).collect(),
        );
        self
    }

    pub fn short_ref(mut self, reference: &str, short: &str) -> Self {
        self.refs.insert(reference.to_string(), short.to_string());
        self
    }

    pub fn mailed_tag(self, branch: &str) -> Self {
        let tag = format!("{}.mailed", branch);
        let short = short_hash(&tag);
        self.short_ref(&format!("refs/tags/{}", tag), &short)
    }

    pub fn failing_branch_delete(mut self, branch: &str) -> Self {
        self.failing_branch_deletes.insert(branch.to_string());
        self
    }

    pub fn failing_tag_delete(mut self, tag: &str) -> Self {
        self.failing_tag_deletes.insert(tag.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    pub fn attempted_branch_deletes(&self) -> Vec<String> {
        self.stripped_calls("branch -D ")
    }

    pub fn attempted_tag_deletes(&self) -> Vec<String> {
        self.stripped_calls("tag -d ")
    }

    fn stripped_calls(&self, prefix: &str) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| c.strip_prefix(prefix).map(str::to_string))
            .collect()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

fn short_hash(seed: &str) -> String {
    let sum: u32 = seed.bytes().map(u32::from).sum();
    format!("{:07x}", sum)
}

impl RepositoryClient for FakeRepo {
    fn list_branches(&self) -> anyhow::Result<String> {
        self.record("branch".to_string());
        self.listing
            .clone()
            .ok_or_else(|| anyhow::anyhow!("fatal: not a git repository"))
    }

    fn show_commit(&self, rev: &str) -> anyhow::Result<String> {
        self.record(format!("show {}", rev));
        self.tips
            .get(rev)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("fatal: bad revision '{}'", rev))
    }

    fn scan_history(&self, rev: &str, on_line: &mut dyn FnMut(&str)) -> anyhow::Result<()> {
        self.record(format!("log {}", rev));
        let lines = self
            .histories
            .get(rev)
            .ok_or_else(|| anyhow::anyhow!("fatal: ambiguous argument '{}'", rev))?;
        for line in lines {
            on_line(line);
        }
        Ok(())
    }

    fn resolve_short_ref(&self, reference: &str) -> anyhow::Result<String> {
        self.record(format!("rev-parse {}", reference));
        self.refs
            .get(reference)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("fatal: Needed a single revision"))
    }

    fn delete_branch(&self, name: &str) -> anyhow::Result<()> {
        self.record(format!("branch -D {}", name));
        if self.failing_branch_deletes.contains(name) {
            anyhow::bail!("error: cannot delete branch '{}'", name);
        }
        Ok(())
    }

    fn delete_tag(&self, name: &str) -> anyhow::Result<()> {
        self.record(format!("tag -d {}", name));
        if self.failing_tag_deletes.contains(name) {
            anyhow::bail!("error: could not delete tag '{}'", name);
        }
        Ok(())
    }
}
