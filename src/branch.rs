//! Local branch enumeration and the protected-branch guard.

use crate::constants::{
    CURRENT_BRANCH_MARKER, DEV_BRANCH_PREFIX, MASTER_BRANCH, REMOTE_PREFIX,
    WORKTREE_BRANCH_MARKER,
};
use crate::error::{CleanupError, Result};
use crate::git::RepositoryClient;

/// A local branch as reported by `git branch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub name: String,
    /// Checked out in this working tree.
    pub is_current: bool,
    pub is_protected: bool,
    /// Checked out in another worktree.
    pub has_worktree: bool,
}

impl Branch {
    fn new(name: &str, is_current: bool, has_worktree: bool) -> Self {
        Self {
            name: name.to_string(),
            is_current,
            is_protected: is_protected_branch(name),
            has_worktree,
        }
    }

    /// Whether the branch may be considered for deletion at all.
    #[must_use]
    pub fn is_candidate(&self) -> bool {
        !self.is_protected && !self.is_current && !self.has_worktree
    }
}

/// Reports whether `name` is a shared development branch.
///
/// `master` and `dev.*` qualify, with or without a leading `origin/`.
#[must_use]
pub fn is_protected_branch(name: &str) -> bool {
    let name = name.strip_prefix(REMOTE_PREFIX).unwrap_or(name);
    name == MASTER_BRANCH || name.starts_with(DEV_BRANCH_PREFIX)
}

fn parse_branch_line(line: &str) -> Option<Branch> {
    let line = line.trim();
    let (name, is_current, has_worktree) =
        if let Some(name) = line.strip_prefix(CURRENT_BRANCH_MARKER) {
            (name, true, false)
        } else if let Some(name) = line.strip_prefix(WORKTREE_BRANCH_MARKER) {
            (name, false, true)
        } else {
            (line, false, false)
        };
    let name = name.trim();

    // "(HEAD detached at 1a2b3c)" and friends are not branches.
    if name.is_empty() || name.starts_with('(') {
        return None;
    }
    Some(Branch::new(name, is_current, has_worktree))
}

/// Parses `git branch` output.
#[must_use]
pub fn parse_branch_list(listing: &str) -> Vec<Branch> {
    listing.lines().filter_map(parse_branch_line).collect()
}

/// Lists local branches. Failure to enumerate is fatal.
pub fn list_branches(client: &dyn RepositoryClient) -> Result<Vec<Branch>> {
    let listing = client.list_branches().map_err(CleanupError::ListBranches)?;
    Ok(parse_branch_list(&listing))
}

/// Picks the branch whose history decides what is merged.
///
/// Defaults to the checked-out branch; `target` overrides it. The result must
/// be protected, otherwise the run stops before anything is touched.
pub fn resolve_target(branches: &[Branch], target: Option<&str>) -> Result<String> {
    let target = match target {
        Some(name) => name.to_string(),
        None => branches
            .iter()
            .find(|b| b.is_current)
            .map(|b| b.name.clone())
            .ok_or(CleanupError::NoTarget)?,
    };
    if !is_protected_branch(&target) {
        return Err(CleanupError::UnprotectedTarget(target));
    }
    Ok(target)
}
