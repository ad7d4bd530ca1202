// Branch cleanup pass, outcome types, callbacks

use crate::branch::{self, Branch};
use crate::change_id;
use crate::classify::is_submitted;
use crate::config::Config;
use crate::constants::MAILED_TAG_SUFFIX;
use crate::error::{CleanupError, Result};
use crate::git::RepositoryClient;
use crate::history::{HistoryCache, HistoryIndex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// `master` or a `dev.` branch.
    Protected,
    CheckedOut,
    /// Tip has no `Change-Id` footer, or could not be read.
    NoChangeId,
    NotSubmitted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagOutcome {
    Absent,
    Deleted { short_ref: String },
    WouldDelete { short_ref: String },
    Failed { short_ref: String, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchOutcome {
    Deleted { short_ref: String, tag: TagOutcome },
    WouldDelete { short_ref: String, tag: TagOutcome },
    Failed {
        short_ref: String,
        error: String,
        tag: TagOutcome,
    },
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchReport {
    pub branch: String,
    pub change_id: Option<String>,
    pub outcome: BranchOutcome,
}

impl BranchReport {
    #[must_use]
    pub fn tag(&self) -> Option<&TagOutcome> {
        match &self.outcome {
            BranchOutcome::Deleted { tag, .. }
            | BranchOutcome::WouldDelete { tag, .. }
            | BranchOutcome::Failed { tag, .. } => Some(tag),
            BranchOutcome::Skipped(_) => None,
        }
    }
}

/// Everything one pass decided, in branch listing order.
///
/// Branches checked out in another worktree are left out entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupReport {
    pub target: String,
    pub branches: Vec<BranchReport>,
}

impl CleanupReport {
    pub fn deleted(&self) -> impl Iterator<Item = &BranchReport> {
        self.branches.iter().filter(|r| {
            matches!(
                r.outcome,
                BranchOutcome::Deleted { .. } | BranchOutcome::WouldDelete { .. }
            )
        })
    }

    pub fn failed(&self) -> impl Iterator<Item = &BranchReport> {
        self.branches
            .iter()
            .filter(|r| matches!(r.outcome, BranchOutcome::Failed { .. }))
    }

    pub fn skipped(&self) -> impl Iterator<Item = &BranchReport> {
        self.branches
            .iter()
            .filter(|r| matches!(r.outcome, BranchOutcome::Skipped(_)))
    }

    /// Names of branches that were removed (or would be, in a dry run).
    #[must_use]
    pub fn deleted_names(&self) -> Vec<&str> {
        self.deleted().map(|r| r.branch.as_str()).collect()
    }
}

/// Hooks for reporting progress while the pass runs.
///
/// The `on_removing_*` hooks fire before the ref is touched so the printed
/// short ref can be used to restore it.
pub trait CleanupCallbacks {
    fn on_target(&self, _target: &str) {}
    fn on_scan_start(&self, _branch: &str) {}
    fn on_scan_complete(&self, _branch: &str, _merged: &HistoryIndex) {}
    fn on_removing_branch(&self, branch: &str, short_ref: &str);
    fn on_removing_tag(&self, tag: &str, short_ref: &str);
    fn on_failure(&self, message: &str);
    fn on_branch_complete(&self, _report: &BranchReport) {}
}

/// Runs one cleanup pass.
///
/// `target` overrides the checked-out branch as the merged baseline. Returns
/// `Err` only for failures that make further deletions unsafe; per-branch
/// failures are recorded in the report.
pub fn run(
    client: &dyn RepositoryClient,
    target: Option<&str>,
    config: &Config,
    callbacks: &dyn CleanupCallbacks,
) -> Result<CleanupReport> {
    let branches = branch::list_branches(client)?;
    let target = branch::resolve_target(&branches, target)?;
    callbacks.on_target(&target);

    let mut pass = Pass {
        client,
        config,
        callbacks,
        cache: HistoryCache::new(),
        target,
    };

    let mut reports = Vec::new();
    for branch in branches.iter().filter(|b| !b.has_worktree) {
        let report = pass.process(branch)?;
        callbacks.on_branch_complete(&report);
        reports.push(report);
    }

    Ok(CleanupReport {
        target: pass.target,
        branches: reports,
    })
}

struct Pass<'a> {
    client: &'a dyn RepositoryClient,
    config: &'a Config,
    callbacks: &'a dyn CleanupCallbacks,
    cache: HistoryCache,
    target: String,
}

impl Pass<'_> {
    fn process(&mut self, branch: &Branch) -> Result<BranchReport> {
        let report = |change_id: Option<String>, outcome: BranchOutcome| BranchReport {
            branch: branch.name.clone(),
            change_id,
            outcome,
        };

        if branch.is_protected {
            return Ok(report(None, BranchOutcome::Skipped(SkipReason::Protected)));
        }
        if branch.is_current {
            return Ok(report(None, BranchOutcome::Skipped(SkipReason::CheckedOut)));
        }

        let change_id = match change_id::branch_change_id(self.client, &branch.name) {
            Ok(id) => id,
            Err(err) => {
                self.callbacks.on_failure(&format!("{:#}", err));
                None
            }
        };
        let Some(id) = change_id.as_deref() else {
            return Ok(report(None, BranchOutcome::Skipped(SkipReason::NoChangeId)));
        };

        if !is_submitted(id, self.merged_history()?) {
            return Ok(report(
                change_id,
                BranchOutcome::Skipped(SkipReason::NotSubmitted),
            ));
        }

        let outcome = self.remove(&branch.name)?;
        Ok(report(change_id, outcome))
    }

    fn merged_history(&mut self) -> Result<&HistoryIndex> {
        let fresh = !self.cache.is_cached(&self.target);
        if fresh {
            self.callbacks.on_scan_start(&self.target);
        }
        let merged = self
            .cache
            .get_or_scan(self.client, &self.target)
            .map_err(|source| CleanupError::HistoryScan {
                branch: self.target.clone(),
                source,
            })?;
        if fresh {
            self.callbacks.on_scan_complete(&self.target, merged);
        }
        Ok(merged)
    }

    fn remove(&self, branch: &str) -> Result<BranchOutcome> {
        let reference = format!("refs/heads/{}", branch);
        let short_ref = self
            .client
            .resolve_short_ref(&reference)
            .map_err(|source| CleanupError::ShortRef { reference, source })?;
        self.callbacks.on_removing_branch(branch, &short_ref);

        if self.config.dry_run {
            let tag = self.remove_tag(branch);
            return Ok(BranchOutcome::WouldDelete { short_ref, tag });
        }

        let deletion = self.client.delete_branch(branch);
        if let Err(err) = &deletion {
            self.callbacks
                .on_failure(&format!("Error removing branch {}: {:#}", branch, err));
        }
        let tag = self.remove_tag(branch);

        Ok(match deletion {
            Ok(()) => BranchOutcome::Deleted { short_ref, tag },
            Err(err) => BranchOutcome::Failed {
                short_ref,
                error: format!("{:#}", err),
                tag,
            },
        })
    }

    fn remove_tag(&self, branch: &str) -> TagOutcome {
        let tag = format!("{}{}", branch, MAILED_TAG_SUFFIX);
        let Ok(short_ref) = self.client.resolve_short_ref(&format!("refs/tags/{}", tag)) else {
            return TagOutcome::Absent;
        };
        self.callbacks.on_removing_tag(&tag, &short_ref);

        if self.config.dry_run {
            return TagOutcome::WouldDelete { short_ref };
        }
        match self.client.delete_tag(&tag) {
            Ok(()) => TagOutcome::Deleted { short_ref },
            Err(err) => {
                let error = format!("{:#}", err);
                self.callbacks
                    .on_failure(&format!("Error removing tag {}: {}", tag, error));
                TagOutcome::Failed { short_ref, error }
            }
        }
    }
}
