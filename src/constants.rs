//! Application-wide constants.
//!
//! Centralized names and markers so the guard, scanner and orchestrator agree
//! on them.

/// The main line. Always protected.
pub const MASTER_BRANCH: &str = "master";

/// Prefix of shared development lines (`dev.go2go`, `dev.1.5`, ...).
pub const DEV_BRANCH_PREFIX: &str = "dev.";

/// Remote prefix stripped before applying the protected-branch predicate.
pub const REMOTE_PREFIX: &str = "origin/";

/// Suffix of the companion tag left behind when a change is mailed.
pub const MAILED_TAG_SUFFIX: &str = ".mailed";

/// Prefix `git branch` puts in front of the checked-out branch.
pub const CURRENT_BRANCH_MARKER: &str = "* ";

/// Prefix `git branch` puts in front of branches checked out in another worktree.
pub const WORKTREE_BRANCH_MARKER: &str = "+ ";

/// Progress spinner tick interval in milliseconds.
pub const PROGRESS_TICK_MS: u64 = 80;
