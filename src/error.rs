//! Fatal errors that abort a cleanup run.
//!
//! Anything that would compromise the safety of a deletion ends up here.
//! Failures confined to one branch are recorded in the run report instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CleanupError {
    #[error("cannot list branches")]
    ListBranches(#[source] anyhow::Error),

    /// No branch is checked out and no target was given.
    #[error("no current branch; pass the target branch explicitly")]
    NoTarget,

    #[error("selected branch {0}; must be a master or a dev branch")]
    UnprotectedTarget(String),

    #[error("cannot read merged history of {branch}")]
    HistoryScan {
        branch: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("cannot resolve {reference} before deleting it")]
    ShortRef {
        reference: String,
        #[source]
        source: anyhow::Error,
    },
}

pub type Result<T> = std::result::Result<T, CleanupError>;
