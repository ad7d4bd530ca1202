//! Gerrit branch janitor library.
//!
//! This crate removes local branches whose change has already been merged by:
//! - Listing local branches and resolving the protected target branch
//! - Reading the `Change-Id` footer at the tip of every candidate branch
//! - Indexing every `Change-Id` reachable from the target branch
//! - Force-deleting submitted branches and their `.mailed` tags

pub mod branch;
pub mod change_id;
pub mod classify;
pub mod cleanup;
pub mod config;
pub mod constants;
pub mod error;
pub mod git;
pub mod history;
pub mod output;

#[cfg(test)]
pub(crate) mod test_support;
