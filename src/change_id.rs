//! `Change-Id` footer extraction.

use crate::git::RepositoryClient;
use regex::Regex;
use std::sync::LazyLock;

static CHANGE_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*Change-Id:\s*(I[0-9a-f]+)").expect("valid Change-Id pattern")
});

/// Returns the first `Change-Id` footer found in `text`, in document order.
#[must_use]
pub fn extract_change_id(text: &str) -> Option<&str> {
    CHANGE_ID_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Reads the `Change-Id` at the tip of `branch`.
///
/// `Ok(None)` means the tip carries no footer. `Err` means the tip could not
/// be shown; callers treat that branch as untracked.
pub fn branch_change_id(
    client: &dyn RepositoryClient,
    branch: &str,
) -> anyhow::Result<Option<String>> {
    let text = client.show_commit(branch)?;
    Ok(extract_change_id(&text).map(str::to_string))
}
