//! Decides whether a branch's change has already landed.

use crate::history::HistoryIndex;

/// Reports whether `change_id` appears in the merged history.
///
/// An empty identifier is never submitted: untracked branches are kept.
#[must_use]
pub fn is_submitted(change_id: &str, merged: &HistoryIndex) -> bool {
    !change_id.is_empty() && merged.contains(change_id)
}
