//! Bug tracker access.
//!
//! The triage passes only talk to the [`Tracker`] trait; [`BugzillaClient`]
//! is the REST implementation used by the binary.

mod bugzilla;
mod search;

pub use bugzilla::BugzillaClient;
pub use search::SavedSearch;

use crate::error::Result;
use crate::model::Bug;
use serde::Serialize;

pub trait Tracker {
    /// Fails with [`crate::error::BugwatchError::Auth`] when the credential is
    /// rejected.
    fn authenticate(&self) -> Result<()>;

    /// Bugs matching the saved search, in tracker order.
    fn query(&self, search: &SavedSearch) -> Result<Vec<Bug>>;

    fn update(&self, bug_id: u64, patch: &BugPatch) -> Result<()>;

    fn add_comment(&self, bug_id: u64, text: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeywordChange {
    pub remove: Vec<String>,
}

/// Fields to change on a bug. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BugPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<KeywordChange>,
}

impl BugPatch {
    pub fn assign(tracker_id: impl Into<String>) -> Self {
        Self {
            assigned_to: Some(tracker_id.into()),
            ..Self::default()
        }
    }

    pub fn remove_keyword(keyword: impl Into<String>) -> Self {
        Self {
            keywords: Some(KeywordChange {
                remove: vec![keyword.into()],
            }),
            ..Self::default()
        }
    }
}
