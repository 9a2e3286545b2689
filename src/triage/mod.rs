//! Batch runners.
//!
//! Each pass fetches one saved search and walks the bugs in tracker order.
//! A failed fetch aborts the pass before any bug is touched. Failures on a
//! single bug are logged and counted, and the pass moves on, except for
//! authentication and configuration errors which stop the whole run.

mod doctext;
mod post;
mod pre;

pub use doctext::doctext;
pub use post::posttriage;
pub use pre::pretriage;

use crate::config::RetrySettings;
use crate::error::{BugwatchError, Result};
use crate::model::Bug;
use crate::notify::Notifier;
use crate::retry::{RetryPolicy, Sleeper};
use crate::tracker::{SavedSearch, Tracker};
use serde::Serialize;

/// Retry policy per call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policies {
    pub fetch: RetryPolicy,
    pub mutate: RetryPolicy,
    pub notify: RetryPolicy,
}

impl Policies {
    pub fn from_settings(retry: &RetrySettings) -> Self {
        Self {
            fetch: retry.fetch.policy(),
            mutate: retry.mutate.policy(),
            notify: retry.notify.policy(),
        }
    }
}

/// Collaborators and switches shared by every pass.
pub struct Batch<'a> {
    pub tracker: &'a dyn Tracker,
    pub notifier: &'a dyn Notifier,
    pub sleeper: &'a dyn Sleeper,
    pub policies: Policies,
    /// Decide and log, but do not mutate bugs or send notifications.
    pub dry_run: bool,
}

/// Outcome counts for one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Bugs returned by the saved search.
    pub found: usize,
    /// Bugs updated on the tracker.
    pub changed: usize,
    /// Notifications delivered.
    pub notified: usize,
    /// Actions left out because of `--dry-run`.
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

impl Batch<'_> {
    /// Authenticate, then run the saved search. Both go through the fetch
    /// policy; an error here is fatal for the pass.
    fn fetch(&self, search: &SavedSearch) -> Result<Vec<Bug>> {
        tracing::info!("Fetching bugs...");
        self.policies
            .fetch
            .run("authenticate", self.sleeper, |_| self.tracker.authenticate())?;
        let bugs = self
            .policies
            .fetch
            .run("fetch bugs", self.sleeper, |_| self.tracker.query(search))?;
        tracing::info!(count = bugs.len(), "Found {} bugs", bugs.len());
        Ok(bugs)
    }

    /// Count a per-bug failure, or hand it back when it must stop the run.
    fn record_failure(&self, summary: &mut RunSummary, bug_id: u64, err: BugwatchError) -> Result<()> {
        match err {
            BugwatchError::Auth(_) | BugwatchError::Config(_) => Err(err),
            err => {
                tracing::error!(bug = bug_id, error = %err, "Failed to process bug");
                summary.failed += 1;
                Ok(())
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn test_fetch_retries_transient_failures() {
        let tracker = FakeTracker::with_bugs(vec![Bug::new(1, "x")]);
        tracker
            .query_errors
            .borrow_mut()
            .push_back(BugwatchError::remote("query", "502 Bad Gateway"));
        let notifier = FakeNotifier::default();
        let sleeper = NoSleep::default();

        let bugs = batch(&tracker, &notifier, &sleeper, false)
            .fetch(&search())
            .unwrap();
        assert_eq!(bugs.len(), 1);
        assert_eq!(sleeper.sleeps.get(), 1);
    }

    #[test]
    fn test_auth_failure_is_never_retried() {
        let tracker = FakeTracker::default();
        *tracker.auth_error.borrow_mut() = Some(BugwatchError::Auth("401".into()));
        let notifier = FakeNotifier::default();
        let sleeper = NoSleep::default();

        let err = batch(&tracker, &notifier, &sleeper, false)
            .fetch(&search())
            .unwrap_err();
        assert!(matches!(err, BugwatchError::Auth(_)));
        assert_eq!(tracker.auth_calls.get(), 1);
        assert_eq!(sleeper.sleeps.get(), 0);
    }

    #[test]
    fn test_record_failure_escalates_fatal_errors() {
        let tracker = FakeTracker::default();
        let notifier = FakeNotifier::default();
        let sleeper = NoSleep::default();
        let b = batch(&tracker, &notifier, &sleeper, false);
        let mut summary = RunSummary::default();

        b.record_failure(&mut summary, 1, BugwatchError::remote("update", "boom"))
            .unwrap();
        assert_eq!(summary.failed, 1);
        assert!(!summary.is_clean());

        assert!(b
            .record_failure(&mut summary, 2, BugwatchError::Auth("gone".into()))
            .is_err());
        assert_eq!(summary.failed, 1);
    }
}
