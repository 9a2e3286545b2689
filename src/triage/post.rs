use super::{Batch, RunSummary};
use crate::audit::{self, AuditVerdict};
use crate::error::Result;
use crate::tracker::{BugPatch, SavedSearch};

const FIELDS: &[&str] = &["id", "component", "keywords", "severity", "priority", "flags"];

/// Take the triaged keyword away from bugs whose metadata is incomplete,
/// explaining why in a comment.
pub fn posttriage(
    batch: &Batch<'_>,
    search: &SavedSearch,
    keyword: &str,
    page_limit: Option<u32>,
) -> Result<RunSummary> {
    let search = search.clone().with_fields(FIELDS).with_limit(page_limit);
    let bugs = batch.fetch(&search)?;
    let mut summary = RunSummary {
        found: bugs.len(),
        ..Default::default()
    };

    for bug in &bugs {
        if !bug.has_keyword(keyword) {
            tracing::debug!(bug = bug.id, "No {} keyword, nothing to revoke", keyword);
            continue;
        }
        if !audit::has_assessments(bug) {
            tracing::warn!(
                bug = bug.id,
                "Tracker returned no severity or priority; leaving the bug alone"
            );
            continue;
        }

        let verdict = audit::audit(bug);
        if !verdict.revoke {
            tracing::debug!(bug = bug.id, "Triage metadata complete");
            continue;
        }

        tracing::info!(
            bug = bug.id,
            reasons = verdict.reasons.len(),
            "Revoking {}",
            keyword
        );

        if batch.dry_run {
            summary.skipped += 1;
            continue;
        }

        match revoke(batch, &verdict, keyword) {
            Ok(()) => summary.changed += 1,
            Err(e) => batch.record_failure(&mut summary, bug.id, e)?,
        }
    }

    Ok(summary)
}

fn revoke(batch: &Batch<'_>, verdict: &AuditVerdict, keyword: &str) -> Result<()> {
    let patch = BugPatch::remove_keyword(keyword);
    batch.policies.mutate.run("remove keyword", batch.sleeper, |_| {
        batch.tracker.update(verdict.bug_id, &patch)
    })?;

    let comment = verdict.comment(keyword);
    batch.policies.mutate.run("comment", batch.sleeper, |_| {
        batch.tracker.add_comment(verdict.bug_id, &comment)
    })?;

    tracing::info!(bug = verdict.bug_id, "Updated bug");
    Ok(())
}
