use super::{Batch, RunSummary};
use crate::error::Result;
use crate::model::{Bug, TeamMember};
use crate::notify;
use crate::selector::{self, AssignmentDecision};
use crate::tracker::{BugPatch, SavedSearch};
use rand::Rng;

const FIELDS: &[&str] = &["id", "component", "assigned_to"];

/// Assign every untriaged bug to a team member and tell them about it.
///
/// The assignment is kept even when the notification cannot be delivered.
pub fn pretriage<R>(
    batch: &Batch<'_>,
    search: &SavedSearch,
    pool: &[TeamMember],
    rng: &mut R,
    webhook_url: &str,
) -> Result<RunSummary>
where
    R: Rng + ?Sized,
{
    let bugs = batch.fetch(&search.clone().with_fields(FIELDS))?;
    let mut summary = RunSummary {
        found: bugs.len(),
        ..Default::default()
    };

    if pool.is_empty() && !bugs.is_empty() {
        tracing::warn!("Every team member is away; no bug can be assigned");
    }

    for bug in &bugs {
        let decision = match selector::select(bug, pool, selector::is_specialist, &mut *rng) {
            Ok(decision) => decision,
            Err(e) => {
                batch.record_failure(&mut summary, bug.id, e)?;
                continue;
            }
        };

        tracing::info!(
            bug = bug.id,
            component = %bug.component,
            assignee = %decision.member.key,
            rationale = %decision.rationale,
            "Selected assignee"
        );

        if batch.dry_run {
            summary.skipped += 1;
            continue;
        }

        if let Err(e) = assign(batch, &decision) {
            batch.record_failure(&mut summary, bug.id, e)?;
            continue;
        }
        summary.changed += 1;

        match announce(batch, bug, &decision, webhook_url) {
            Ok(()) => summary.notified += 1,
            Err(e) => batch.record_failure(&mut summary, bug.id, e)?,
        }
    }

    Ok(summary)
}

fn assign(batch: &Batch<'_>, decision: &AssignmentDecision) -> Result<()> {
    let patch = BugPatch::assign(decision.member.tracker_id.as_str());
    batch.policies.mutate.run("assign", batch.sleeper, |_| {
        batch.tracker.update(decision.bug_id, &patch)
    })?;
    tracing::info!(bug = decision.bug_id, assignee = %decision.member.tracker_id, "Assigned");
    Ok(())
}

fn announce(
    batch: &Batch<'_>,
    bug: &Bug,
    decision: &AssignmentDecision,
    webhook_url: &str,
) -> Result<()> {
    let message = notify::assignment(&decision.member.chat_id, &bug.web_url);
    batch.policies.notify.run("notify assignee", batch.sleeper, |_| {
        batch.notifier.send(webhook_url, &message)
    })
}
