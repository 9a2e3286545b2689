use super::{Batch, RunSummary};
use crate::audit;
use crate::error::Result;
use crate::model::Bug;
use crate::notify;
use crate::roster::Roster;
use crate::tracker::SavedSearch;

const FIELDS: &[&str] = &["id", "component", "assigned_to", "cf_doc_type", "cf_release_notes"];

/// Bugs needing release-note text, grouped by the chat id to ping.
/// Groups keep the order in which their first bug was seen.
pub fn group_by_owner<'b>(
    bugs: &'b [Bug],
    roster: &Roster,
    team_id: &str,
) -> Vec<(String, Vec<&'b Bug>)> {
    let mut groups: Vec<(String, Vec<&Bug>)> = Vec::new();

    for bug in bugs.iter().filter(|b| audit::needs_doc_text(b)) {
        let chat_id = match roster.by_tracker_id(&bug.assigned_to) {
            Some(member) => member.chat_id.as_str(),
            None => {
                tracing::debug!(bug = bug.id, assignee = %bug.assigned_to, "Assignee not on the team");
                team_id
            }
        };

        match groups.iter_mut().find(|(id, _)| id.as_str() == chat_id) {
            Some((_, group)) => group.push(bug),
            None => groups.push((chat_id.to_string(), vec![bug])),
        }
    }

    groups
}

/// Ping owners of bugs that still lack release-note text.
pub fn doctext(
    batch: &Batch<'_>,
    search: &SavedSearch,
    roster: &Roster,
    team_id: &str,
    webhook_url: &str,
) -> Result<RunSummary> {
    let bugs = batch.fetch(&search.clone().with_fields(FIELDS))?;
    let mut summary = RunSummary {
        found: bugs.len(),
        ..Default::default()
    };

    for (chat_id, group) in group_by_owner(&bugs, roster, team_id) {
        let ids: Vec<u64> = group.iter().map(|b| b.id).collect();
        tracing::info!(recipient = %chat_id, bugs = ?ids, "Doc text missing");

        if batch.dry_run {
            summary.skipped += 1;
            continue;
        }

        let message =
            notify::doc_text_reminder(&chat_id, group.iter().map(|b| (b.id, b.web_url.as_str())));
        let sent = batch.policies.notify.run("notify doc text", batch.sleeper, |_| {
            batch.notifier.send(webhook_url, &message)
        });
        match sent {
            Ok(()) => summary.notified += 1,
            Err(e) => batch.record_failure(&mut summary, ids[0], e)?,
        }
    }

    Ok(summary)
}
