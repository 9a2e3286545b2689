use crate::config::Requirements;
use crate::notify::SlackWebhook;
use crate::retry::ThreadSleeper;
use crate::tracker::{BugzillaClient, SavedSearch};
use crate::triage::{self, RunSummary};
use anyhow::Result;

use super::CommandContext;
use super::utils::print_summary;

pub fn handle_doctext(ctx: &CommandContext) -> Result<RunSummary> {
    ctx.config.require(Requirements {
        team: true,
        api_key: true,
        webhook: true,
    })?;
    let settings = &ctx.config.settings;

    let roster = ctx.config.roster()?;
    let search = SavedSearch::parse(&settings.queries.doctext)?;
    let tracker = BugzillaClient::new(
        &settings.tracker.url,
        ctx.config.api_key()?,
        settings.tracker.timeout(),
    )?;
    let notifier = SlackWebhook::new(settings.chat.timeout())?;
    let sleeper = ThreadSleeper;
    let batch = ctx.batch(&tracker, &notifier, &sleeper);

    let summary = triage::doctext(
        &batch,
        &search,
        &roster,
        &settings.chat.team_id,
        ctx.config.webhook_url()?,
    )?;
    print_summary("doctext", &summary, ctx.dry_run);
    Ok(summary)
}
