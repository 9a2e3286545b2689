use crate::config::Requirements;
use crate::notify::SlackWebhook;
use crate::retry::ThreadSleeper;
use crate::tracker::{BugzillaClient, SavedSearch};
use crate::triage::{self, RunSummary};
use anyhow::Result;

use super::CommandContext;
use super::utils::print_summary;

pub fn handle_posttriage(ctx: &CommandContext) -> Result<RunSummary> {
    ctx.config.require(Requirements {
        api_key: true,
        ..Default::default()
    })?;
    let settings = &ctx.config.settings;

    let search = SavedSearch::parse(&settings.queries.posttriage)?;
    let tracker = BugzillaClient::new(
        &settings.tracker.url,
        ctx.config.api_key()?,
        settings.tracker.timeout(),
    )?;
    // posttriage never notifies, but the batch carries a notifier for every pass
    let notifier = SlackWebhook::new(settings.chat.timeout())?;
    let sleeper = ThreadSleeper;
    let batch = ctx.batch(&tracker, &notifier, &sleeper);

    let summary = triage::posttriage(
        &batch,
        &search,
        &settings.tracker.triaged_keyword,
        settings.tracker.page_limit,
    )?;
    print_summary("posttriage", &summary, ctx.dry_run);
    Ok(summary)
}
