use crate::clock::SntpClock;
use crate::config::Requirements;
use crate::entropy::Entropy;
use crate::notify::SlackWebhook;
use crate::retry::ThreadSleeper;
use crate::tracker::{BugzillaClient, SavedSearch};
use crate::triage::{self, RunSummary};
use anyhow::Result;
use chrono::Utc;

use super::CommandContext;
use super::utils::print_summary;

pub fn handle_pretriage(ctx: &CommandContext, secure_random: bool) -> Result<RunSummary> {
    ctx.config.require(Requirements {
        team: true,
        api_key: true,
        webhook: true,
    })?;
    let settings = &ctx.config.settings;

    let roster = ctx.config.roster()?;
    let pool = roster.eligible(Utc::now());
    tracing::info!(
        members = roster.len(),
        available = pool.len(),
        "Team roster loaded"
    );

    let search = SavedSearch::parse(&settings.queries.pretriage)?;
    let sleeper = ThreadSleeper;

    let mut rng = if secure_random {
        Entropy::secure()
    } else {
        let clock = SntpClock::new(settings.time.server.as_str(), settings.time.timeout());
        Entropy::from_time_service(&clock, &settings.retry.time.policy(), &sleeper)
    };
    tracing::debug!(source = %rng.describe(), "Random source ready");

    let tracker = BugzillaClient::new(
        &settings.tracker.url,
        ctx.config.api_key()?,
        settings.tracker.timeout(),
    )?;
    let notifier = SlackWebhook::new(settings.chat.timeout())?;
    let batch = ctx.batch(&tracker, &notifier, &sleeper);

    let summary = triage::pretriage(
        &batch,
        &search,
        &pool,
        &mut rng,
        ctx.config.webhook_url()?,
    )?;
    print_summary("pretriage", &summary, ctx.dry_run);
    Ok(summary)
}
