use crate::config::Requirements;
use anyhow::Result;
use chrono::Utc;
use colored::Colorize;

use super::CommandContext;

/// Report the roster as the other commands would see it. Touches no
/// remote service.
pub fn handle_check(ctx: &CommandContext) -> Result<()> {
    ctx.config.require(Requirements {
        team: true,
        ..Default::default()
    })?;

    let roster = ctx.config.roster()?;
    let now = Utc::now();
    let available = roster.eligible(now).len();

    println!("{}", "Team".bold());
    for member in roster.members() {
        let state = if member.is_available(now) {
            "available".green()
        } else {
            "away".yellow()
        };
        let components = if member.components.is_empty() {
            "-".to_string()
        } else {
            member
                .components
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        };
        println!(
            "  {:<16} {:<10} {}",
            member.key.cyan(),
            state,
            components.dimmed()
        );
    }
    println!();
    println!(
        "{} members configured, {} available",
        roster.len(),
        available
    );

    let settings = &ctx.config.settings;
    println!("tracker: {}", settings.tracker.url);
    for (name, set) in [
        ("api key", ctx.config.api_key.is_some()),
        ("webhook", ctx.config.webhook_url.is_some()),
    ] {
        let mark = if set { "set".green() } else { "missing".red() };
        println!("{}: {}", name, mark);
    }

    Ok(())
}
