use crate::config::{API_KEY_ENV, SLACK_HOOK_ENV, TEAM_MEMBERS_ENV, TEAM_VACATIONS_ENV};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bugwatch")]
#[command(
    author,
    version,
    about = "Keeps a team's bug triage queue moving: assigns, notifies and audits"
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the settings file (defaults to ./bugwatch.yml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Decide and log, but change no bug and send no notification
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also write JSON logs to this file (rotated daily)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Team roster as JSON
    #[arg(long, global = true, env = TEAM_MEMBERS_ENV, hide_env_values = true)]
    pub team_members: Option<String>,

    /// Vacation windows as a JSON list
    #[arg(long, global = true, env = TEAM_VACATIONS_ENV, hide_env_values = true)]
    pub team_vacations: Option<String>,

    /// Incoming webhook for chat notifications
    #[arg(long, global = true, env = SLACK_HOOK_ENV, hide_env_values = true)]
    pub slack_hook: Option<String>,

    /// Bug tracker API key
    #[arg(long, global = true, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Assign untriaged bugs to available team members and notify them
    Pretriage {
        /// Use the OS random source instead of seeding from network time
        #[arg(long)]
        secure_random: bool,
    },

    /// Remove the triaged keyword from bugs with incomplete triage metadata
    Posttriage,

    /// Remind owners of bugs that still need release-note text
    Doctext,

    /// Validate the roster and vacation configuration without contacting any service
    Check,
}
