mod check;
mod doctext;
mod posttriage;
mod pretriage;
mod utils;

pub use check::handle_check;
pub use doctext::handle_doctext;
pub use posttriage::handle_posttriage;
pub use pretriage::handle_pretriage;

use crate::config::RunConfig;
use crate::notify::Notifier;
use crate::retry::Sleeper;
use crate::tracker::Tracker;
use crate::triage::{Batch, Policies};

/// Common context passed to all command handlers
pub struct CommandContext {
    pub config: RunConfig,
    pub dry_run: bool,
}

impl CommandContext {
    pub fn new(config: RunConfig, dry_run: bool) -> Self {
        Self { config, dry_run }
    }

    pub fn batch<'a>(
        &self,
        tracker: &'a dyn Tracker,
        notifier: &'a dyn Notifier,
        sleeper: &'a dyn Sleeper,
    ) -> Batch<'a> {
        Batch {
            tracker,
            notifier,
            sleeper,
            policies: Policies::from_settings(&self.config.settings.retry),
            dry_run: self.dry_run,
        }
    }
}
