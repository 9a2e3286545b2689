//! # Bugwatch - triage-queue hygiene for a bug tracker
//!
//! Bugwatch keeps a team's incoming bugs moving. It assigns untriaged bugs to
//! available team members and pings them in chat, takes the triaged keyword
//! away from bugs whose triage metadata is incomplete, and reminds owners of
//! bugs that still lack release-note text.
//!
//! ## Quick Start
//!
//! ```bash
//! export TEAM_MEMBERS='{"jdoe": {"bz_id": "jdoe@example.com", "slack_id": "U0123"}}'
//! export BUGZILLA_API_KEY=...
//! export SLACK_HOOK=https://hooks.slack.com/services/...
//!
//! # Check the roster and who is on vacation today
//! bugwatch check
//!
//! # Assign and notify, without touching anything
//! bugwatch pretriage --dry-run
//!
//! # Audit triaged bugs
//! bugwatch posttriage
//! ```
//!
//! ## Modules
//!
//! - [`audit`]: Triage metadata checks
//! - [`cli`]: Command-line interface definitions
//! - [`clock`]: Network time source
//! - [`config`]: Settings file and environment
//! - [`entropy`]: Random source for assignee selection
//! - [`error`]: Error types and result aliases
//! - [`model`]: Bugs, ratings, flags and team members
//! - [`notify`]: Chat notifications
//! - [`retry`]: Bounded fixed-backoff retry
//! - [`roster`]: Team roster and vacation filtering
//! - [`selector`]: Assignee selection
//! - [`tracker`]: Bug tracker client
//! - [`triage`]: The batch passes

/// Metadata checks for triaged bugs.
pub mod audit;

/// Command-line interface definitions using clap.
pub mod cli;

/// SNTP client used to seed the assignment RNG.
pub mod clock;

/// Configuration loading.
///
/// Handles the optional `bugwatch.yml` settings file and the values taken
/// from the environment.
pub mod config;

pub mod entropy;

/// Error types and result aliases.
///
/// Defines `BugwatchError` enum and `Result<T>` type alias.
pub mod error;

pub mod http;

pub mod logging;

/// Data models.
///
/// Includes `Bug`, `Rating`, `Flag` and `TeamMember`.
pub mod model;

pub mod notify;

pub mod retry;

pub mod roster;

pub mod selector;

/// Bug tracker access.
///
/// Defines the `Tracker` trait and its Bugzilla REST implementation.
pub mod tracker;

pub mod triage;
