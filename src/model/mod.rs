//! Data models shared by the triage passes.
//!
//! - [`Bug`]: a tracker bug, reduced to the fields the passes read
//! - [`Rating`]: severity / priority levels
//! - [`Flag`]: a named tracker flag
//! - [`TeamMember`], [`Leave`], [`VacationEntry`]: roster data

mod bug;
mod team;
mod types;

pub use bug::{Bug, QE_TEST_COVERAGE_FLAG};
pub use team::{Leave, TeamMember, VacationEntry};
pub use types::{Flag, Rating};
