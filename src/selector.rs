//! Assignee selection.

use crate::error::{BugwatchError, Result};
use crate::model::{Bug, TeamMember};
use rand::Rng;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rationale {
    /// Drawn among members who declared the bug's component.
    Specialist,
    /// Nobody specializes in the component; drawn from the whole pool.
    Fallback,
}

impl fmt::Display for Rationale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rationale::Specialist => write!(f, "specialist"),
            Rationale::Fallback => write!(f, "fallback"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentDecision {
    pub bug_id: u64,
    pub member: TeamMember,
    pub rationale: Rationale,
}

/// Default specialist predicate: the member lists the bug's component.
pub fn is_specialist(member: &TeamMember, bug: &Bug) -> bool {
    member.specializes_in(&bug.component)
}

/// Pick an assignee for `bug` from `pool`.
///
/// Specialists (per `specialist`) are preferred; the draw is uniform within
/// whichever group is used. Only an empty pool is an error.
pub fn select<R, P>(
    bug: &Bug,
    pool: &[TeamMember],
    specialist: P,
    rng: &mut R,
) -> Result<AssignmentDecision>
where
    R: Rng + ?Sized,
    P: Fn(&TeamMember, &Bug) -> bool,
{
    let specialists: Vec<&TeamMember> = pool.iter().filter(|m| specialist(*m, bug)).collect();

    let (candidates, rationale) = if specialists.is_empty() {
        (pool.iter().collect::<Vec<_>>(), Rationale::Fallback)
    } else {
        (specialists, Rationale::Specialist)
    };

    if candidates.is_empty() {
        return Err(BugwatchError::NoEligibleAssignee { bug_id: bug.id });
    }

    let member = candidates[rng.gen_range(0..candidates.len())].clone();
    Ok(AssignmentDecision {
        bug_id: bug.id,
        member,
        rationale,
    })
}
