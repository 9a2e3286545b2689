//! Team roster loading and eligible-pool resolution.
//!
//! The roster blob is a JSON object keyed by member (the key is usually the
//! member's kerberos name), or a plain list of member records:
//!
//! ```json
//! {
//!   "jdoe": {"bz_id": "jdoe@example.com", "slack_id": "U0123", "components": ["Installer"]},
//!   "asmith": {"bz_id": "asmith@example.com", "slack_id": "U0456"}
//! }
//! ```
//!
//! Vacations come from a separate list and are attached to members by key.
//! Member order is the order of the blob and is kept all the way into the
//! eligible pool.

use crate::error::{BugwatchError, Result};
use crate::model::{Leave, TeamMember, VacationEntry};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Members eligible for assignment at a given instant, in roster order.
pub type EligiblePool = Vec<TeamMember>;

#[derive(Debug, Deserialize)]
struct MemberRecord {
    #[serde(alias = "bz_id", alias = "jira_name")]
    tracker_id: String,
    #[serde(alias = "slack_id")]
    chat_id: String,
    #[serde(default)]
    components: Vec<String>,
    #[serde(default)]
    vacation: Vec<Leave>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RosterBlob {
    Keyed(Map<String, Value>),
    Listed(Vec<MemberRecord>),
}

impl MemberRecord {
    fn into_member(self, key: String) -> TeamMember {
        let mut member = TeamMember::new(key, self.tracker_id, self.chat_id)
            .with_components(self.components);
        member.vacation = self.vacation;
        member
    }
}

#[derive(Debug, Clone, Default)]
pub struct Roster {
    members: Vec<TeamMember>,
}

impl Roster {
    pub fn new(members: Vec<TeamMember>) -> Self {
        Self { members }
    }

    /// Parse the roster blob and attach the vacation list to it.
    pub fn from_json(team_json: &str, vacations: &[VacationEntry]) -> Result<Self> {
        if team_json.trim().is_empty() {
            return Err(BugwatchError::Config(
                "the JSON object describing the team is empty".to_string(),
            ));
        }

        let blob: RosterBlob = serde_json::from_str(team_json).map_err(|e| {
            BugwatchError::Config(format!("failed to parse the team JSON: {}", e))
        })?;

        let mut members = match blob {
            RosterBlob::Keyed(map) => {
                let mut members = Vec::with_capacity(map.len());
                for (key, value) in map {
                    let record: MemberRecord = serde_json::from_value(value).map_err(|e| {
                        BugwatchError::Config(format!("invalid team member '{}': {}", key, e))
                    })?;
                    members.push(record.into_member(key));
                }
                members
            }
            RosterBlob::Listed(records) => records
                .into_iter()
                .map(|r| {
                    let key = r.tracker_id.clone();
                    r.into_member(key)
                })
                .collect(),
        };

        for (i, entry) in vacations.iter().enumerate() {
            match members.iter_mut().find(|m| m.key == entry.member_key) {
                Some(m) => m.vacation.push(Leave::new(entry.start, entry.end)),
                None => tracing::warn!(
                    index = i,
                    member = %entry.member_key,
                    "Vacation entry did not apply to any team member"
                ),
            }
        }

        Ok(Self { members })
    }

    pub fn members(&self) -> &[TeamMember] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members not on leave at `now`. May be empty.
    pub fn eligible(&self, now: DateTime<Utc>) -> EligiblePool {
        self.members
            .iter()
            .filter(|m| m.is_available(now))
            .cloned()
            .collect()
    }

    pub fn by_tracker_id(&self, tracker_id: &str) -> Option<&TeamMember> {
        if tracker_id.is_empty() {
            return None;
        }
        self.members.iter().find(|m| m.tracker_id == tracker_id)
    }
}

/// Parse the vacation list. An absent or blank blob means nobody is away.
pub fn parse_vacations(raw: Option<&str>) -> Result<Vec<VacationEntry>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Vec::new()),
        Some(json) => serde_json::from_str(json).map_err(|e| {
            BugwatchError::Config(format!("failed to parse the vacation JSON: {}", e))
        }),
    }
}

/// Build the eligible pool for `now` from the raw configuration blobs.
pub fn resolve(
    raw_team: Option<&str>,
    vacations: &[VacationEntry],
    now: DateTime<Utc>,
) -> Result<EligiblePool> {
    let raw_team = raw_team.ok_or_else(|| {
        BugwatchError::Config(
            "the JSON object describing the team is required. Set the TEAM_MEMBERS environment variable."
                .to_string(),
        )
    })?;
    Ok(Roster::from_json(raw_team, vacations)?.eligible(now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    const TEAM: &str = r#"{
        "alice": {"bz_id": "alice@example.com", "slack_id": "UALICE", "components": ["Installer"]},
        "bob": {"tracker_id": "bob@example.com", "chat_id": "UBOB"},
        "carol": {"jira_name": "carol", "slack_id": "UCAROL", "components": ["Cloud Compute", "Installer"]}
    }"#;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn vacation(key: &str, start: NaiveDate, end: NaiveDate) -> VacationEntry {
        VacationEntry {
            member_key: key.to_string(),
            start,
            end,
        }
    }

    fn keys(pool: &EligiblePool) -> Vec<&str> {
        pool.iter().map(|m| m.key.as_str()).collect()
    }

    #[test]
    fn test_roster_keeps_blob_order() {
        let roster = Roster::from_json(TEAM, &[]).unwrap();
        let keys: Vec<_> = roster.members().iter().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, ["alice", "bob", "carol"]);
        assert_eq!(roster.members()[0].tracker_id, "alice@example.com");
        assert!(roster.members()[2].specializes_in("Cloud Compute"));
    }

    #[test]
    fn test_roster_accepts_list_form() {
        let roster = Roster::from_json(
            r#"[{"bz_id": "a@example.com", "slack_id": "UA"}, {"bz_id": "b@example.com", "slack_id": "UB"}]"#,
            &[],
        )
        .unwrap();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.members()[1].key, "b@example.com");
    }

    #[test]
    fn test_malformed_roster_is_config_error() {
        let err = Roster::from_json("{not json", &[]).unwrap_err();
        assert!(matches!(err, BugwatchError::Config(_)));

        let err = Roster::from_json(r#"{"alice": {"slack_id": "U1"}}"#, &[]).unwrap_err();
        assert!(matches!(err, BugwatchError::Config(ref m) if m.contains("alice")));
    }

    #[test]
    fn test_missing_roster_is_config_error() {
        let now = Utc::now();
        let err = resolve(None, &[], now).unwrap_err();
        assert!(matches!(err, BugwatchError::Config(ref m) if m.contains("TEAM_MEMBERS")));
    }

    #[test]
    fn test_vacation_excludes_member_strictly_inside_window() {
        let now = Utc.with_ymd_and_hms(2024, 6, 5, 9, 0, 0).unwrap();
        let vacations = [vacation("bob", date(2024, 6, 1), date(2024, 6, 10))];
        let pool = resolve(Some(TEAM), &vacations, now).unwrap();
        assert_eq!(keys(&pool), ["alice", "carol"]);
    }

    #[test]
    fn test_vacation_ending_now_does_not_exclude() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap();
        let vacations = [vacation("bob", date(2024, 6, 1), date(2024, 6, 10))];
        let pool = resolve(Some(TEAM), &vacations, now).unwrap();
        assert_eq!(keys(&pool), ["alice", "bob", "carol"]);
    }

    #[test]
    fn test_vacation_starting_now_does_not_exclude() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let vacations = [vacation("bob", date(2024, 6, 1), date(2024, 6, 10))];
        let pool = resolve(Some(TEAM), &vacations, now).unwrap();
        assert!(keys(&pool).contains(&"bob"));
    }

    #[test]
    fn test_past_and_future_windows_do_not_exclude() {
        let now = Utc.with_ymd_and_hms(2024, 6, 5, 9, 0, 0).unwrap();
        let vacations = [
            vacation("alice", date(2024, 1, 1), date(2024, 1, 5)),
            vacation("alice", date(2024, 12, 20), date(2025, 1, 2)),
        ];
        let pool = resolve(Some(TEAM), &vacations, now).unwrap();
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_any_covering_window_excludes() {
        let now = Utc.with_ymd_and_hms(2024, 6, 5, 9, 0, 0).unwrap();
        let vacations = [
            vacation("carol", date(2024, 1, 1), date(2024, 1, 5)),
            vacation("carol", date(2024, 6, 4), date(2024, 6, 6)),
        ];
        let pool = resolve(Some(TEAM), &vacations, now).unwrap();
        assert_eq!(keys(&pool), ["alice", "bob"]);
    }

    #[test]
    fn test_everyone_away_gives_empty_pool() {
        let now = Utc.with_ymd_and_hms(2024, 6, 5, 9, 0, 0).unwrap();
        let vacations: Vec<_> = ["alice", "bob", "carol"]
            .iter()
            .map(|k| vacation(k, date(2024, 6, 1), date(2024, 6, 10)))
            .collect();
        let pool = resolve(Some(TEAM), &vacations, now).unwrap();
        assert!(pool.is_empty());
    }

    #[test]
    fn test_unknown_vacation_member_is_ignored() {
        let vacations = [vacation("mallory", date(2024, 6, 1), date(2024, 6, 10))];
        let roster = Roster::from_json(TEAM, &vacations).unwrap();
        assert!(roster.members().iter().all(|m| m.vacation.is_empty()));
    }

    #[test]
    fn test_inline_member_vacation() {
        let team = r#"{"dave": {"bz_id": "d@example.com", "slack_id": "UD",
                       "vacation": [{"start": "2024-06-01", "end": "2024-06-10"}]}}"#;
        let now = Utc.with_ymd_and_hms(2024, 6, 5, 9, 0, 0).unwrap();
        assert!(resolve(Some(team), &[], now).unwrap().is_empty());
    }

    #[test]
    fn test_parse_vacations() {
        assert!(parse_vacations(None).unwrap().is_empty());
        assert!(parse_vacations(Some("  ")).unwrap().is_empty());
        let v = parse_vacations(Some(
            r#"[{"kerberos": "bob", "start": "2024-06-01", "end": "2024-06-10"}]"#,
        ))
        .unwrap();
        assert_eq!(v[0].member_key, "bob");
        assert!(matches!(
            parse_vacations(Some("[{]")),
            Err(BugwatchError::Config(_))
        ));
    }

    #[test]
    fn test_by_tracker_id() {
        let roster = Roster::from_json(TEAM, &[]).unwrap();
        assert_eq!(roster.by_tracker_id("carol").unwrap().chat_id, "UCAROL");
        assert!(roster.by_tracker_id("").is_none());
        assert!(roster.by_tracker_id("nobody").is_none());
    }
}
