use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A leave period. Dates are taken as midnight UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leave {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Leave {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Strict on both ends: a leave that starts or ends exactly at `t` does
    /// not cover `t`.
    pub fn covers(&self, t: DateTime<Utc>) -> bool {
        let start = self.start.and_time(NaiveTime::MIN).and_utc();
        let end = self.end.and_time(NaiveTime::MIN).and_utc();
        start < t && t < end
    }
}

/// One row of the vacation list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacationEntry {
    #[serde(alias = "kerberos")]
    pub member_key: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamMember {
    /// Key of the member in the roster blob.
    pub key: String,
    pub tracker_id: String,
    pub chat_id: String,
    pub components: BTreeSet<String>,
    pub vacation: Vec<Leave>,
}

impl TeamMember {
    pub fn new(
        key: impl Into<String>,
        tracker_id: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            tracker_id: tracker_id.into(),
            chat_id: chat_id.into(),
            components: BTreeSet::new(),
            vacation: Vec::new(),
        }
    }

    pub fn with_components<I, S>(mut self, components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.components = components.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_available(&self, t: DateTime<Utc>) -> bool {
        !self.vacation.iter().any(|leave| leave.covers(t))
    }

    pub fn specializes_in(&self, component: &str) -> bool {
        self.components.contains(component)
    }
}
