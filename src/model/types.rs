use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity or priority assessment as reported by the tracker.
///
/// Values the tracker does not know about are preserved in [`Rating::Other`]
/// so that a new level never reads as "unspecified".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Rating {
    #[default]
    Unspecified,
    Low,
    Medium,
    High,
    Urgent,
    Other(String),
}

impl Rating {
    pub fn is_unspecified(&self) -> bool {
        matches!(self, Rating::Unspecified)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rating::Unspecified => write!(f, "unspecified"),
            Rating::Low => write!(f, "low"),
            Rating::Medium => write!(f, "medium"),
            Rating::High => write!(f, "high"),
            Rating::Urgent => write!(f, "urgent"),
            Rating::Other(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Rating {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "unspecified" => Rating::Unspecified,
            "low" => Rating::Low,
            "medium" => Rating::Medium,
            "high" => Rating::High,
            "urgent" => Rating::Urgent,
            _ => Rating::Other(s.trim().to_string()),
        }
    }
}

impl From<String> for Rating {
    fn from(s: String) -> Self {
        Rating::from(s.as_str())
    }
}

impl From<Rating> for String {
    fn from(r: Rating) -> Self {
        r.to_string()
    }
}

/// A tracker flag such as `qe_test_coverage+`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flag {
    pub name: String,
    #[serde(default)]
    pub status: String,
}

impl Flag {
    pub fn new(name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: status.into(),
        }
    }
}
