use super::types::{Flag, Rating};
use serde::{Deserialize, Deserializer, Serialize};

/// Flag recording that quality engineering assessed test coverage.
pub const QE_TEST_COVERAGE_FLAG: &str = "qe_test_coverage";

/// A bug as returned by the tracker. Only the fields the triage passes read
/// are modelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bug {
    pub id: u64,

    #[serde(default, deserialize_with = "first_component")]
    pub component: String,

    /// Absent when the tracker response did not include the field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Rating>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Rating>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<Flag>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,

    #[serde(default)]
    pub assigned_to: String,

    #[serde(default, rename = "cf_doc_type", skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,

    #[serde(default, rename = "cf_release_notes", skip_serializing_if = "Option::is_none")]
    pub doc_text: Option<String>,

    #[serde(default, alias = "weburl")]
    pub web_url: String,
}

/// Some trackers return the component as a one-element list.
fn first_component<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(c) => c,
        OneOrMany::Many(cs) => cs.into_iter().next().unwrap_or_default(),
    })
}

impl Bug {
    pub fn new(id: u64, component: impl Into<String>) -> Self {
        Self {
            id,
            component: component.into(),
            severity: None,
            priority: None,
            flags: Vec::new(),
            keywords: Vec::new(),
            assigned_to: String::new(),
            doc_type: None,
            doc_text: None,
            web_url: String::new(),
        }
    }

    pub fn with_severity(mut self, severity: Rating) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn with_priority(mut self, priority: Rating) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_flag(mut self, flag: Flag) -> Self {
        self.flags.push(flag);
        self
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keywords.push(keyword.into());
        self
    }

    pub fn with_assignee(mut self, assigned_to: impl Into<String>) -> Self {
        self.assigned_to = assigned_to.into();
        self
    }

    pub fn with_web_url(mut self, web_url: impl Into<String>) -> Self {
        self.web_url = web_url.into();
        self
    }

    pub fn with_doc(mut self, doc_type: Option<&str>, doc_text: Option<&str>) -> Self {
        self.doc_type = doc_type.map(str::to_string);
        self.doc_text = doc_text.map(str::to_string);
        self
    }

    /// True if any flag with this name is set, whatever its status.
    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.iter().any(|f| f.name == name)
    }

    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.keywords.iter().any(|k| k.eq_ignore_ascii_case(keyword))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_as_list() {
        let bug: Bug = serde_json::from_str(
            r#"{"id": 42, "component": ["Installer"], "severity": "high"}"#,
        )
        .unwrap();
        assert_eq!(bug.component, "Installer");
        assert_eq!(bug.severity, Some(Rating::High));
        assert_eq!(bug.priority, None);
    }

    #[test]
    fn test_placeholder_ratings_are_assessments() {
        let bug: Bug = serde_json::from_str(
            r#"{"id": 3, "severity": "--", "priority": "", "keywords": ["Triaged"]}"#,
        )
        .unwrap();
        assert_eq!(bug.severity, Some(Rating::Other("--".to_string())));
        assert_eq!(bug.priority, Some(Rating::Other(String::new())));
        assert!(bug.has_keyword("triaged"));
        assert!(!bug.has_keyword("Regression"));
    }

    #[test]
    fn test_component_as_string() {
        let bug: Bug =
            serde_json::from_str(r#"{"id": 7, "component": "Cloud Compute"}"#).unwrap();
        assert_eq!(bug.component, "Cloud Compute");
    }

    #[test]
    fn test_release_note_fields() {
        let bug: Bug = serde_json::from_str(
            r#"{"id": 9, "cf_doc_type": "Bug Fix", "cf_release_notes": "Fixed it."}"#,
        )
        .unwrap();
        assert_eq!(bug.doc_type.as_deref(), Some("Bug Fix"));
        assert_eq!(bug.doc_text.as_deref(), Some("Fixed it."));
    }

    #[test]
    fn test_has_flag_ignores_status() {
        let bug = Bug::new(1, "x").with_flag(Flag::new(QE_TEST_COVERAGE_FLAG, "?"));
        assert!(bug.has_flag(QE_TEST_COVERAGE_FLAG));
        assert!(!bug.has_flag("requires_doc_text"));
    }
}
