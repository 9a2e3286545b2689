//! Metadata checks run over bugs that are already past initial triage.

use crate::model::{Bug, QE_TEST_COVERAGE_FLAG, Rating};
use serde::Serialize;

/// Release-note type meaning no documentation is needed.
pub const NO_DOC_UPDATE: &str = "No Doc Update";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditVerdict {
    pub bug_id: u64,
    pub revoke: bool,
    /// One line per missing item, in evaluation order.
    pub reasons: Vec<String>,
}

impl AuditVerdict {
    /// Comment posted on the bug when the keyword is removed.
    pub fn comment(&self, keyword: &str) -> String {
        let mut comment = format!("Removing the {} keyword because:\n", keyword);
        comment.push_str(
            &self
                .reasons
                .iter()
                .map(|r| format!("* {}", r))
                .collect::<Vec<_>>()
                .join("\n"),
        );
        comment
    }
}

/// True when the tracker returned both ratings, so the bug can be audited.
pub fn has_assessments(bug: &Bug) -> bool {
    bug.severity.is_some() && bug.priority.is_some()
}

/// Decide whether a triaged bug should lose its triaged status.
///
/// An absent rating is not a missing assessment; callers skip such bugs
/// (see [`has_assessments`]).
pub fn audit(bug: &Bug) -> AuditVerdict {
    let missing_severity = bug.severity.as_ref().is_some_and(Rating::is_unspecified);
    let missing_priority = bug.priority.as_ref().is_some_and(Rating::is_unspecified);
    let missing_qe = !bug.has_flag(QE_TEST_COVERAGE_FLAG);

    let mut reasons = Vec::new();
    if missing_severity {
        reasons.push("the severity assessment is missing".to_string());
    }
    if missing_priority {
        reasons.push("the priority assessment is missing".to_string());
    }
    if missing_qe {
        reasons.push(format!(
            "the QE automation assessment (flag {}) is missing",
            QE_TEST_COVERAGE_FLAG
        ));
    }

    AuditVerdict {
        bug_id: bug.id,
        revoke: missing_severity || missing_priority || missing_qe,
        reasons,
    }
}

/// A bug needs release-note attention unless it is marked as not needing
/// docs or already has release-note text.
pub fn needs_doc_text(bug: &Bug) -> bool {
    if bug
        .doc_type
        .as_deref()
        .is_some_and(|t| t.trim().eq_ignore_ascii_case(NO_DOC_UPDATE))
    {
        return false;
    }
    bug.doc_text.as_deref().is_none_or(|t| t.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Flag;

    fn qe_flag() -> Flag {
        Flag::new(QE_TEST_COVERAGE_FLAG, "+")
    }

    #[test]
    fn test_missing_severity_only() {
        let bug = Bug::new(1, "Installer")
            .with_severity(Rating::Unspecified)
            .with_priority(Rating::High)
            .with_flag(qe_flag());
        let v = audit(&bug);
        assert!(v.revoke);
        assert_eq!(v.reasons.len(), 1);
        assert!(v.reasons[0].contains("severity"));
    }

    #[test]
    fn test_missing_severity_without_flags_lists_severity_first() {
        let bug = Bug::new(2, "Installer")
            .with_severity(Rating::Unspecified)
            .with_priority(Rating::High);
        let v = audit(&bug);
        assert!(v.revoke);
        assert_eq!(
            v.reasons.iter().filter(|r| r.contains("severity")).count(),
            1
        );
        assert!(v.reasons[0].contains("severity"));
        assert!(!v.reasons.iter().any(|r| r.contains("priority")));
    }

    #[test]
    fn test_complete_bug_is_kept() {
        let bug = Bug::new(3, "Installer")
            .with_severity(Rating::from("Medium"))
            .with_priority(Rating::from("Low"))
            .with_flag(qe_flag());
        let v = audit(&bug);
        assert!(!v.revoke);
        assert!(v.reasons.is_empty());
    }

    #[test]
    fn test_flag_status_is_irrelevant() {
        for status in ["+", "-", "?", ""] {
            let bug = Bug::new(4, "x")
                .with_severity(Rating::Low)
                .with_priority(Rating::Low)
                .with_flag(Flag::new(QE_TEST_COVERAGE_FLAG, status));
            assert!(!audit(&bug).revoke, "status {status:?}");
        }
    }

    #[test]
    fn test_reasons_follow_evaluation_order() {
        let bug = Bug::new(5, "x")
            .with_severity(Rating::Unspecified)
            .with_priority(Rating::Unspecified);
        let v = audit(&bug);
        assert_eq!(v.reasons.len(), 3);
        assert!(v.reasons[0].contains("severity"));
        assert!(v.reasons[1].contains("priority"));
        assert!(v.reasons[2].contains(QE_TEST_COVERAGE_FLAG));
    }

    #[test]
    fn test_comment_lists_reasons() {
        let v = audit(
            &Bug::new(6, "x")
                .with_severity(Rating::High)
                .with_priority(Rating::Unspecified),
        );
        assert_eq!(
            v.comment("Triaged"),
            "Removing the Triaged keyword because:\n\
             * the priority assessment is missing\n\
             * the QE automation assessment (flag qe_test_coverage) is missing"
        );
    }

    #[test]
    fn test_placeholder_severity_does_not_revoke() {
        for raw in ["--", ""] {
            let bug = Bug::new(7, "x")
                .with_severity(Rating::from(raw))
                .with_priority(Rating::High)
                .with_flag(qe_flag());
            assert!(!audit(&bug).revoke, "severity {raw:?}");
        }
    }

    #[test]
    fn test_absent_ratings_are_not_revoked() {
        let bug: Bug = serde_json::from_str(
            r#"{"id": 8, "priority": "high", "flags": [{"name": "qe_test_coverage", "status": "+"}]}"#,
        )
        .unwrap();
        assert!(!has_assessments(&bug));
        assert!(!audit(&bug).revoke);
        assert!(has_assessments(&bug.with_severity(Rating::Low)));
    }

    #[test]
    fn test_needs_doc_text() {
        assert!(needs_doc_text(&Bug::new(1, "x")));
        assert!(needs_doc_text(&Bug::new(1, "x").with_doc(Some("Bug Fix"), None)));
        assert!(needs_doc_text(&Bug::new(1, "x").with_doc(Some("Bug Fix"), Some("  "))));
        assert!(!needs_doc_text(&Bug::new(1, "x").with_doc(Some("Bug Fix"), Some("Fixed."))));
        assert!(!needs_doc_text(&Bug::new(1, "x").with_doc(Some("No Doc Update"), None)));
    }
}
