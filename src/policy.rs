//! Optional activity rules checked against a finished document.
//!
//! These are house conventions rather than structural invariants, so every
//! finding is an [`Advisory`] and never aborts a transformation.

use crate::document::{CourseDocument, Week};
use crate::source::RecordId;
use crate::validate::{Advisory, AdvisoryKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityPolicy {
    /// Every activity has non-empty text.
    pub require_text: bool,
    /// Sequence numbers are positive.
    pub validate_sequencing: bool,
    /// Assignments link at least one competency.
    pub check_competency_mapping: bool,
    /// Codes follow `u{week:02}{type initial}{sequence}`.
    pub require_activity_code: bool,
    /// Within a week: studies, then discussions, then assignments.
    pub enforce_type_order: bool,
}

impl Default for ActivityPolicy {
    fn default() -> Self {
        Self {
            require_text: true,
            validate_sequencing: true,
            check_competency_mapping: true,
            require_activity_code: true,
            enforce_type_order: true,
        }
    }
}

/// The code an activity is expected to carry, e.g. `u03d2`.
pub fn expected_code(week_number: u32, activity_type: &str, sequence: u32) -> String {
    let initial = activity_type
        .chars()
        .next()
        .map(|c| c.to_lowercase().collect::<String>())
        .unwrap_or_default();
    format!("u{week_number:02}{initial}{sequence}")
}

impl ActivityPolicy {
    pub fn check(&self, document: &CourseDocument) -> Vec<String> {
        let mut seen: HashSet<&RecordId> = HashSet::new();
        let mut issues = Vec::new();
        for week in &document.weeks {
            self.check_week(week, &mut seen, &mut issues);
        }
        issues
    }

    /// Findings wrapped as advisories. Unmapped assignments are left to
    /// validation, which reports them as [`AdvisoryKind::UnmappedAssignment`].
    pub fn advisories(&self, document: &CourseDocument) -> Vec<Advisory> {
        let policy = Self {
            check_competency_mapping: false,
            ..*self
        };
        policy
            .check(document)
            .into_iter()
            .map(|issue| Advisory::new(AdvisoryKind::ActivityPolicy, issue))
            .collect()
    }

    fn check_week<'d>(&self, week: &'d Week, seen: &mut HashSet<&'d RecordId>, issues: &mut Vec<String>) {
        let n = week.week_number;

        for activity in &week.activities {
            let label = activity.title.as_deref().unwrap_or_default();
            let kind = activity.activity_type.to_lowercase();

            if !seen.insert(&activity.id) {
                issues.push(format!("Duplicate activity ID {} found in week {n}", activity.id));
            }
            if self.require_text && activity.text.is_empty() {
                issues.push(format!(
                    "Activity {} ({label}) in Week {n} is missing text",
                    activity.id
                ));
            }
            if self.validate_sequencing && activity.sequence_number == 0 {
                issues.push(format!(
                    "Activity {} ({label}) in Week {n} has invalid sequence number",
                    activity.id
                ));
            }
            if self.require_activity_code {
                let expected = expected_code(n, &kind, activity.sequence_number);
                if activity.code.as_deref() != Some(expected.as_str()) {
                    issues.push(format!(
                        "Activity {} has incorrect code. Expected: {expected}, Got: {}",
                        activity.id,
                        activity.code.as_deref().unwrap_or("none")
                    ));
                }
            }
            if self.check_competency_mapping && kind == "assignment" && activity.competencies.is_empty() {
                issues.push(format!(
                    "Assignment {} ({label}) in Week {n} has no competency mappings",
                    activity.id
                ));
            }
        }

        if self.enforce_type_order {
            issues.extend(type_order_issues(week));
        }
    }
}

fn type_order_issues(week: &Week) -> Vec<String> {
    let span = |kind: &str| {
        let sequences: Vec<u32> = week
            .activities
            .iter()
            .filter(|a| a.activity_type.eq_ignore_ascii_case(kind))
            .map(|a| a.sequence_number)
            .collect();
        let first = sequences.iter().min().copied();
        let last = sequences.iter().max().copied();
        first.zip(last)
    };
    let study = span("study");
    let discussion = span("discussion");
    let assignment = span("assignment");

    // (first, last) of one type must come after the last of every earlier type.
    let before = |earlier: Option<(u32, u32)>, later: Option<(u32, u32)>| match (earlier, later) {
        (Some((_, last)), Some((first, _))) => first < last,
        _ => false,
    };

    let mut issues = Vec::new();
    if before(study, discussion) {
        issues.push(format!(
            "Week {}: Discussion appears before Study activities",
            week.week_number
        ));
    }
    if before(discussion, assignment) || before(study, assignment) {
        issues.push(format!(
            "Week {}: Assignment appears before Discussion activities",
            week.week_number
        ));
    }
    issues
}
