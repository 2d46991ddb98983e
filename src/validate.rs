//! Structural validation of an assembled document.
//!
//! Runs once after assembly. Structural violations abort the document;
//! advisories are logged and returned with the successful result.

use crate::document::{CourseDocument, REQUIRED_SECTIONS};
use crate::error::{CourseMapError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryKind {
    /// The running activity counter disagreed with the placed activities.
    CountReconciliation,
    /// An assignment has no competency links.
    UnmappedAssignment,
    /// A configurable activity policy rule was not met.
    ActivityPolicy,
}

/// A non-fatal finding reported alongside a successful transformation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisory {
    pub kind: AdvisoryKind,
    pub message: String,
}

impl Advisory {
    pub fn new(kind: AdvisoryKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Sections from [`REQUIRED_SECTIONS`] that are absent or null.
pub fn missing_sections(value: &Value) -> Vec<&'static str> {
    REQUIRED_SECTIONS
        .iter()
        .copied()
        .filter(|key| value.get(key).is_none_or(Value::is_null))
        .collect()
}

/// Check every structural invariant of `document`.
///
/// All violations are collected before failing so the error lists each of
/// them. On success, returns the advisories for assignments without
/// competency links.
pub fn validate_document(document: &CourseDocument) -> Result<Vec<Advisory>> {
    let mut violations = Vec::new();

    let value = serde_json::to_value(document)?;
    let missing = missing_sections(&value);
    if !missing.is_empty() {
        violations.push(format!("Missing required sections: {}", missing.join(", ")));
    }

    let counts = &document.activity_counts;
    let sum = counts.by_type.sum();
    if counts.total != sum {
        violations.push(format!(
            "Activity count mismatch: total={}, sum={}",
            counts.total, sum
        ));
    }

    let contiguous = document
        .weeks
        .iter()
        .enumerate()
        .all(|(index, week)| week.week_number as usize == index + 1);
    if !contiguous {
        violations.push("Week numbers are not sequential".to_string());
    }

    if !violations.is_empty() {
        return Err(CourseMapError::structural(violations));
    }

    let unmapped: Vec<String> = document
        .activities()
        .filter(|activity| activity.activity_type.eq_ignore_ascii_case("assignment"))
        .filter(|activity| activity.competencies.is_empty())
        .map(|activity| {
            activity
                .code
                .clone()
                .unwrap_or_else(|| activity.id.to_string())
        })
        .collect();

    if !unmapped.is_empty() {
        warn!(
            "Found assignments without competency mappings: {}",
            unmapped.join(", ")
        );
    }

    Ok(unmapped
        .into_iter()
        .map(|code| {
            Advisory::new(
                AdvisoryKind::UnmappedAssignment,
                format!("Assignment {code} has no competency mappings"),
            )
        })
        .collect())
}
