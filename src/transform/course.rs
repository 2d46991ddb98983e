//! Course-level sections: `course`, `metadata` and `courseOverview`.

use crate::document::{CourseOverview, CourseSummary, Metadata};
use crate::normalize::clean_text;
use crate::source::SourceDocument;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;

/// Sum of `gradePoints` over every source activity, placed or not.
pub fn calculate_total_points(source: &SourceDocument) -> f64 {
    source
        .activities
        .iter()
        .map(|entry| entry.activity.points())
        .sum()
}

pub fn assemble_course(source: &SourceDocument) -> CourseSummary {
    let course = &source.course;
    CourseSummary {
        id: course.id.clone(),
        number: course.number.clone(),
        name: course.name.clone(),
        credits: course.credits.clone(),
        version: course.version.clone(),
        course_type: course.instance_of.clone(),
        total_points: calculate_total_points(source),
    }
}

pub fn assemble_metadata(source: &SourceDocument) -> Metadata {
    let course = &source.course;
    Metadata {
        last_updated: course.updated_date.as_ref().and_then(iso_timestamp),
        version: course.version.clone(),
        status: course.status.clone(),
        effective_date: course.launch_date.clone(),
        course_design_model: course.course_design_model_type.clone(),
        total_weeks: source.units.len(),
        created_by: course.created_by.clone(),
        updated_by: course.updated_by.clone(),
    }
}

pub fn assemble_overview(source: &SourceDocument) -> CourseOverview {
    match &source.course_overview {
        Some(overview) => CourseOverview {
            id: overview.id.clone(),
            text: clean_text(overview.text.as_deref()),
        },
        None => CourseOverview {
            id: None,
            text: String::new(),
        },
    }
}

/// Render an export timestamp (epoch milliseconds or a date string) as
/// ISO-8601 UTC with millisecond precision.
pub fn iso_timestamp(value: &Value) -> Option<String> {
    let parsed = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(DateTime::<Utc>::from_timestamp_millis),
        Value::String(s) => parse_date_string(s.trim()),
        _ => None,
    }?;
    Some(parsed.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn parse_date_string(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(millis) = s.parse::<i64>() {
        return DateTime::<Utc>::from_timestamp_millis(millis);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
