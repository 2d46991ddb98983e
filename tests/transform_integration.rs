//! End-to-end transformation of a realistic course export.

mod common;

use common::{business_course, SourceBuilder};
use coursemap::document::{GradeBound, ResourceKind};
use coursemap::error::ErrorCode;
use coursemap::policy::ActivityPolicy;
use coursemap::source::RecordId;
use coursemap::transform::{transform_source, transform_value, TransformOptions};
use coursemap::validate::AdvisoryKind;
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

#[test]
fn test_weeks_follow_markers_then_position() {
    let (document, _) = transform_value(business_course(), None).unwrap();

    let weeks: Vec<_> = document
        .weeks
        .iter()
        .map(|w| (w.week_number, w.title.clone().unwrap_or_default()))
        .collect();
    assert_eq!(
        weeks,
        vec![
            (1, "Week 1: Foundations".to_string()),
            (2, "Week 2: Markets".to_string()),
            (3, "Capstone".to_string()),
        ]
    );
    assert_eq!(document.metadata.total_weeks, 3);
}

#[test]
fn test_week_one_is_resolved_and_ordered() {
    let (document, _) = transform_value(business_course(), None).unwrap();
    let week = &document.weeks[0];

    let order: Vec<_> = week
        .activities
        .iter()
        .map(|a| (a.sequence_number, a.id.clone(), a.activity_type.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![
            (1, RecordId::Num(1), "STUDY"),
            (2, RecordId::Num(2), "DISCUSSION"),
            (3, RecordId::Num(3), "ASSIGNMENT"),
        ]
    );

    assert_eq!(week.activities[0].text, "Read chapter 1 carefully.");
    assert_eq!(
        week.introduction.as_ref().map(|i| i.text.as_str()),
        Some("Welcome to week one")
    );
    assert_eq!(week.duration, Some(json!("7 days")));
    assert_eq!(week.activity_count.total, 3);
    assert_eq!(week.activity_count.by_type.get("assignment"), Some(&1));

    let week_resources: Vec<_> = week.resources.iter().map(|r| r.id.clone()).collect();
    assert_eq!(week_resources, vec![Some(RecordId::Num(800))]);
}

#[test]
fn test_rubric_activity_carries_scoring_guide() {
    let (document, _) = transform_value(business_course(), None).unwrap();
    let memo = document
        .activities()
        .find(|a| a.id == RecordId::Num(3))
        .unwrap();

    let guide = memo.scoring_guide.as_ref().expect("rubric activity has a guide");
    assert_eq!(guide.criteria.len(), 2);
    assert_eq!(guide.criteria[0].grade_points, 60.0);
    assert_eq!(guide.criteria[0].performance_levels.len(), 2);
    assert_eq!(
        memo.competencies,
        vec![RecordId::Text("C1".into()), RecordId::Text("C2".into())]
    );

    let plain = document
        .activities()
        .find(|a| a.id == RecordId::Num(5))
        .unwrap();
    assert!(plain.scoring_guide.is_none());
}

#[test]
fn test_counts_points_and_grading_scheme() {
    let (document, advisories) = transform_value(business_course(), None).unwrap();

    assert_eq!(document.activity_counts.total, 6);
    let by_type = document.activity_counts.by_type;
    assert_eq!(
        (by_type.study, by_type.discussion, by_type.assignment, by_type.other),
        (2, 1, 2, 1)
    );
    assert_eq!(document.course.total_points, 200.0);
    assert_eq!(document.grading_scheme.a, GradeBound::Min { min: 93 });
    assert_eq!(document.grading_scheme.f, GradeBound::Max { max: 74 });
    assert!(advisories.is_empty(), "unexpected advisories: {advisories:?}");
}

#[test]
fn test_competency_view_uses_final_weeks() {
    let (document, _) = transform_value(business_course(), None).unwrap();

    let c1 = &document.competencies[0];
    assert_eq!(c1.text.as_deref(), Some("Analyze markets"));
    assert_eq!(c1.total_points, 150.0);
    let placed: Vec<_> = c1
        .activities
        .iter()
        .map(|a| (a.id.clone(), a.week_number, a.week_sequence))
        .collect();
    assert_eq!(
        placed,
        vec![
            (RecordId::Num(3), 1, Some(3)),
            (RecordId::Num(5), 2, Some(2)),
        ]
    );
    assert_eq!(c1.activities[0].criteria.len(), 1);
}

#[test]
fn test_resources_grouped_with_usage() {
    let (document, _) = transform_value(business_course(), None).unwrap();

    let reading = &document.resources[&ResourceKind::ReadingList];
    assert_eq!(reading.count, 1);
    assert_eq!(reading.resources[0].links, vec!["https://library.example/r1"]);
    assert_eq!(reading.resources[0].usage.weeks, vec![1]);

    let video = &document.resources[&ResourceKind::Multimedia];
    assert_eq!(video.resources[0].usage.weeks, vec![2]);
    assert!(!document.resources.contains_key(&ResourceKind::Rubric));
}

#[test]
fn test_sequencing_by_week_and_type() {
    let (document, _) = transform_value(business_course(), None).unwrap();
    let value = serde_json::to_value(&document.activity_sequencing).unwrap();

    assert_eq!(value["byWeek"]["1"]["studies"][0]["id"], json!(1));
    assert_eq!(value["byWeek"]["2"]["assignments"][0]["sequence"], json!(2));
    assert!(value["byType"].is_object());
}

#[test]
fn test_output_serializes_in_camel_case() {
    let (document, _) = transform_value(business_course(), None).unwrap();
    let value = serde_json::to_value(&document).unwrap();

    for key in [
        "course",
        "metadata",
        "competencies",
        "courseOverview",
        "weeks",
        "resources",
        "gradingScheme",
        "activityCounts",
        "activitySequencing",
    ] {
        assert!(value.get(key).is_some(), "missing section {key}");
    }
    assert_eq!(value["metadata"]["lastUpdated"], json!("2024-02-15T10:30:00.000Z"));
    assert_eq!(value["course"]["totalPoints"], json!(200.0));
}

#[test]
fn test_missing_sections_are_rejected_before_work() {
    let err = transform_value(json!({"course": {}, "activities": []}), None).unwrap_err();
    assert_eq!(err.code(), ErrorCode::SOURCE_SHAPE);
    assert!(err.to_string().contains("units"));
    assert!(err.to_string().contains("competencies"));
}

#[test]
fn test_unmapped_assignment_is_advisory() {
    let source = SourceBuilder::new("Ethics", "PHI200")
        .unit("Week 1", &[1])
        .activity(1, "ASSIGNMENT", 40.0)
        .build();
    let (_, advisories) = transform_value(source.clone(), None).unwrap();
    assert!(advisories
        .iter()
        .any(|a| a.kind == AdvisoryKind::UnmappedAssignment));

    let (_, with_policy) = transform_value(source, Some(&ActivityPolicy::default())).unwrap();
    let mapping: Vec<_> = with_policy
        .iter()
        .filter(|a| a.message.contains("competency mappings"))
        .collect();
    assert_eq!(mapping.len(), 1, "{with_policy:?}");
    assert_eq!(mapping[0].kind, AdvisoryKind::UnmappedAssignment);
}

#[test]
fn test_malformed_references_degrade_instead_of_failing() {
    let source = SourceBuilder::new("Ethics", "PHI200")
        .unit_value(json!({"unit": {"title": "Week 1"}, "activityIds": [1, null, 2]}))
        .activity_value(json!({"id": 1, "activityType": "STUDY", "gradePoints": "10"}))
        .activity(2, "ASSIGNMENT", 30.0)
        .build();
    let (document, _) = transform_value(source, None).unwrap();

    let ids: Vec<_> = document.weeks[0].activities.iter().map(|a| a.id.clone()).collect();
    assert_eq!(ids, vec![RecordId::Num(1), RecordId::Num(2)]);
    assert_eq!(document.activity_counts.total, 2);
    assert_eq!(document.course.total_points, 30.0);
}

#[test]
fn test_policy_reports_code_mismatches() {
    let source = SourceBuilder::new("Ethics", "PHI200")
        .unit("Week 1", &[1, 2])
        .activity_value(json!({"id": 1, "code": "u01s1", "activityType": "STUDY", "activityTextId": 9}))
        .activity_value(json!({"id": 2, "code": "wrong", "activityType": "DISCUSSION", "activityTextId": 9}))
        .activity_text(9, "Body")
        .build();

    let policy = ActivityPolicy::default();
    let (_, advisories) = transform_value(source, Some(&policy)).unwrap();
    let policy_messages: Vec<_> = advisories
        .iter()
        .filter(|a| a.kind == AdvisoryKind::ActivityPolicy)
        .map(|a| a.message.as_str())
        .collect();
    assert_eq!(policy_messages.len(), 1, "{policy_messages:?}");
    assert!(policy_messages[0].contains("u01d2"));
}

#[test]
fn test_transform_source_persists_only_valid_documents() {
    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("out").join("BUS3004_output.json");

    let outcome = transform_source(business_course(), &destination, &TransformOptions::default()).unwrap();
    assert_eq!(outcome.output_path, destination);
    let reloaded = coursemap::io::load_document(&destination).unwrap();
    assert_eq!(reloaded, outcome.document);

    let rejected = dir.path().join("out").join("broken_output.json");
    let err = transform_source(json!({"course": {}}), &rejected, &TransformOptions::default()).unwrap_err();
    assert_eq!(err.code(), ErrorCode::SOURCE_SHAPE);
    assert!(!rejected.exists());
}
