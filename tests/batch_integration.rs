//! Batch processing and the catalog built over its output.

mod common;

use common::{business_course, write_json, SourceBuilder};
use coursemap::batch::{process_directory, process_files, BatchOptions};
use coursemap::catalog::{Catalog, CourseType, ListQuery, SortKey, SortOrder};
use coursemap::config::CourseMapConfig;
use coursemap::error::ErrorCode;
use indicatif::ProgressBar;
use serde_json::json;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn options(output: &std::path::Path, group_size: usize) -> BatchOptions {
    let mut options = BatchOptions::from_config(&CourseMapConfig::default()).with_output_dir(output);
    options.group_size = group_size;
    options
}

/// Five valid exports and two broken ones in one directory.
fn create_uploads() -> (TempDir, TempDir) {
    let uploads = TempDir::new().expect("Failed to create uploads dir");
    let output = TempDir::new().expect("Failed to create output dir");

    write_json(uploads.path(), "BUS3004.json", &business_course());
    for (index, model) in ["GUIDED_PATH", "FLEX_PATH", "FLEX_PATH", "CUSTOM"].iter().enumerate() {
        let source = SourceBuilder::new(&format!("Course {index}"), &format!("GEN{index}00"))
            .course_field("courseDesignModelType", json!(model))
            .course_field("updatedDate", json!(format!("2024-0{}-01", index + 1)))
            .unit("Week 1", &[1])
            .activity(1, "STUDY", 0.0)
            .build();
        write_json(uploads.path(), &format!("GEN{index}.json"), &source);
    }
    fs::write(uploads.path().join("broken.json"), "{ not json").unwrap();
    write_json(uploads.path(), "shapeless.json", &json!({"course": {}}));
    // Earlier output in the uploads directory is not a source.
    write_json(uploads.path(), "old_output.json", &json!({}));

    (uploads, output)
}

#[test]
fn test_batch_isolates_failures() {
    let (uploads, output) = create_uploads();
    let results = process_directory(uploads.path(), &options(output.path(), 3), &ProgressBar::hidden())
        .expect("batch should run");

    assert_eq!(results.total_processed, 7);
    assert_eq!(results.successful.len(), 5);
    assert_eq!(results.failed.len(), 2);

    let mut failures: Vec<_> = results
        .failed
        .iter()
        .map(|f| (f.filename.as_str(), f.code.as_str()))
        .collect();
    failures.sort();
    assert_eq!(
        failures,
        vec![
            ("broken.json", ErrorCode::INPUT_REJECTED.as_str()),
            ("shapeless.json", ErrorCode::SOURCE_SHAPE.as_str()),
        ]
    );

    assert!(output.path().join("BUS3004_output.json").exists());
    assert!(!output.path().join("shapeless_output.json").exists());
    assert!(results.start_time <= results.end_time);
}

#[test]
fn test_group_size_does_not_change_results() {
    let (uploads, _) = create_uploads();
    let mut outcomes = Vec::new();
    for group_size in [1, 2, 7] {
        let output = TempDir::new().unwrap();
        let results =
            process_directory(uploads.path(), &options(output.path(), group_size), &ProgressBar::hidden())
                .unwrap();
        let mut names: Vec<_> = results.successful.iter().map(|s| s.filename.clone()).collect();
        names.sort();
        outcomes.push(names);
    }
    assert_eq!(outcomes[0], outcomes[1]);
    assert_eq!(outcomes[1], outcomes[2]);
}

#[test]
fn test_batch_results_serialize_camel_case() {
    let (uploads, output) = create_uploads();
    let results =
        process_directory(uploads.path(), &options(output.path(), 3), &ProgressBar::hidden()).unwrap();
    let value = serde_json::to_value(&results).unwrap();
    assert!(value["totalProcessed"].is_number());
    assert!(value["successful"][0]["outputPath"].is_string());
    assert!(value["failed"][0]["error"].is_string());
}

#[test]
fn test_too_many_files_rejects_the_batch() {
    let (uploads, output) = create_uploads();
    let mut opts = options(output.path(), 3);
    opts.max_files = 2;
    let files = coursemap::io::find_source_files(uploads.path()).unwrap();
    let err = process_files(&files, &opts, &ProgressBar::hidden()).unwrap_err();
    assert_eq!(err.code(), ErrorCode::INPUT_REJECTED);
    assert_eq!(fs::read_dir(output.path()).unwrap().count(), 0);
}

#[test]
fn test_catalog_lists_batch_output() {
    let (uploads, output) = create_uploads();
    process_directory(uploads.path(), &options(output.path(), 3), &ProgressBar::hidden()).unwrap();

    let mut catalog = Catalog::new(output.path(), Duration::from_secs(300));
    let all = catalog.list(&ListQuery::default()).unwrap();
    assert_eq!(all.total, 5);

    let flex = catalog
        .list(&ListQuery {
            course_type: Some(CourseType::Flex),
            sort_by: SortKey::Number,
            order: SortOrder::Asc,
            ..Default::default()
        })
        .unwrap();
    let numbers: Vec<_> = flex.files.iter().map(|f| f.course_number.as_str()).collect();
    assert_eq!(numbers, vec!["GEN100", "GEN200"]);

    let custom = catalog
        .list(&ListQuery {
            course_type: Some(CourseType::Custom),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(custom.total, 1);

    let summary = catalog.metadata("BUS3004_output.json").unwrap().unwrap();
    assert_eq!(summary.course_name, "Business Strategy");
    assert_eq!(summary.activity_counts.total, 6);
}
