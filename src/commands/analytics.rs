use crate::analytics::{generate_analytics, CourseAnalytics};
use crate::cli::OutputFormat;
use crate::config::CourseMapConfig;
use crate::error::CourseMapError;
use crate::io::{load_document, read_file};
use crate::transform::transform_value;
use anyhow::{Context, Result};
use colored::*;
use comfy_table::{presets::UTF8_FULL, Table};
use serde_json::Value;
use std::path::Path;

pub fn handle_analytics(
    config: &CourseMapConfig,
    path: &Path,
    from_source: bool,
    format: OutputFormat,
) -> Result<()> {
    let document = if from_source {
        let value: Value = serde_json::from_str(&read_file(path)?).map_err(CourseMapError::from)?;
        let (document, advisories) = transform_value(value, config.policy.activity_policy().as_ref())
            .with_context(|| format!("Failed to normalize {}", path.display()))?;
        super::print_advisories(&advisories);
        document
    } else {
        load_document(path).with_context(|| format!("Failed to load {}", path.display()))?
    };

    let analytics = generate_analytics(&document);
    match format {
        OutputFormat::Json => super::print_json(&analytics),
        OutputFormat::Terminal => {
            print_summary(&analytics);
            Ok(())
        }
    }
}

pub(crate) fn print_summary(analytics: &CourseAnalytics) {
    let overview = &analytics.overview;
    println!("{}", "Overview".bold().underline());
    println!(
        "  {} activities, {} points, {:.1} points per graded activity",
        overview.total_activities, overview.total_points, overview.average_points_per_activity
    );
    println!(
        "  graded {} / non-graded {}",
        overview.graded_vs_non_graded.graded, overview.graded_vs_non_graded.non_graded
    );

    let mut types = Table::new();
    types.load_preset(UTF8_FULL).set_header(vec!["Type", "Count", "%"]);
    for share in &overview.type_distribution {
        types.add_row(vec![
            share.activity_type.clone(),
            share.count.to_string(),
            format!("{:.1}", share.percentage),
        ]);
    }
    println!("{types}");

    let workload = &analytics.workload_analysis;
    println!("{}", "Workload".bold().underline());
    if let (Some(heaviest), Some(lightest)) = (&workload.heaviest_week, &workload.lightest_week) {
        println!(
            "  heaviest week {} ({} points), lightest week {} ({} points)",
            heaviest.week_number, heaviest.total_points, lightest.week_number, lightest.total_points
        );
    }
    println!(
        "  {:.1} activities per week",
        workload.average_activities_per_week
    );

    let sequencing = &analytics.sequencing;
    println!("{}", "Sequencing".bold().underline());
    if let Some(dominant) = sequencing.typical_patterns.first() {
        println!(
            "  most common week: {} ({:.1}% of weeks)",
            dominant.pattern.join(" → "),
            dominant.percentage
        );
    }
    for inconsistency in &sequencing.inconsistencies {
        println!(
            "  {} week {}: {}",
            "≠".yellow(),
            inconsistency.week_number,
            inconsistency.pattern.join(" → ")
        );
    }

    let mapping = &analytics.competency_mapping;
    println!("{}", "Competencies".bold().underline());
    let mut coverage = Table::new();
    coverage
        .load_preset(UTF8_FULL)
        .set_header(vec!["Competency", "Activities", "Points", "Weeks"]);
    for competency in &overview.competency_coverage {
        let weeks: Vec<String> = competency.weeks_covered.iter().map(u32::to_string).collect();
        coverage.add_row(vec![
            competency.competency_text.clone().unwrap_or_default(),
            competency.total_activities.to_string(),
            competency.total_points.to_string(),
            weeks.join(", "),
        ]);
    }
    println!("{coverage}");
    if !mapping.unmapped_activities.is_empty() {
        println!(
            "  {} {} activities map to no competency",
            "⚠".yellow(),
            mapping.unmapped_activities.len()
        );
    }
}
