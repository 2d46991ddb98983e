use crate::analytics::{generate_analytics, CourseAnalytics};
use crate::batch::output_path_for;
use crate::cli::OutputFormat;
use crate::config::CourseMapConfig;
use crate::document::{ActivityCounts, Metadata};
use crate::error::CourseMapError;
use crate::io::read_file;
use crate::transform::{transform_source, TransformOptions};
use crate::validate::Advisory;
use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct TransformArgs {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub no_policy: bool,
    pub analytics: bool,
    pub compact: bool,
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TransformReport {
    output_path: PathBuf,
    metadata: Metadata,
    activity_counts: ActivityCounts,
    advisories: Vec<Advisory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    analytics: Option<CourseAnalytics>,
}

pub fn handle_transform(config: &CourseMapConfig, args: TransformArgs) -> Result<()> {
    let contents = read_file(&args.input)?;
    let value: Value = serde_json::from_str(&contents)
        .map_err(CourseMapError::from)
        .with_context(|| format!("Failed to parse {}", args.input.display()))?;

    let destination = args
        .output
        .clone()
        .unwrap_or_else(|| output_path_for(&args.input, &config.paths.output_dir));
    let options = TransformOptions {
        policy: if args.no_policy {
            None
        } else {
            config.policy.activity_policy()
        },
        pretty: config.output.pretty && !args.compact,
    };

    let outcome = match transform_source(value, &destination, &options) {
        Ok(outcome) => outcome,
        Err(e) => {
            report_failure(&e);
            return Err(e).with_context(|| format!("Failed to transform {}", args.input.display()));
        }
    };

    let analytics = (args.analytics || config.output.include_analytics)
        .then(|| generate_analytics(&outcome.document));

    match args.format {
        OutputFormat::Json => super::print_json(&TransformReport {
            output_path: outcome.output_path,
            metadata: outcome.document.metadata,
            activity_counts: outcome.document.activity_counts,
            advisories: outcome.advisories,
            analytics,
        }),
        OutputFormat::Terminal => {
            super::print_advisories(&outcome.advisories);
            let counts = &outcome.document.activity_counts;
            println!(
                "{} {} ({} weeks, {} activities) -> {}",
                "✓".green(),
                outcome
                    .document
                    .course
                    .name
                    .as_deref()
                    .unwrap_or("Untitled course")
                    .bold(),
                outcome.document.weeks.len(),
                counts.total,
                outcome.output_path.display()
            );
            println!(
                "  study {}, discussion {}, assignment {}, other {}",
                counts.by_type.study, counts.by_type.discussion, counts.by_type.assignment, counts.by_type.other
            );
            if let Some(analytics) = &analytics {
                super::analytics::print_summary(analytics);
            }
            Ok(())
        }
    }
}

fn report_failure(error: &CourseMapError) {
    eprintln!("{} [{}] transformation failed", "✗".red(), error.code());
    for detail in error.details() {
        eprintln!("  - {}", detail.red());
    }
}
