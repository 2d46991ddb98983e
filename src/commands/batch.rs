use crate::batch::{process_directory, BatchOptions, BatchResults};
use crate::cli::OutputFormat;
use crate::config::CourseMapConfig;
use crate::io::{ensure_dir, to_json, write_file};
use crate::progress::{ProgressManager, TEMPLATE_BATCH};
use anyhow::{Context, Result};
use colored::*;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct BatchArgs {
    pub dir: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub group_size: Option<usize>,
    pub report: Option<PathBuf>,
    pub format: OutputFormat,
}

pub fn handle_batch(config: &CourseMapConfig, progress: &ProgressManager, args: BatchArgs) -> Result<()> {
    let mut options = BatchOptions::from_config(config);
    if let Some(output_dir) = args.output_dir {
        options = options.with_output_dir(output_dir);
    }
    if let Some(group_size) = args.group_size {
        options.group_size = group_size.max(1);
    }
    ensure_dir(&options.output_dir)?;

    let bar = progress.create_bar(0, TEMPLATE_BATCH);
    bar.set_message("Transforming");
    let results = process_directory(&args.dir, &options, &bar)
        .with_context(|| format!("Batch over {} failed", args.dir.display()))?;
    bar.finish_and_clear();
    progress.clear();

    if let Some(report) = &args.report {
        write_file(report, &to_json(&results, true)?)
            .with_context(|| format!("Failed to write batch report to {}", report.display()))?;
    }

    match args.format {
        OutputFormat::Json => super::print_json(&results),
        OutputFormat::Terminal => {
            print_results(&results);
            Ok(())
        }
    }
}

fn print_results(results: &BatchResults) {
    for success in &results.successful {
        println!(
            "{} {} -> {}",
            "✓".green(),
            success.filename,
            success.output_path.display()
        );
    }
    for failure in &results.failed {
        println!(
            "{} {} [{}] {}",
            "✗".red(),
            failure.filename,
            failure.code,
            failure.error.red()
        );
    }
    println!(
        "\n{} processed, {} succeeded, {} failed",
        results.total_processed,
        results.successful.len().to_string().green(),
        results.failed.len().to_string().red()
    );
}
