//! Many source documents in one run.
//!
//! Files are processed in fixed-size groups: every file of a group is
//! transformed in parallel and the whole group is collected before the next
//! one starts. Each job owns its own transformer, and a failing job is
//! recorded in [`BatchResults::failed`] without disturbing its siblings.

use crate::config::CourseMapConfig;
use crate::document::Metadata;
use crate::error::{CourseMapError, Result};
use crate::io::{find_source_files, get_file_size, read_file, OUTPUT_SUFFIX};
use crate::transform::{transform_source, TransformOptions, TransformOutcome};
use chrono::{SecondsFormat, Utc};
use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, info_span, warn};

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub output_dir: PathBuf,
    pub group_size: usize,
    pub max_file_size: u64,
    pub max_files: usize,
    pub transform: TransformOptions,
}

impl BatchOptions {
    pub fn from_config(config: &CourseMapConfig) -> Self {
        Self {
            output_dir: config.paths.output_dir.clone(),
            group_size: config.batch.group_size,
            max_file_size: config.batch.max_file_size,
            max_files: config.batch.max_files,
            transform: TransformOptions {
                policy: config.policy.activity_policy(),
                pretty: config.output.pretty,
            },
        }
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSuccess {
    pub filename: String,
    pub output_path: PathBuf,
    pub metadata: Metadata,
    pub advisories: usize,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub filename: String,
    pub error: String,
    pub code: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResults {
    pub successful: Vec<BatchSuccess>,
    pub failed: Vec<BatchFailure>,
    pub total_processed: usize,
    pub start_time: String,
    pub end_time: String,
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `<dir>/<stem>_output.json` for a source file.
pub fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "course".to_string());
    output_dir.join(format!("{stem}{OUTPUT_SUFFIX}"))
}

/// Size limit and JSON syntax, checked before any transformation work.
pub fn preflight(path: &Path, max_file_size: u64) -> Result<Value> {
    let size = get_file_size(path)?;
    if size > max_file_size {
        return Err(CourseMapError::input(
            path,
            format!("file is {size} bytes, limit is {max_file_size}"),
        ));
    }
    let contents = read_file(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| CourseMapError::input(path, format!("Invalid JSON format: {e}")))
}

/// Pre-flight, transform and persist one file.
pub fn process_file(path: &Path, options: &BatchOptions) -> Result<TransformOutcome> {
    let value = preflight(path, options.max_file_size)?;
    transform_source(value, &output_path_for(path, &options.output_dir), &options.transform)
}

pub fn process_files(paths: &[PathBuf], options: &BatchOptions, progress: &ProgressBar) -> Result<BatchResults> {
    if paths.len() > options.max_files {
        return Err(CourseMapError::input(
            paths.first().map(|p| p.as_path()).unwrap_or(Path::new(".")),
            format!("{} files exceed the batch limit of {}", paths.len(), options.max_files),
        ));
    }

    let span = info_span!("batch", files = paths.len(), group_size = options.group_size);
    let _enter = span.enter();

    let start_time = now();
    let mut results = BatchResults {
        successful: Vec::new(),
        failed: Vec::new(),
        total_processed: 0,
        start_time,
        end_time: String::new(),
    };

    for group in paths.chunks(options.group_size.max(1)) {
        let outcomes: Vec<(&PathBuf, Result<TransformOutcome>)> = group
            .par_iter()
            .map(|path| {
                let outcome = process_file(path, options);
                progress.inc(1);
                (path, outcome)
            })
            .collect();

        for (path, outcome) in outcomes {
            results.total_processed += 1;
            let filename = display_name(path);
            match outcome {
                Ok(outcome) => results.successful.push(BatchSuccess {
                    filename,
                    output_path: outcome.output_path,
                    metadata: outcome.document.metadata,
                    advisories: outcome.advisories.len(),
                    timestamp: now(),
                }),
                Err(e) => {
                    warn!(file = %filename, code = %e.code(), "Transformation failed: {}", e);
                    results.failed.push(BatchFailure {
                        filename,
                        error: e.to_string(),
                        code: e.code().to_string(),
                        timestamp: now(),
                    });
                }
            }
        }
    }

    results.end_time = now();
    info!(
        successful = results.successful.len(),
        failed = results.failed.len(),
        "Batch completed"
    );
    Ok(results)
}

/// Every `*.json` source in `dir` (excluding earlier `_output.json` files).
pub fn process_directory(dir: &Path, options: &BatchOptions, progress: &ProgressBar) -> Result<BatchResults> {
    let files = find_source_files(dir)?;
    progress.set_length(files.len() as u64);
    process_files(&files, options, progress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CourseMapConfig;
    use std::fs;
    use tempfile::TempDir;

    fn options(output_dir: &Path) -> BatchOptions {
        BatchOptions::from_config(&CourseMapConfig::default()).with_output_dir(output_dir)
    }

    #[test]
    fn test_output_path_for() {
        assert_eq!(
            output_path_for(Path::new("in/BUS3004.json"), Path::new("out")),
            PathBuf::from("out/BUS3004_output.json")
        );
    }

    #[test]
    fn test_preflight_rejects_large_and_invalid_files() {
        let dir = TempDir::new().unwrap();
        let big = dir.path().join("big.json");
        fs::write(&big, "[1, 2, 3]").unwrap();
        let err = preflight(&big, 4).unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::INPUT_REJECTED);

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{not json").unwrap();
        let err = preflight(&broken, 1024).unwrap_err();
        assert!(err.to_string().contains("Invalid JSON format"));
    }

    #[test]
    fn test_max_files_limit() {
        let dir = TempDir::new().unwrap();
        let mut opts = options(dir.path());
        opts.max_files = 1;
        let paths = vec![dir.path().join("a.json"), dir.path().join("b.json")];
        assert!(process_files(&paths, &opts, &ProgressBar::hidden()).is_err());
    }
}
