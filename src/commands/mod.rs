//! CLI command implementations.
//!
//! Available commands:
//! - **transform**: normalize one course export
//! - **batch**: normalize a directory of exports in concurrent groups
//! - **list**, **show**, **delete**: browse the catalog of normalized documents
//! - **analytics**: curriculum analytics for a normalized document
//! - **init**: write a default `.coursemap.toml`

pub mod analytics;
pub mod batch;
pub mod init;
pub mod list;
pub mod transform;

pub use init::init_config;

use crate::cli::{Cli, Commands};
use crate::config::{load_config, load_config_from_path, CourseMapConfig};
use crate::progress::{ProgressConfig, ProgressManager};
use crate::validate::Advisory;
use anyhow::{Context, Result};
use colored::*;
use std::path::Path;

pub fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(cli.config.as_deref())?;
    let progress = ProgressManager::new(ProgressConfig::from_env(cli.quiet, cli.verbose));

    match cli.command {
        Commands::Transform {
            input,
            output,
            no_policy,
            analytics,
            compact,
            format,
        } => transform::handle_transform(
            &config,
            transform::TransformArgs {
                input,
                output,
                no_policy,
                analytics,
                compact,
                format,
            },
        ),
        Commands::Batch {
            dir,
            output_dir,
            group_size,
            report,
            format,
        } => batch::handle_batch(
            &config,
            &progress,
            batch::BatchArgs {
                dir,
                output_dir,
                group_size,
                report,
                format,
            },
        ),
        Commands::List { dir, filter, format } => list::handle_list(&config, dir, &filter, format),
        Commands::Show { filename, dir } => list::handle_show(&config, dir, &filename),
        Commands::Delete { filename, dir } => list::handle_delete(&config, dir, &filename),
        Commands::Analytics {
            path,
            from_source,
            format,
        } => analytics::handle_analytics(&config, &path, from_source, format),
        Commands::Init { force } => init_config(force),
    }
}

/// An explicit `--config` must load cleanly; otherwise search upwards.
fn resolve_config(path: Option<&Path>) -> Result<CourseMapConfig> {
    match path {
        Some(path) => load_config_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(load_config()),
    }
}

pub(crate) fn print_advisories(advisories: &[Advisory]) {
    if advisories.is_empty() {
        return;
    }
    eprintln!("{} {} advisory warning(s):", "⚠".yellow(), advisories.len());
    for advisory in advisories {
        eprintln!("  - {}", advisory.message.yellow());
    }
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}
