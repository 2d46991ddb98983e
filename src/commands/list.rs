use crate::catalog::{Catalog, DateRange, FilePage, FileSummary, ListQuery};
use crate::cli::{ListArgs, OutputFormat};
use crate::config::CourseMapConfig;
use anyhow::{bail, Result};
use colored::*;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use std::path::PathBuf;
use std::time::Duration;

fn open_catalog(config: &CourseMapConfig, dir: Option<PathBuf>) -> Catalog {
    Catalog::new(
        dir.unwrap_or_else(|| config.paths.output_dir.clone()),
        Duration::from_secs(config.catalog.cache_ttl_secs),
    )
}

pub fn build_query(config: &CourseMapConfig, args: &ListArgs) -> ListQuery {
    ListQuery {
        search: args.search.clone(),
        sort_by: args.sort,
        order: args.order,
        course_type: args.course_type,
        date_range: args.from.zip(args.to).map(|(start, end)| DateRange { start, end }),
        page: args.page,
        limit: args.limit.unwrap_or(config.catalog.page_size),
    }
}

pub fn handle_list(
    config: &CourseMapConfig,
    dir: Option<PathBuf>,
    args: &ListArgs,
    format: OutputFormat,
) -> Result<()> {
    let mut catalog = open_catalog(config, dir);
    let page = catalog.list(&build_query(config, args))?;

    match format {
        OutputFormat::Json => super::print_json(&page),
        OutputFormat::Terminal => {
            print_page(&page);
            Ok(())
        }
    }
}

pub fn handle_show(config: &CourseMapConfig, dir: Option<PathBuf>, filename: &str) -> Result<()> {
    let mut catalog = open_catalog(config, dir);
    match catalog.metadata(filename)? {
        Some(summary) => super::print_json(&summary),
        None => bail!("No normalized document named {filename}"),
    }
}

pub fn handle_delete(config: &CourseMapConfig, dir: Option<PathBuf>, filename: &str) -> Result<()> {
    let mut catalog = open_catalog(config, dir);
    catalog.delete(filename)?;
    println!("{} Deleted {}", "✓".green(), filename);
    Ok(())
}

fn row(file: &FileSummary) -> Vec<String> {
    vec![
        file.filename.clone(),
        file.course_number.clone(),
        file.course_name.clone(),
        file.metadata.course_design_model.clone().unwrap_or_default(),
        file.metadata.total_weeks.to_string(),
        file.activity_counts.total.to_string(),
        file.metadata.last_updated.clone().unwrap_or_else(|| "-".to_string()),
        file.size.to_string(),
    ]
}

fn print_page(page: &FilePage) {
    if page.files.is_empty() {
        println!("No normalized documents found.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "File", "Number", "Course", "Model", "Weeks", "Activities", "Last updated", "Bytes",
        ]);
    for file in &page.files {
        table.add_row(row(file));
    }
    println!("{table}");
    println!(
        "Page {} of {} ({} documents)",
        page.page,
        page.total_pages.max(1),
        page.total
    );
}
