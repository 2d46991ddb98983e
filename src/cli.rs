use crate::catalog::{CourseType, SortKey, SortOrder};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    #[default]
    Terminal,
    /// Machine-readable JSON on stdout
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "coursemap")]
#[command(about = "Course export normalizer and curriculum analytics", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to the nearest .coursemap.toml)
    #[arg(long, global = true, env = "COURSEMAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress bars and informational logs
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Normalize one course export
    Transform {
        /// Source export (JSON)
        input: PathBuf,

        /// Output file (defaults to <output_dir>/<stem>_output.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip the activity policy rules
        #[arg(long)]
        no_policy: bool,

        /// Also print analytics for the normalized document
        #[arg(long)]
        analytics: bool,

        /// Write compact rather than pretty-printed JSON
        #[arg(long)]
        compact: bool,

        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,
    },

    /// Normalize every export in a directory
    Batch {
        /// Directory containing source exports
        dir: PathBuf,

        /// Output directory (defaults to paths.output_dir)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Documents transformed concurrently per group
        #[arg(long)]
        group_size: Option<usize>,

        /// Write the batch results as JSON to this file
        #[arg(long)]
        report: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,
    },

    /// List normalized documents
    List {
        /// Directory of *_output.json files (defaults to paths.output_dir)
        dir: Option<PathBuf>,

        #[command(flatten)]
        filter: ListArgs,

        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,
    },

    /// Show the catalog summary of one normalized document
    Show {
        filename: String,

        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Delete a normalized document
    Delete {
        filename: String,

        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Curriculum analytics for a normalized document
    Analytics {
        /// Normalized document, or a source export with --from-source
        path: PathBuf,

        /// Treat the input as a source export and normalize it in memory
        #[arg(long)]
        from_source: bool,

        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,
    },

    /// Write a default .coursemap.toml in the current directory
    Init {
        /// Overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Case-insensitive match on course name, number or filename
    #[arg(short, long)]
    pub search: Option<String>,

    #[arg(long, value_enum, default_value = "date")]
    pub sort: SortKey,

    #[arg(long, value_enum, default_value = "desc")]
    pub order: SortOrder,

    #[arg(long, value_enum)]
    pub course_type: Option<CourseType>,

    /// Earliest lastUpdated (RFC 3339 or YYYY-MM-DD)
    #[arg(long, value_parser = parse_date, requires = "to")]
    pub from: Option<DateTime<Utc>>,

    /// Latest lastUpdated (RFC 3339 or YYYY-MM-DD)
    #[arg(long, value_parser = parse_date, requires = "from")]
    pub to: Option<DateTime<Utc>>,

    #[arg(long, default_value = "1")]
    pub page: usize,

    /// Page size (defaults to catalog.page_size)
    #[arg(long)]
    pub limit: Option<usize>,
}

pub fn parse_date(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("invalid date '{value}', expected RFC 3339 or YYYY-MM-DD"))
}
