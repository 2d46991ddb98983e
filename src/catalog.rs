//! Listing of previously persisted normalized documents.
//!
//! The catalog keeps an in-memory summary of every `*_output.json` file in
//! its directory. The cache is never patched file by file: once its
//! time-to-live has passed, the next query rebuilds it from a full re-scan.

use crate::document::{ActivityCounts, CourseDocument, Metadata};
use crate::error::{CourseMapError, Result};
use crate::io::{dir_exists, find_output_files, load_document, OUTPUT_SUFFIX};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    pub filename: String,
    pub path: PathBuf,
    pub last_modified: DateTime<Utc>,
    pub size: u64,
    pub course_name: String,
    pub course_number: String,
    pub metadata: Metadata,
    pub activity_counts: ActivityCounts,
}

impl FileSummary {
    fn from_document(path: &Path, document: CourseDocument) -> Result<Self> {
        let stats = fs::metadata(path).map_err(|e| CourseMapError::io(path, e))?;
        let last_modified = stats
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());
        Ok(Self {
            filename: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: path.to_path_buf(),
            last_modified,
            size: stats.len(),
            course_name: document.course.name.unwrap_or_default(),
            course_number: document.course.number.unwrap_or_default(),
            metadata: document.metadata,
            activity_counts: document.activity_counts,
        })
    }

    fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.metadata
            .last_updated
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// File modification time
    #[default]
    Date,
    Name,
    Number,
    Size,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Classification by the course design model tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CourseType {
    /// GUIDED_PATH
    Guided,
    /// FLEX_PATH
    Flex,
    /// Neither
    Custom,
}

impl CourseType {
    pub fn matches(self, design_model: Option<&str>) -> bool {
        let model = design_model.unwrap_or_default();
        let guided = model.contains("GUIDED_PATH");
        let flex = model.contains("FLEX_PATH");
        match self {
            Self::Guided => guided,
            Self::Flex => flex,
            Self::Custom => !guided && !flex,
        }
    }
}

/// Inclusive range over `metadata.lastUpdated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

#[derive(Debug, Clone)]
pub struct ListQuery {
    pub search: Option<String>,
    pub sort_by: SortKey,
    pub order: SortOrder,
    pub course_type: Option<CourseType>,
    pub date_range: Option<DateRange>,
    /// 1-based.
    pub page: usize,
    pub limit: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search: None,
            sort_by: SortKey::default(),
            order: SortOrder::default(),
            course_type: None,
            date_range: None,
            page: 1,
            limit: 20,
        }
    }
}

impl ListQuery {
    fn matches(&self, file: &FileSummary) -> bool {
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            let hit = [&file.course_name, &file.course_number, &file.filename]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        if let Some(range) = &self.date_range {
            if !file.last_updated().is_some_and(|at| range.contains(at)) {
                return false;
            }
        }
        if let Some(course_type) = self.course_type {
            if !course_type.matches(file.metadata.course_design_model.as_deref()) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePage {
    pub files: Vec<FileSummary>,
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
}

pub struct Catalog {
    dir: PathBuf,
    ttl: Duration,
    cache: HashMap<String, FileSummary>,
    refreshed_at: Option<Instant>,
}

impl Catalog {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl,
            cache: HashMap::new(),
            refreshed_at: None,
        }
    }

    pub fn is_stale(&self) -> bool {
        self.refreshed_at.is_none_or(|at| at.elapsed() >= self.ttl)
    }

    /// Rebuild the cache from a full directory scan if its TTL has passed.
    pub fn refresh(&mut self) -> Result<()> {
        if !self.is_stale() {
            return Ok(());
        }

        let mut cache = HashMap::new();
        // A missing directory is an empty catalog.
        let files = if dir_exists(&self.dir) {
            find_output_files(&self.dir)?
        } else {
            Vec::new()
        };
        for path in files {
            let summary = load_document(&path).and_then(|doc| FileSummary::from_document(&path, doc));
            match summary {
                Ok(summary) => {
                    cache.insert(summary.filename.clone(), summary);
                }
                Err(e) => log::warn!("Skipping {}: {}", path.display(), e),
            }
        }
        log::debug!("Catalog rescanned {}: {} documents", self.dir.display(), cache.len());

        self.cache = cache;
        self.refreshed_at = Some(Instant::now());
        Ok(())
    }

    /// Force the next query to re-scan.
    pub fn invalidate(&mut self) {
        self.refreshed_at = None;
    }

    pub fn list(&mut self, query: &ListQuery) -> Result<FilePage> {
        self.refresh()?;

        let mut files: Vec<FileSummary> = self
            .cache
            .values()
            .filter(|file| query.matches(file))
            .cloned()
            .collect();

        // Filename first so equal sort keys come out in a stable order.
        files.sort_by(|a, b| a.filename.cmp(&b.filename));
        files.sort_by(|a, b| {
            let ordering = match query.sort_by {
                SortKey::Date => a.last_modified.cmp(&b.last_modified),
                SortKey::Name => a.course_name.cmp(&b.course_name),
                SortKey::Number => a.course_number.cmp(&b.course_number),
                SortKey::Size => a.size.cmp(&b.size),
            };
            match query.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let limit = query.limit.max(1);
        let page = query.page.max(1);
        let total = files.len();
        let files = files
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .collect();

        Ok(FilePage {
            files,
            total,
            page,
            total_pages: total.div_ceil(limit),
        })
    }

    pub fn metadata(&mut self, filename: &str) -> Result<Option<FileSummary>> {
        self.refresh()?;
        Ok(self.cache.get(filename).cloned())
    }

    /// Remove a document from disk and from the cache.
    pub fn delete(&mut self, filename: &str) -> Result<()> {
        let path = self.resolve(filename)?;
        fs::remove_file(&path).map_err(|e| CourseMapError::io(&path, e))?;
        self.cache.remove(filename);
        log::info!("Deleted {}", path.display());
        Ok(())
    }

    /// Only bare `*_output.json` names inside the catalog directory are
    /// accepted.
    fn resolve(&self, filename: &str) -> Result<PathBuf> {
        let candidate = Path::new(filename);
        let bare = candidate.file_name().is_some_and(|name| name == candidate.as_os_str());
        if filename.is_empty() || !bare || filename == ".." {
            return Err(CourseMapError::input(
                candidate,
                "expected a file name inside the output directory",
            ));
        }
        if filename.len() <= OUTPUT_SUFFIX.len() || !filename.ends_with(OUTPUT_SUFFIX) {
            return Err(CourseMapError::input(
                candidate,
                format!("only {OUTPUT_SUFFIX} documents can be deleted"),
            ));
        }
        Ok(self.dir.join(filename))
    }
}
