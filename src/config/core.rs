use crate::policy::ActivityPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_group_size() -> usize {
    3
}

fn default_max_file_size() -> u64 {
    50 * 1024 * 1024
}

fn default_max_files() -> usize {
    50
}

fn default_true() -> bool {
    true
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_page_size() -> usize {
    20
}

/// Root configuration structure for coursemap
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseMapConfig {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub batch: BatchConfig,

    /// Activity policy rules applied after validation
    #[serde(default)]
    pub policy: PolicyConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Where normalized documents are written and listed from
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

/// Batch processing limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Documents transformed concurrently per group (default: 3)
    #[serde(default = "default_group_size")]
    pub group_size: usize,

    /// Source files larger than this are rejected before parsing (bytes)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Maximum number of files accepted in one batch
    #[serde(default = "default_max_files")]
    pub max_files: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            group_size: default_group_size(),
            max_file_size: default_max_file_size(),
            max_files: default_max_files(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(flatten)]
    pub rules: ActivityPolicy,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rules: ActivityPolicy::default(),
        }
    }
}

impl PolicyConfig {
    /// The rules to apply, or `None` when the policy layer is switched off.
    pub fn activity_policy(&self) -> Option<ActivityPolicy> {
        self.enabled.then_some(self.rules)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Listing cache lifetime; the cache is rebuilt by a full re-scan
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
            page_size: default_page_size(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Pretty-print persisted documents (default: true)
    #[serde(default = "default_true")]
    pub pretty: bool,

    /// Print analytics after each single-file transform
    #[serde(default)]
    pub include_analytics: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            include_analytics: false,
        }
    }
}

impl CourseMapConfig {
    /// Check values serde cannot: sizes and counts must be positive.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        if self.batch.group_size == 0 {
            errors.push("batch.group_size must be at least 1".to_string());
        }
        if self.batch.max_file_size == 0 {
            errors.push("batch.max_file_size must be greater than 0".to_string());
        }
        if self.batch.max_files == 0 {
            errors.push("batch.max_files must be at least 1".to_string());
        }
        if self.catalog.page_size == 0 {
            errors.push("catalog.page_size must be at least 1".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
