//! `.coursemap.toml` configuration.
//!
//! Every section and key is optional; missing values take their defaults.
//! The file is looked up in the working directory and up to nine of its
//! ancestors unless a path is given explicitly.

mod core;
mod loader;

pub use self::core::{BatchConfig, CatalogConfig, CourseMapConfig, OutputConfig, PathsConfig, PolicyConfig};

pub use loader::{
    directory_ancestors, load_config, load_config_from, load_config_from_path,
    parse_and_validate_config, CONFIG_FILE_NAME,
};

/// Contents written by `coursemap init`.
pub const DEFAULT_CONFIG_TOML: &str = r#"# Coursemap Configuration

[paths]
output_dir = "output"

[batch]
# Documents transformed concurrently per group
group_size = 3
# Source files larger than this are rejected (bytes)
max_file_size = 52428800
max_files = 50

[policy]
enabled = true
require_text = true
validate_sequencing = true
check_competency_mapping = true
require_activity_code = true
enforce_type_order = true

[catalog]
cache_ttl_secs = 300
page_size = 20

[output]
pretty = true
include_analytics = false
"#;
