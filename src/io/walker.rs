use crate::error::{CourseMapError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File name suffix of every normalized document.
pub const OUTPUT_SUFFIX: &str = "_output.json";

/// Lists the files directly inside a directory whose names end with a
/// given suffix. Subdirectories are not descended into.
pub struct FileWalker {
    root: PathBuf,
    suffix: String,
    exclude_suffixes: Vec<String>,
}

impl FileWalker {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            suffix: ".json".to_string(),
            exclude_suffixes: vec![],
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn excluding(mut self, suffix: impl Into<String>) -> Self {
        self.exclude_suffixes.push(suffix.into());
        self
    }

    /// Matching files sorted by name.
    pub fn walk(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut skipped = 0usize;

        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    let source = err
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
                    return Err(CourseMapError::io(&self.root, source));
                }
                Err(err) => {
                    log::warn!("Skipping directory entry: {}", err);
                    skipped += 1;
                    continue;
                }
            };

            if entry.file_type().is_file() && self.should_process(entry.path()) {
                files.push(entry.into_path());
            }
        }

        if skipped > 0 {
            log::debug!("Skipped {} unreadable entries in {}", skipped, self.root.display());
        }
        Ok(files)
    }

    fn should_process(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
            return false;
        };
        name.ends_with(&self.suffix)
            && !self
                .exclude_suffixes
                .iter()
                .any(|excluded| name.ends_with(excluded.as_str()))
    }
}

/// Source documents awaiting transformation: `*.json`, minus previous
/// `*_output.json` results.
pub fn find_source_files(root: &Path) -> Result<Vec<PathBuf>> {
    FileWalker::new(root.to_path_buf())
        .excluding(OUTPUT_SUFFIX)
        .walk()
}

/// Normalized documents written by earlier transformations.
pub fn find_output_files(root: &Path) -> Result<Vec<PathBuf>> {
    FileWalker::new(root.to_path_buf())
        .with_suffix(OUTPUT_SUFFIX)
        .walk()
}

pub fn get_file_size(path: &Path) -> Result<u64> {
    std::fs::metadata(path)
        .map(|metadata| metadata.len())
        .map_err(|e| CourseMapError::io(path, e))
}
