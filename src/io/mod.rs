pub mod walker;

pub use walker::{find_output_files, find_source_files, get_file_size, FileWalker, OUTPUT_SUFFIX};

use crate::document::CourseDocument;
use crate::error::{CourseMapError, Result};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;

pub fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| CourseMapError::io(path, e))
}

pub fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| CourseMapError::io(path, e))
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| CourseMapError::io(path, e))?;
    }
    Ok(())
}

pub fn file_exists(path: &Path) -> bool {
    path.exists() && path.is_file()
}

pub fn dir_exists(path: &Path) -> bool {
    path.exists() && path.is_dir()
}

pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(rendered)
}

/// Write `document` to `destination` atomically: the bytes go to a
/// temporary sibling first and are renamed into place, so readers never
/// observe a half-written file.
pub fn persist_document(document: &CourseDocument, destination: &Path, pretty: bool) -> Result<()> {
    let json = to_json(document, pretty)?;

    let parent = destination
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|e| CourseMapError::persist(destination, e))?;

    let file_name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.json".to_string());
    let staging = parent.join(format!(".{file_name}.{}.tmp", std::process::id()));

    let written = fs::File::create(&staging)
        .and_then(|mut file| {
            file.write_all(json.as_bytes())?;
            file.sync_all()
        })
        .and_then(|_| fs::rename(&staging, destination));

    if let Err(e) = written {
        let _ = fs::remove_file(&staging);
        return Err(CourseMapError::persist(destination, e));
    }

    log::debug!("Persisted normalized document to {}", destination.display());
    Ok(())
}

/// Read a previously persisted document back as a fresh value.
pub fn load_document(path: &Path) -> Result<CourseDocument> {
    let contents = read_file(path)?;
    Ok(serde_json::from_str(&contents)?)
}
