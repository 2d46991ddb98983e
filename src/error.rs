//! Error type for coursemap operations.
//!
//! Errors fall into a small number of categories, each with a stable
//! [`ErrorCode`] for programmatic handling:
//!
//! - E001-E009: I/O and filesystem errors
//! - E010-E019: Source document errors (shape, JSON syntax)
//! - E020-E029: Configuration errors
//! - E030-E039: Structural invariant violations in the normalized output
//! - E040-E049: Persistence errors
//! - E050-E059: Input rejected before transformation (batch pre-flight)
//!
//! Missing cross-references inside a well-shaped source are not errors at
//! all: the resolver reports them as absence and the transformer degrades to
//! empty values. Only the categories above abort a document.
//!
//! # Example
//!
//! ```rust
//! use coursemap::error::{CourseMapError, ErrorCode};
//!
//! let err = CourseMapError::source_shape("Source data missing required keys: units");
//! assert_eq!(err.code(), ErrorCode::SOURCE_SHAPE);
//! assert!(err.is_user_fixable());
//! ```

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Structured error code for documentation and programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ErrorCode(&'static str);

impl ErrorCode {
    /// I/O error - generic
    pub const IO_GENERIC: ErrorCode = ErrorCode("E001");
    /// I/O error - file not found
    pub const IO_FILE_NOT_FOUND: ErrorCode = ErrorCode("E002");

    /// Source document is missing required sections or records
    pub const SOURCE_SHAPE: ErrorCode = ErrorCode("E010");
    /// Source document is not valid JSON
    pub const SOURCE_JSON: ErrorCode = ErrorCode("E011");

    /// Config error - invalid value or unparseable file
    pub const CONFIG_INVALID: ErrorCode = ErrorCode("E020");

    /// Normalized output violates a structural invariant
    pub const STRUCTURAL_INVARIANT: ErrorCode = ErrorCode("E030");

    /// Failed to write the normalized document
    pub const PERSIST: ErrorCode = ErrorCode("E040");

    /// Input rejected before transformation
    pub const INPUT_REJECTED: ErrorCode = ErrorCode("E050");

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unified error type for coursemap operations.
#[derive(Debug, Error)]
pub enum CourseMapError {
    /// The source document lacks a required section, or an activity entry
    /// lacks its nested id. Raised before any transformation work starts.
    #[error("{message}")]
    SourceShape { message: String },

    /// The assembled document violates one or more structural invariants.
    #[error("{}", .violations.join("; "))]
    StructuralInvariant { violations: Vec<String> },

    /// Writing the normalized document failed.
    #[error("failed to persist normalized document to {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading or listing a file failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input is not valid JSON (or a persisted document no longer
    /// matches the output schema).
    #[error("Invalid JSON format: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration could not be loaded or contains an invalid value.
    #[error("configuration error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
    },

    /// Input rejected before transformation (too large, wrong kind of file).
    #[error("{}: {message}", .path.display())]
    Input { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, CourseMapError>;

impl CourseMapError {
    #[must_use]
    pub fn source_shape(message: impl Into<String>) -> Self {
        Self::SourceShape {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn structural(violations: Vec<String>) -> Self {
        Self::StructuralInvariant { violations }
    }

    #[must_use]
    pub fn persist(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persist {
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn config(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::Config {
            message: message.into(),
            path,
        }
    }

    #[must_use]
    pub fn input(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Input {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::SourceShape { .. } => ErrorCode::SOURCE_SHAPE,
            Self::StructuralInvariant { .. } => ErrorCode::STRUCTURAL_INVARIANT,
            Self::Persist { .. } => ErrorCode::PERSIST,
            Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                ErrorCode::IO_FILE_NOT_FOUND
            }
            Self::Io { .. } => ErrorCode::IO_GENERIC,
            Self::Json(_) => ErrorCode::SOURCE_JSON,
            Self::Config { .. } => ErrorCode::CONFIG_INVALID,
            Self::Input { .. } => ErrorCode::INPUT_REJECTED,
        }
    }

    /// Whether the person supplying the input can fix this by editing it.
    #[must_use]
    pub fn is_user_fixable(&self) -> bool {
        matches!(
            self,
            Self::SourceShape { .. } | Self::Json(_) | Self::Config { .. } | Self::Input { .. }
        )
    }

    /// Individual violation messages for structural errors, otherwise the
    /// single rendered message.
    #[must_use]
    pub fn details(&self) -> Vec<String> {
        match self {
            Self::StructuralInvariant { violations } => violations.clone(),
            other => vec![other.to_string()],
        }
    }
}
