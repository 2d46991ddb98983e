//! Normalizer for course-authoring exports.
//!
//! A source export is a flat set of record arrays (units, activities,
//! competencies, rubric criteria, resources) linked by numeric or string ids.
//! [`transform`] resolves those links and assembles a self-contained
//! [`document::CourseDocument`] organized by week, validates it, and persists
//! it. [`analytics`] derives workload, sequencing and competency-coverage
//! views from a normalized document.
//!
//! ```rust
//! use coursemap::transform::transform_value;
//! use serde_json::json;
//!
//! let source = json!({
//!     "course": {"id": 1, "name": "Intro to Accounting"},
//!     "units": [{"unit": {"title": "Week 1: Basics"}, "activityIds": [10]}],
//!     "activities": [{"activity": {"id": 10, "activityType": "STUDY"}}],
//!     "competencies": []
//! });
//! let (document, _advisories) = transform_value(source, None).unwrap();
//! assert_eq!(document.weeks[0].week_number, 1);
//! assert_eq!(document.activity_counts.total, 1);
//! ```

pub mod analytics;
pub mod batch;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod document;
pub mod error;
pub mod io;
pub mod normalize;
pub mod policy;
pub mod progress;
pub mod resolver;
pub mod source;
pub mod transform;
pub mod validate;

pub use crate::analytics::{generate_analytics, CourseAnalytics};
pub use crate::document::CourseDocument;
pub use crate::error::{CourseMapError, ErrorCode, Result};
pub use crate::transform::{transform_source, transform_value, CourseTransformer, TransformOptions};
pub use crate::validate::{Advisory, AdvisoryKind};
