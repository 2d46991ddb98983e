//! Source document -> normalized course document.
//!
//! One [`CourseTransformer`] is built per source document and owns every
//! piece of per-job state (activity counters, week placement), so
//! independent documents can be transformed on separate threads without
//! sharing anything.
//!
//! The pipeline is: shape check, assembly, validation, policy checks and,
//! only when all of those succeed, persistence. A failed job never leaves a
//! partial document at the destination.

pub mod competencies;
pub mod course;
pub mod grading;
pub mod resources;
pub mod weeks;

use crate::document::CourseDocument;
use crate::error::Result;
use crate::io::persist_document;
use crate::policy::ActivityPolicy;
use crate::resolver::Resolver;
use crate::source::SourceDocument;
use crate::validate::{validate_document, Advisory};
use serde_json::Value;
use std::collections::HashSet;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use tracing::{debug, info, info_span, warn};

pub use competencies::map_competencies;
pub use course::{assemble_course, assemble_metadata, assemble_overview, calculate_total_points};
pub use grading::{extract_grading_scheme, grading_scheme_or_default};
pub use resources::aggregate_resources;
pub use weeks::{ActivityTally, WeekPlacement, WeekTransformer};

/// Keep the first occurrence of each item, preserving order.
pub(crate) fn distinct<T, I>(items: I) -> Vec<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

pub struct CourseTransformer<'a> {
    resolver: Resolver<'a>,
}

impl<'a> CourseTransformer<'a> {
    pub fn new(source: &'a SourceDocument) -> Self {
        Self {
            resolver: Resolver::new(source),
        }
    }

    /// Assemble the full document. Never fails: resolution gaps degrade to
    /// absent or empty values. Count reconciliation is reported as an
    /// advisory.
    pub fn build(&self) -> (CourseDocument, Vec<Advisory>) {
        let source = self.resolver.source();

        let assembly = WeekTransformer::new(&self.resolver).run();
        let (activity_counts, advisories) = assembly.tally.finalize(&assembly.weeks);
        debug!(
            weeks = assembly.weeks.len(),
            activities = activity_counts.total,
            "Assembled weeks"
        );

        let grading_scheme = grading_scheme_or_default(
            source
                .course_overview
                .as_ref()
                .and_then(|overview| overview.text.as_deref()),
        );

        let document = CourseDocument {
            course: assemble_course(source),
            metadata: assemble_metadata(source),
            competencies: map_competencies(&self.resolver, &assembly.placement),
            course_overview: assemble_overview(source),
            resources: aggregate_resources(&self.resolver, &assembly.placement),
            grading_scheme,
            activity_counts,
            activity_sequencing: assembly.sequencing,
            weeks: assembly.weeks,
        };

        (document, advisories)
    }

    /// Assemble and validate.
    pub fn transform(&self) -> Result<(CourseDocument, Vec<Advisory>)> {
        let (document, mut advisories) = self.build();
        advisories.extend(validate_document(&document)?);
        Ok((document, advisories))
    }
}

#[derive(Debug, Clone)]
pub struct TransformOptions {
    /// Extra activity rules; `None` disables them.
    pub policy: Option<ActivityPolicy>,
    pub pretty: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            policy: None,
            pretty: true,
        }
    }
}

#[derive(Debug)]
pub struct TransformOutcome {
    pub document: CourseDocument,
    pub advisories: Vec<Advisory>,
    pub output_path: PathBuf,
}

/// Transform a parsed source value without persisting it.
pub fn transform_value(value: Value, policy: Option<&ActivityPolicy>) -> Result<(CourseDocument, Vec<Advisory>)> {
    let source = SourceDocument::from_value(value)?;
    let (document, mut advisories) = CourseTransformer::new(&source).transform()?;
    if let Some(policy) = policy {
        advisories.extend(policy.advisories(&document));
    }
    Ok((document, advisories))
}

/// Transform a parsed source value and persist the result at `destination`.
pub fn transform_source(
    value: Value,
    destination: &Path,
    options: &TransformOptions,
) -> Result<TransformOutcome> {
    let span = info_span!("transform", destination = %destination.display());
    let _enter = span.enter();

    let (document, advisories) = transform_value(value, options.policy.as_ref())?;
    for advisory in &advisories {
        warn!(kind = ?advisory.kind, "{}", advisory.message);
    }

    persist_document(&document, destination, options.pretty)?;
    info!(
        weeks = document.weeks.len(),
        activities = document.activity_counts.total,
        advisories = advisories.len(),
        "Transformation completed"
    );

    Ok(TransformOutcome {
        document,
        advisories,
        output_path: destination.to_path_buf(),
    })
}
