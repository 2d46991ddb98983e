//! Letter-grade scale extraction from course-overview prose.
//!
//! This is a best-effort heuristic: overview text is free-form and the scale
//! is only recognized when four percentages appear in the order A, B, C, F
//! (for example "A = 90% ... B = 80% ... C = 70% ... F = 69%"). Anything
//! else falls back to the standard scale. A failed match is never an error.

use crate::document::GradingScheme;
use once_cell::sync::Lazy;
use regex::Regex;

static SCALE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)A\s*=\s*(\d+)%.*?B\s*=\s*(\d+)%.*?C\s*=\s*(\d+)%.*?F\s*=\s*(\d+)%")
        .expect("valid grading scale pattern")
});

/// Parse the A/B/C/F cutoffs out of `text`, if present.
pub fn extract_grading_scheme(text: &str) -> Option<GradingScheme> {
    let caps = SCALE.captures(text)?;
    let cutoff = |i: usize| caps.get(i)?.as_str().parse::<u32>().ok();
    Some(GradingScheme::from_cutoffs(
        cutoff(1)?,
        cutoff(2)?,
        cutoff(3)?,
        cutoff(4)?,
    ))
}

/// Extracted scale, or the standard 90/80/70/69 scale.
pub fn grading_scheme_or_default(text: Option<&str>) -> GradingScheme {
    text.and_then(extract_grading_scheme).unwrap_or_default()
}
