//! Second-pass analytics over a finished course document.
//!
//! Everything here reads the normalized [`CourseDocument`] only; the source
//! export is never consulted. Percentages are rounded to one decimal and
//! every ratio with an empty denominator is reported as 0.

pub mod coverage;
pub mod sequencing;
pub mod workload;

use crate::document::{Activity, CourseDocument};
use serde::{Deserialize, Serialize};

pub use coverage::{
    competency_coverage, competency_mapping, CompetencyCoverage, CompetencyMapping, MappedActivity,
    UnmappedActivity, WeekCoverage,
};
pub use sequencing::{sequencing_analysis, PatternFrequency, PatternInconsistency, SequencingAnalysis};
pub use workload::{workload_analysis, WeeklyWorkload, WorkloadAnalysis};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseAnalytics {
    pub overview: Overview,
    pub workload_analysis: WorkloadAnalysis,
    pub sequencing: SequencingAnalysis,
    pub competency_mapping: CompetencyMapping,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_activities: usize,
    pub total_points: f64,
    /// Mean points over graded activities only.
    pub average_points_per_activity: f64,
    pub type_distribution: Vec<TypeShare>,
    pub graded_vs_non_graded: GradedSplit,
    pub competency_coverage: Vec<CompetencyCoverage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeShare {
    #[serde(rename = "type")]
    pub activity_type: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedSplit {
    pub graded: usize,
    pub non_graded: usize,
    /// Points summed over graded activities.
    pub total_points: f64,
}

/// Round to one decimal place.
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `part / whole` as a percentage with one decimal; 0 when `whole` is 0.
pub(crate) fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round1(part as f64 / whole as f64 * 100.0)
    }
}

pub(crate) fn ratio(numerator: f64, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator / denominator as f64
    }
}

/// Count items by key, keeping keys in first-seen order.
pub(crate) fn count_in_order<'a, I>(keys: I) -> Vec<(&'a str, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for key in keys {
        match counts.iter_mut().find(|(seen, _)| *seen == key) {
            Some((_, count)) => *count += 1,
            None => counts.push((key, 1)),
        }
    }
    counts
}

pub fn type_distribution(activities: &[&Activity]) -> Vec<TypeShare> {
    count_in_order(activities.iter().map(|a| a.activity_type.as_str()))
        .into_iter()
        .map(|(activity_type, count)| TypeShare {
            activity_type: activity_type.to_string(),
            count,
            percentage: percentage(count, activities.len()),
        })
        .collect()
}

/// Graded means `gradePoints > 0`.
pub fn graded_split(activities: &[&Activity]) -> GradedSplit {
    activities
        .iter()
        .fold(GradedSplit::default(), |mut split, activity| {
            if activity.grade_points > 0.0 {
                split.graded += 1;
                split.total_points += activity.grade_points;
            } else {
                split.non_graded += 1;
            }
            split
        })
}

pub fn generate_analytics(document: &CourseDocument) -> CourseAnalytics {
    let activities: Vec<&Activity> = document.activities().collect();
    let graded = graded_split(&activities);

    let overview = Overview {
        total_activities: activities.len(),
        total_points: document.course.total_points,
        average_points_per_activity: ratio(graded.total_points, graded.graded),
        type_distribution: type_distribution(&activities),
        graded_vs_non_graded: graded,
        competency_coverage: competency_coverage(document),
    };

    CourseAnalytics {
        overview,
        workload_analysis: workload_analysis(document),
        sequencing: sequencing_analysis(document),
        competency_mapping: competency_mapping(document),
    }
}
