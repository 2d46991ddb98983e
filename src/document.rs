//! The normalized course document.
//!
//! Built once per source document by [`crate::transform::CourseTransformer`],
//! validated, persisted as JSON, and never mutated afterwards. Anything that
//! reads it back later (catalog, analytics) deserializes a fresh value from
//! storage.

use crate::source::RecordId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Top-level sections every normalized document must carry.
pub const REQUIRED_SECTIONS: [&str; 7] = [
    "course",
    "metadata",
    "competencies",
    "weeks",
    "resources",
    "activityCounts",
    "activitySequencing",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDocument {
    pub course: CourseSummary,
    pub metadata: Metadata,
    pub competencies: Vec<CompetencyView>,
    pub course_overview: CourseOverview,
    pub weeks: Vec<Week>,
    pub resources: BTreeMap<ResourceKind, ResourceGroup>,
    pub grading_scheme: GradingScheme,
    pub activity_counts: ActivityCounts,
    pub activity_sequencing: ActivitySequencing,
}

impl CourseDocument {
    /// All placed activities in week order.
    pub fn activities(&self) -> impl Iterator<Item = &Activity> {
        self.weeks.iter().flat_map(|week| week.activities.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub id: Option<RecordId>,
    pub number: Option<String>,
    pub name: Option<String>,
    pub credits: Option<Value>,
    pub version: Option<Value>,
    #[serde(rename = "type")]
    pub course_type: Option<Value>,
    pub total_points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub last_updated: Option<String>,
    pub version: Option<Value>,
    pub status: Option<String>,
    pub effective_date: Option<Value>,
    pub course_design_model: Option<String>,
    pub total_weeks: usize,
    pub created_by: Option<Value>,
    pub updated_by: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseOverview {
    pub id: Option<RecordId>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetencyView {
    pub id: Option<RecordId>,
    pub text: Option<String>,
    pub total_points: f64,
    pub activities: Vec<CompetencyActivity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetencyActivity {
    pub id: RecordId,
    pub code: Option<String>,
    pub title: String,
    #[serde(rename = "type")]
    pub activity_type: String,
    pub weight: f64,
    pub points: f64,
    /// Week the activity was placed in; 0 when no unit references it.
    pub week_number: u32,
    pub week_sequence: Option<u32>,
    pub criteria: Vec<CriterionRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionRef {
    pub id: Option<RecordId>,
    pub text: Option<String>,
    pub weight: f64,
    pub points: f64,
    pub competency_id: Option<RecordId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Week {
    pub week_number: u32,
    pub id: Option<RecordId>,
    pub title: Option<String>,
    pub introduction: Option<Introduction>,
    pub duration: Option<Value>,
    pub activities: Vec<Activity>,
    pub resources: Vec<ResourceRef>,
    pub activity_count: WeekActivityCount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Introduction {
    pub id: Option<RecordId>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekActivityCount {
    pub total: u32,
    /// Lowercased activity type to count, only for types present this week.
    pub by_type: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub sequence_number: u32,
    pub id: RecordId,
    pub code: Option<String>,
    pub title: Option<String>,
    pub activity_type: String,
    pub grade_type: Option<Value>,
    pub grade_weight: f64,
    pub grade_points: f64,
    pub week_number: u32,
    pub text: String,
    pub scoring_guide: Option<ScoringGuide>,
    pub resources: Vec<ResourceRef>,
    pub competencies: Vec<RecordId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringGuide {
    pub criteria: Vec<ScoredCriterion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCriterion {
    pub id: Option<RecordId>,
    pub text: Option<String>,
    pub grade_weight: f64,
    pub grade_points: f64,
    pub competency_id: Option<RecordId>,
    pub performance_levels: Vec<PerformanceLevel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceLevel {
    #[serde(rename = "type")]
    pub level_type: Option<String>,
    pub points: f64,
    pub text: Option<String>,
}

/// A resource reference attached to a week or an activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub id: Option<RecordId>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
}

/// Fixed resource taxonomy. Variant order is the key order of the
/// document's `resources` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceKind {
    ReadingList,
    ExternalLink,
    Multimedia,
    Media,
    Tutorial,
    Template,
    Document,
    Simulation,
    Assessment,
    Rubric,
    Other,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadingList => "READING_LIST",
            Self::ExternalLink => "EXTERNAL_LINK",
            Self::Multimedia => "MULTIMEDIA",
            Self::Media => "MEDIA",
            Self::Tutorial => "TUTORIAL",
            Self::Template => "TEMPLATE",
            Self::Document => "DOCUMENT",
            Self::Simulation => "SIMULATION",
            Self::Assessment => "ASSESSMENT",
            Self::Rubric => "RUBRIC",
            Self::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroup {
    pub resources: Vec<ClassifiedResource>,
    pub count: usize,
    pub total_usage: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedResource {
    pub id: Option<RecordId>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub links: Vec<String>,
    pub description: String,
    pub media_type: String,
    pub usage_type: String,
    pub usage: ResourceUsage,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceUsage {
    pub weeks: Vec<u32>,
    pub activities: Vec<ActivityUsage>,
    pub total_references: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityUsage {
    pub id: RecordId,
    #[serde(rename = "type")]
    pub activity_type: Option<String>,
    pub week: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GradeBound {
    Min { min: u32 },
    Max { max: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradingScheme {
    #[serde(rename = "A")]
    pub a: GradeBound,
    #[serde(rename = "B")]
    pub b: GradeBound,
    #[serde(rename = "C")]
    pub c: GradeBound,
    #[serde(rename = "F")]
    pub f: GradeBound,
}

impl GradingScheme {
    pub fn from_cutoffs(a: u32, b: u32, c: u32, f: u32) -> Self {
        Self {
            a: GradeBound::Min { min: a },
            b: GradeBound::Min { min: b },
            c: GradeBound::Min { min: c },
            f: GradeBound::Max { max: f },
        }
    }
}

impl Default for GradingScheme {
    fn default() -> Self {
        Self::from_cutoffs(90, 80, 70, 69)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityCounts {
    pub total: u32,
    pub by_type: TypeCounts,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCounts {
    pub discussion: u32,
    pub assignment: u32,
    pub study: u32,
    pub other: u32,
}

impl TypeCounts {
    pub fn sum(&self) -> u32 {
        self.discussion + self.assignment + self.study + self.other
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySequencing {
    pub by_week: BTreeMap<u32, WeekSequence>,
    pub by_type: TypeSequences,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeekSequence {
    pub studies: Vec<SequenceRef>,
    pub discussions: Vec<SequenceRef>,
    pub assignments: Vec<SequenceRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceRef {
    pub id: RecordId,
    pub sequence: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct TypeSequences {
    pub discussion: Vec<TypedSequenceRef>,
    pub study: Vec<TypedSequenceRef>,
    pub assignment: Vec<TypedSequenceRef>,
    pub other: Vec<TypedSequenceRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedSequenceRef {
    pub id: RecordId,
    pub week_number: u32,
    pub sequence: u32,
}
