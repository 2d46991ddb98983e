//! Typed model of a course-authoring export.
//!
//! The export is a graph of flat collections cross-referenced by id. The
//! model is lenient: every cross-reference is optional, absent or malformed
//! collections deserialize as empty, malformed ids are dropped from id
//! lists, and scalars of the wrong type read as missing. The only hard
//! requirements are checked up front by [`check_shape`].

use crate::error::{CourseMapError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Sections that must be present (and non-null) in every source document.
pub const REQUIRED_SOURCE_KEYS: [&str; 4] = ["course", "units", "activities", "competencies"];

/// Identifier of a source record. Exports mix numeric and string ids; the
/// two are never considered equal to each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Num(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self::Num(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Deserialize a field, degrading any value of the wrong shape (an
/// explicit `null` included) to the field's default.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Keep the elements of a list that match `T` and drop the rest. Anything
/// other than an array yields an empty list.
fn lenient_list<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceDocument {
    #[serde(default, deserialize_with = "lenient")]
    pub course: CourseRecord,
    #[serde(default, deserialize_with = "lenient_list")]
    pub units: Vec<UnitEntry>,
    #[serde(default)]
    pub activities: Vec<ActivityEntry>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub activity_text: Vec<TextRecord>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub introductions: Vec<TextRecord>,
    #[serde(default, deserialize_with = "lenient")]
    pub course_overview: Option<TextRecord>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub competencies: Vec<CompetencyRecord>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub criteria: Vec<CriterionRow>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub performance_levels: Vec<PerformanceLevelRow>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub resources: Vec<ResourceEntry>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub resources_references: Vec<ResourceReferenceRow>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CourseRecord {
    #[serde(deserialize_with = "lenient")]
    pub id: Option<RecordId>,
    #[serde(deserialize_with = "lenient")]
    pub number: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
    pub credits: Option<Value>,
    pub version: Option<Value>,
    #[serde(deserialize_with = "lenient")]
    pub status: Option<String>,
    pub instance_of: Option<Value>,
    pub updated_date: Option<Value>,
    pub launch_date: Option<Value>,
    #[serde(deserialize_with = "lenient")]
    pub course_design_model_type: Option<String>,
    pub created_by: Option<Value>,
    pub updated_by: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UnitEntry {
    #[serde(deserialize_with = "lenient")]
    pub unit: UnitRecord,
    #[serde(deserialize_with = "lenient_list")]
    pub activity_ids: Vec<RecordId>,
    #[serde(deserialize_with = "lenient")]
    pub introduction_id: Option<RecordId>,
    #[serde(deserialize_with = "lenient_list")]
    pub course_resource_reference_ids: Vec<RecordId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UnitRecord {
    #[serde(deserialize_with = "lenient")]
    pub id: Option<RecordId>,
    #[serde(deserialize_with = "lenient")]
    pub title: Option<String>,
    pub duration: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub activity: ActivityRecord,
    /// Some exports carry the text reference on the wrapper rather than on
    /// the activity record itself.
    #[serde(default, deserialize_with = "lenient")]
    pub activity_text_id: Option<RecordId>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub course_resource_reference_ids: Vec<RecordId>,
}

impl ActivityEntry {
    pub fn text_id(&self) -> Option<&RecordId> {
        self.activity
            .activity_text_id
            .as_ref()
            .or(self.activity_text_id.as_ref())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    pub id: RecordId,
    #[serde(default, deserialize_with = "lenient")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub activity_type: Option<String>,
    #[serde(default)]
    pub grade_type: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub grade_weight: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub grade_points: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub scoring_guide_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub activity_text_id: Option<RecordId>,
}

impl Default for ActivityRecord {
    fn default() -> Self {
        Self {
            id: RecordId::Num(0),
            code: None,
            title: None,
            activity_type: None,
            grade_type: None,
            grade_weight: None,
            grade_points: None,
            scoring_guide_type: None,
            activity_text_id: None,
        }
    }
}

impl ActivityRecord {
    pub fn points(&self) -> f64 {
        self.grade_points.unwrap_or(0.0)
    }

    pub fn weight(&self) -> f64 {
        self.grade_weight.unwrap_or(0.0)
    }

    pub fn type_name(&self) -> &str {
        self.activity_type.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TextRecord {
    #[serde(deserialize_with = "lenient")]
    pub id: Option<RecordId>,
    #[serde(deserialize_with = "lenient")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CompetencyRecord {
    #[serde(deserialize_with = "lenient")]
    pub id: Option<RecordId>,
    #[serde(deserialize_with = "lenient")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CriterionRow {
    #[serde(deserialize_with = "lenient")]
    pub activity_id: Option<RecordId>,
    #[serde(deserialize_with = "lenient")]
    pub competency_id: Option<RecordId>,
    #[serde(deserialize_with = "lenient")]
    pub criterion: Option<CriterionRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CriterionRecord {
    #[serde(deserialize_with = "lenient")]
    pub id: Option<RecordId>,
    #[serde(deserialize_with = "lenient")]
    pub text: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub grade_weight: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub grade_points: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PerformanceLevelRow {
    #[serde(deserialize_with = "lenient")]
    pub criterion_id: Option<RecordId>,
    #[serde(deserialize_with = "lenient")]
    pub performance_level: Option<PerformanceLevelRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PerformanceLevelRecord {
    #[serde(deserialize_with = "lenient")]
    pub performance_level_type: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub grade_points: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResourceEntry {
    #[serde(deserialize_with = "lenient")]
    pub resource: ResourceRecord,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceRecord {
    #[serde(deserialize_with = "lenient")]
    pub id: Option<RecordId>,
    #[serde(deserialize_with = "lenient")]
    pub resource_name: Option<String>,
    /// A single link string or a list of them.
    pub persistent_links: Option<Value>,
    #[serde(deserialize_with = "lenient")]
    pub annotation: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub media_type: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub file_type: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub usage_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceReferenceRow {
    #[serde(deserialize_with = "lenient")]
    pub course_resource_reference: Option<ResourceReferenceRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceReferenceRecord {
    #[serde(deserialize_with = "lenient")]
    pub id: Option<RecordId>,
    #[serde(deserialize_with = "lenient")]
    pub resource_name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub media_type: Option<String>,
}

impl SourceDocument {
    /// Check the raw shape and convert it into the typed model.
    pub fn from_value(value: Value) -> Result<Self> {
        check_shape(&value)?;
        serde_json::from_value(value).map_err(|e| {
            CourseMapError::source_shape(format!("Source data does not match the export format: {e}"))
        })
    }

    pub fn from_json_str(contents: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(contents)?;
        Self::from_value(value)
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        _ => false,
    }
}

/// Verify the minimal structure a source document needs before any
/// transformation work begins.
pub fn check_shape(value: &Value) -> Result<()> {
    let missing: Vec<&str> = REQUIRED_SOURCE_KEYS
        .iter()
        .copied()
        .filter(|key| is_blank(value.get(key)))
        .collect();
    if !missing.is_empty() {
        return Err(CourseMapError::source_shape(format!(
            "Source data missing required keys: {}",
            missing.join(", ")
        )));
    }

    let activities = value
        .get("activities")
        .and_then(Value::as_array)
        .ok_or_else(|| CourseMapError::source_shape("Source data activities must be an array"))?;

    for (index, entry) in activities.iter().enumerate() {
        let id = entry.get("activity").and_then(|activity| activity.get("id"));
        if is_blank(id) {
            return Err(CourseMapError::source_shape(format!(
                "Invalid activity object at index {index}"
            )));
        }
    }

    Ok(())
}
