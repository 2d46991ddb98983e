//! Competency coverage across weeks and activities.

use super::percentage;
use crate::document::CourseDocument;
use crate::source::RecordId;
use crate::transform::distinct;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetencyCoverage {
    pub competency_id: Option<RecordId>,
    pub competency_text: Option<String>,
    pub total_activities: usize,
    pub total_points: f64,
    /// Distinct week numbers in activity order; 0 marks an unplaced activity.
    pub weeks_covered: Vec<u32>,
    pub activity_types: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekCoverage {
    pub week_number: u32,
    pub competencies_covered: Vec<RecordId>,
    pub coverage_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedActivity {
    pub activity_id: RecordId,
    pub code: Option<String>,
    pub competencies: Vec<RecordId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmappedActivity {
    pub activity_id: RecordId,
    pub code: Option<String>,
    #[serde(rename = "type")]
    pub activity_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetencyMapping {
    pub coverage_by_week: Vec<WeekCoverage>,
    pub multiple_competency_activities: Vec<MappedActivity>,
    pub unmapped_activities: Vec<UnmappedActivity>,
}

pub fn competency_coverage(document: &CourseDocument) -> Vec<CompetencyCoverage> {
    document
        .competencies
        .iter()
        .map(|competency| {
            let mut activity_types = BTreeMap::new();
            for activity in &competency.activities {
                *activity_types
                    .entry(activity.activity_type.clone())
                    .or_insert(0) += 1;
            }
            CompetencyCoverage {
                competency_id: competency.id.clone(),
                competency_text: competency.text.clone(),
                total_activities: competency.activities.len(),
                total_points: competency.total_points,
                weeks_covered: distinct(competency.activities.iter().map(|a| a.week_number)),
                activity_types,
            }
        })
        .collect()
}

pub fn competency_mapping(document: &CourseDocument) -> CompetencyMapping {
    let mut mapping = CompetencyMapping::default();
    let total_competencies = document.competencies.len();

    for week in &document.weeks {
        let covered = distinct(
            week.activities
                .iter()
                .flat_map(|activity| activity.competencies.iter().cloned()),
        );
        mapping.coverage_by_week.push(WeekCoverage {
            week_number: week.week_number,
            coverage_percentage: percentage(covered.len(), total_competencies),
            competencies_covered: covered,
        });
    }

    for activity in document.activities() {
        match activity.competencies.len() {
            0 => mapping.unmapped_activities.push(UnmappedActivity {
                activity_id: activity.id.clone(),
                code: activity.code.clone(),
                activity_type: activity.activity_type.clone(),
            }),
            1 => {}
            _ => mapping.multiple_competency_activities.push(MappedActivity {
                activity_id: activity.id.clone(),
                code: activity.code.clone(),
                competencies: activity.competencies.clone(),
            }),
        }
    }

    mapping
}
