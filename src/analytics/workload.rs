//! Per-week workload ranking.

use super::{count_in_order, ratio};
use crate::document::{CourseDocument, Week};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyWorkload {
    pub week_number: u32,
    pub total_activities: usize,
    pub total_points: f64,
    pub type_breakdown: BTreeMap<String, usize>,
    pub average_points_per_activity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadAnalysis {
    /// Sorted by total points, heaviest first. Ties keep week order.
    pub weekly_workload: Vec<WeeklyWorkload>,
    pub heaviest_week: Option<WeeklyWorkload>,
    pub lightest_week: Option<WeeklyWorkload>,
    pub average_activities_per_week: f64,
}

pub fn weekly_workload(week: &Week) -> WeeklyWorkload {
    let total_points: f64 = week.activities.iter().map(|a| a.grade_points).sum();
    WeeklyWorkload {
        week_number: week.week_number,
        total_activities: week.activities.len(),
        total_points,
        type_breakdown: count_in_order(week.activities.iter().map(|a| a.activity_type.as_str()))
            .into_iter()
            .map(|(kind, count)| (kind.to_string(), count))
            .collect(),
        average_points_per_activity: ratio(total_points, week.activities.len()),
    }
}

pub fn workload_analysis(document: &CourseDocument) -> WorkloadAnalysis {
    let mut weekly: Vec<WeeklyWorkload> = document.weeks.iter().map(weekly_workload).collect();
    // `sort_by` is stable, so equal totals stay in week order.
    weekly.sort_by(|a, b| b.total_points.total_cmp(&a.total_points));

    let total_activities: usize = weekly.iter().map(|w| w.total_activities).sum();
    WorkloadAnalysis {
        heaviest_week: weekly.first().cloned(),
        lightest_week: weekly.last().cloned(),
        average_activities_per_week: ratio(total_activities as f64, weekly.len()),
        weekly_workload: weekly,
    }
}
