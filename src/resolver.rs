//! Lookup and join operations over a source document.
//!
//! The export stores its relations as flat join tables (criteria rows,
//! performance-level rows, resource references). [`Resolver::new`] indexes
//! every collection once so each join afterwards is a hash lookup. All
//! operations are pure queries: a miss is reported as `None` or an empty
//! list and never as an error.
//!
//! When an id appears more than once in a collection the first record wins,
//! matching a front-to-back scan of the source.

use crate::document::{CriterionRef, PerformanceLevel};
use crate::normalize::clean_text;
use crate::source::{
    ActivityEntry, CriterionRow, RecordId, ResourceReferenceRecord, SourceDocument, TextRecord,
};
use std::collections::HashMap;

pub struct Resolver<'a> {
    source: &'a SourceDocument,
    activities: HashMap<&'a RecordId, &'a ActivityEntry>,
    activity_text: HashMap<&'a RecordId, &'a TextRecord>,
    introductions: HashMap<&'a RecordId, &'a TextRecord>,
    unit_of_activity: HashMap<&'a RecordId, usize>,
    criteria_by_activity: HashMap<&'a RecordId, Vec<&'a CriterionRow>>,
    criteria_by_competency: HashMap<&'a RecordId, Vec<&'a CriterionRow>>,
    levels_by_criterion: HashMap<&'a RecordId, Vec<PerformanceLevel>>,
    references: HashMap<&'a RecordId, &'a ResourceReferenceRecord>,
}

fn first_wins<'a, T>(map: &mut HashMap<&'a RecordId, T>, key: &'a RecordId, value: T) {
    map.entry(key).or_insert(value);
}

impl<'a> Resolver<'a> {
    pub fn new(source: &'a SourceDocument) -> Self {
        let mut activities = HashMap::with_capacity(source.activities.len());
        for entry in &source.activities {
            first_wins(&mut activities, &entry.activity.id, entry);
        }

        let mut activity_text = HashMap::new();
        for text in &source.activity_text {
            if let Some(id) = &text.id {
                first_wins(&mut activity_text, id, text);
            }
        }

        let mut introductions = HashMap::new();
        for intro in &source.introductions {
            if let Some(id) = &intro.id {
                first_wins(&mut introductions, id, intro);
            }
        }

        let mut unit_of_activity = HashMap::new();
        for (position, unit) in source.units.iter().enumerate() {
            for activity_id in &unit.activity_ids {
                first_wins(&mut unit_of_activity, activity_id, position + 1);
            }
        }

        let mut criteria_by_activity: HashMap<&RecordId, Vec<&CriterionRow>> = HashMap::new();
        let mut criteria_by_competency: HashMap<&RecordId, Vec<&CriterionRow>> = HashMap::new();
        for row in &source.criteria {
            if let Some(activity_id) = &row.activity_id {
                criteria_by_activity.entry(activity_id).or_default().push(row);
            }
            if let Some(competency_id) = &row.competency_id {
                criteria_by_competency
                    .entry(competency_id)
                    .or_default()
                    .push(row);
            }
        }

        let mut levels_by_criterion: HashMap<&RecordId, Vec<PerformanceLevel>> = HashMap::new();
        for row in &source.performance_levels {
            let (Some(criterion_id), Some(level)) = (&row.criterion_id, &row.performance_level)
            else {
                continue;
            };
            levels_by_criterion
                .entry(criterion_id)
                .or_default()
                .push(PerformanceLevel {
                    level_type: level.performance_level_type.clone(),
                    points: level.grade_points.unwrap_or(0.0),
                    text: level.text.clone(),
                });
        }

        let mut references = HashMap::new();
        for row in &source.resources_references {
            if let Some(reference) = &row.course_resource_reference {
                if let Some(id) = &reference.id {
                    first_wins(&mut references, id, reference);
                }
            }
        }

        Self {
            source,
            activities,
            activity_text,
            introductions,
            unit_of_activity,
            criteria_by_activity,
            criteria_by_competency,
            levels_by_criterion,
            references,
        }
    }

    pub fn source(&self) -> &'a SourceDocument {
        self.source
    }

    pub fn find_activity(&self, activity_id: &RecordId) -> Option<&'a ActivityEntry> {
        self.activities.get(activity_id).copied()
    }

    /// Cleaned activity text, or an empty string when the id misses.
    pub fn find_activity_text(&self, text_id: &RecordId) -> String {
        self.activity_text
            .get(text_id)
            .map(|record| clean_text(record.text.as_deref()))
            .unwrap_or_default()
    }

    pub fn find_introduction(&self, intro_id: &RecordId) -> Option<&'a TextRecord> {
        self.introductions.get(intro_id).copied()
    }

    /// 1-based position (in source order) of the first unit listing the
    /// activity.
    pub fn find_week_for_activity(&self, activity_id: &RecordId) -> Option<usize> {
        self.unit_of_activity.get(activity_id).copied()
    }

    /// Criteria linking one activity to one competency. Rows without an
    /// embedded criterion are skipped.
    pub fn find_criteria_for_activity(
        &self,
        activity_id: &RecordId,
        competency_id: &RecordId,
    ) -> Vec<CriterionRef> {
        self.criteria_rows_for_activity(activity_id)
            .filter(|row| row.competency_id.as_ref() == Some(competency_id))
            .filter_map(|row| {
                row.criterion.as_ref().map(|criterion| CriterionRef {
                    id: criterion.id.clone(),
                    text: criterion.text.clone(),
                    weight: criterion.grade_weight.unwrap_or(0.0),
                    points: criterion.grade_points.unwrap_or(0.0),
                    competency_id: row.competency_id.clone(),
                })
            })
            .collect()
    }

    /// Activity ids linked to a competency, in row order. May repeat.
    pub fn find_activities_for_competency(&self, competency_id: &RecordId) -> Vec<&'a RecordId> {
        self.criteria_by_competency
            .get(competency_id)
            .into_iter()
            .flatten()
            .copied()
            .filter_map(|row| row.activity_id.as_ref())
            .collect()
    }

    /// Competency ids linked to an activity, in row order. May repeat.
    pub fn find_competencies_for_activity(&self, activity_id: &RecordId) -> Vec<&'a RecordId> {
        self.criteria_rows_for_activity(activity_id)
            .filter_map(|row| row.competency_id.as_ref())
            .collect()
    }

    pub fn find_performance_levels(&self, criterion_id: &RecordId) -> Vec<PerformanceLevel> {
        self.levels_by_criterion
            .get(criterion_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Every criteria row for an activity, in source order.
    pub fn criteria_rows_for_activity(
        &self,
        activity_id: &RecordId,
    ) -> impl Iterator<Item = &'a CriterionRow> + '_ {
        self.criteria_by_activity
            .get(activity_id)
            .into_iter()
            .flat_map(|rows| rows.iter().copied())
    }

    pub fn find_resource_reference(&self, reference_id: &RecordId) -> Option<&'a ResourceReferenceRecord> {
        self.references.get(reference_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn source() -> SourceDocument {
        SourceDocument::from_value(json!({
            "course": {"id": 1},
            "units": [
                {"unit": {"id": 100, "title": "Unit A"}, "activityIds": [1, 2]},
                {"unit": {"id": 101, "title": "Unit B"}, "activityIds": [3, 2]}
            ],
            "activities": [
                {"activity": {"id": 1, "title": "Read", "activityTextId": 10}},
                {"activity": {"id": 2, "title": "Discuss"}},
                {"activity": {"id": 3, "title": "Write"}},
                {"activity": {"id": 1, "title": "Shadowed duplicate"}}
            ],
            "activityText": [{"id": 10, "text": "<p>Chapter 1</p>"}],
            "competencies": [{"id": "C1"}, {"id": "C2"}],
            "criteria": [
                {"activityId": 3, "competencyId": "C1",
                 "criterion": {"id": 500, "text": "Thesis", "gradeWeight": 0.5, "gradePoints": 20}},
                {"activityId": 3, "competencyId": "C2", "criterion": null},
                {"activityId": 3, "competencyId": "C1",
                 "criterion": {"id": 501, "text": "Evidence"}},
                {"activityId": 2, "competencyId": "C1"}
            ],
            "performanceLevels": [
                {"criterionId": 500,
                 "performanceLevel": {"performanceLevelType": "DISTINGUISHED", "gradePoints": 20, "text": "Great"}},
                {"criterionId": 500, "performanceLevel": null}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_find_activity_first_record_wins() {
        let source = source();
        let resolver = Resolver::new(&source);
        let found = resolver.find_activity(&RecordId::Num(1)).unwrap();
        assert_eq!(found.activity.title.as_deref(), Some("Read"));
        assert!(resolver.find_activity(&RecordId::Num(99)).is_none());
        assert!(resolver.find_activity(&RecordId::Text("1".into())).is_none());
    }

    #[test]
    fn test_find_activity_text_cleans_and_defaults() {
        let source = source();
        let resolver = Resolver::new(&source);
        assert_eq!(resolver.find_activity_text(&RecordId::Num(10)), "Chapter 1");
        assert_eq!(resolver.find_activity_text(&RecordId::Num(11)), "");
    }

    #[test]
    fn test_find_week_for_activity_uses_first_unit() {
        let source = source();
        let resolver = Resolver::new(&source);
        assert_eq!(resolver.find_week_for_activity(&RecordId::Num(2)), Some(1));
        assert_eq!(resolver.find_week_for_activity(&RecordId::Num(3)), Some(2));
        assert_eq!(resolver.find_week_for_activity(&RecordId::Num(42)), None);
    }

    #[test]
    fn test_find_criteria_filters_null_criterion() {
        let source = source();
        let resolver = Resolver::new(&source);
        let c1 = resolver.find_criteria_for_activity(&RecordId::Num(3), &"C1".into());
        assert_eq!(c1.len(), 2);
        assert_eq!(c1[0].points, 20.0);
        assert_eq!(c1[1].points, 0.0);
        assert!(resolver
            .find_criteria_for_activity(&RecordId::Num(3), &"C2".into())
            .is_empty());
    }

    #[test]
    fn test_join_table_id_lists_keep_duplicates() {
        let source = source();
        let resolver = Resolver::new(&source);
        let comps = resolver.find_competencies_for_activity(&RecordId::Num(3));
        assert_eq!(comps.len(), 3);
        let acts = resolver.find_activities_for_competency(&"C1".into());
        assert_eq!(
            acts,
            vec![&RecordId::Num(3), &RecordId::Num(3), &RecordId::Num(2)]
        );
        assert!(resolver
            .find_activities_for_competency(&"C9".into())
            .is_empty());
    }

    #[test]
    fn test_find_performance_levels() {
        let source = source();
        let resolver = Resolver::new(&source);
        let levels = resolver.find_performance_levels(&RecordId::Num(500));
        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].level_type.as_deref(), Some("DISTINGUISHED"));
        assert!(resolver.find_performance_levels(&RecordId::Num(501)).is_empty());
    }
}
