//! Units to weeks, activities within weeks.
//!
//! Week order comes from an explicit "Week N" marker in the unit title,
//! falling back to the unit's source position; final numbering is always
//! contiguous 1..N after the sort. Inside a week, activities are ordered by
//! type precedence (study, discussion, assignment, anything else) with ties
//! kept in source order, and numbered from 1.
//!
//! Per-job counters live in an [`ActivityTally`] owned by the transformer,
//! so concurrent jobs never share state.

use super::distinct;
use crate::document::{
    Activity, ActivityCounts, ActivitySequencing, Introduction, ResourceRef, ScoredCriterion,
    ScoringGuide, SequenceRef, TypeCounts, TypedSequenceRef, Week, WeekActivityCount,
    WeekSequence,
};
use crate::normalize::clean_text;
use crate::resolver::Resolver;
use crate::source::{ActivityEntry, ActivityRecord, RecordId, UnitEntry};
use crate::validate::{Advisory, AdvisoryKind};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

static WEEK_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)week\s+(\d+)").expect("valid week marker pattern"));

/// Number from a "Week N" marker, if the text carries one.
pub fn week_marker(text: &str) -> Option<u32> {
    WEEK_MARKER
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Source indexes of `units` in week order.
pub fn week_order(units: &[UnitEntry]) -> Vec<usize> {
    let mut order: Vec<(usize, u32)> = units
        .iter()
        .enumerate()
        .map(|(index, unit)| {
            let fallback = u32::try_from(index + 1).unwrap_or(u32::MAX);
            let key = unit
                .unit
                .title
                .as_deref()
                .and_then(week_marker)
                .unwrap_or(fallback);
            (index, key)
        })
        .collect();
    order.sort_by_key(|&(_, key)| key);
    order.into_iter().map(|(index, _)| index).collect()
}

/// Ordering rank of an activity type; lower sorts first.
pub fn type_rank(activity_type: &str) -> u8 {
    match activity_type.to_lowercase().as_str() {
        "study" => 1,
        "discussion" => 2,
        "assignment" => 3,
        _ => 4,
    }
}

/// Running counters for one transformation job.
#[derive(Debug, Default, Clone)]
pub struct ActivityTally {
    accepted: u32,
    by_type: BTreeMap<String, u32>,
}

impl ActivityTally {
    pub fn record(&mut self, activity_type: &str) {
        self.accepted += 1;
        *self.by_type.entry(activity_type.to_lowercase()).or_insert(0) += 1;
    }

    pub fn accepted(&self) -> u32 {
        self.accepted
    }

    fn type_counts(&self) -> TypeCounts {
        let mut counts = TypeCounts::default();
        for (key, &count) in &self.by_type {
            match key.as_str() {
                "discussion" => counts.discussion += count,
                "assignment" => counts.assignment += count,
                "study" => counts.study += count,
                _ => counts.other += count,
            }
        }
        counts
    }

    /// Reconcile the counters against the activities actually placed in
    /// `weeks`. Types outside discussion/assignment/study fold into `other`.
    pub fn finalize(&self, weeks: &[Week]) -> (ActivityCounts, Vec<Advisory>) {
        let placed: u32 = weeks.iter().map(|week| week.activities.len() as u32).sum();
        if self.accepted == placed {
            return (
                ActivityCounts {
                    total: self.accepted,
                    by_type: self.type_counts(),
                },
                Vec::new(),
            );
        }

        let message = format!(
            "Activity count mismatch: counter={}, actual={}",
            self.accepted, placed
        );
        warn!("{message}");
        let mut recount = ActivityTally::default();
        for activity in weeks.iter().flat_map(|week| &week.activities) {
            recount.record(&activity.activity_type);
        }
        (
            ActivityCounts {
                total: placed,
                by_type: recount.type_counts(),
            },
            vec![Advisory::new(AdvisoryKind::CountReconciliation, message)],
        )
    }
}

/// Where units and activities ended up after week ordering.
#[derive(Debug, Default, Clone)]
pub struct WeekPlacement {
    unit_week: HashMap<usize, u32>,
    activity_sequence: HashMap<RecordId, (u32, u32)>,
}

impl WeekPlacement {
    /// Week number of the unit at 1-based source `position`.
    pub fn week_of_unit(&self, position: usize) -> Option<u32> {
        self.unit_week.get(&position).copied()
    }

    /// Week of the first placement of an activity in sorted-week order.
    pub fn week_of_activity(&self, activity_id: &RecordId) -> Option<u32> {
        self.placement_of(activity_id).map(|(week, _)| week)
    }

    /// `(week, sequence)` of the first placement of an activity.
    pub fn placement_of(&self, activity_id: &RecordId) -> Option<(u32, u32)> {
        self.activity_sequence.get(activity_id).copied()
    }
}

/// Everything the week pass produces.
#[derive(Debug)]
pub struct WeekAssembly {
    pub weeks: Vec<Week>,
    pub tally: ActivityTally,
    pub sequencing: ActivitySequencing,
    pub placement: WeekPlacement,
}

pub struct WeekTransformer<'r, 'a> {
    resolver: &'r Resolver<'a>,
    tally: ActivityTally,
    sequencing: ActivitySequencing,
    placement: WeekPlacement,
    week_resources: Vec<(u32, ResourceRef)>,
}

impl<'r, 'a> WeekTransformer<'r, 'a> {
    pub fn new(resolver: &'r Resolver<'a>) -> Self {
        // References are joined to weeks by the "Week N" marker in their name.
        let week_resources = resolver
            .source()
            .resources_references
            .iter()
            .filter_map(|row| row.course_resource_reference.as_ref())
            .filter_map(|reference| {
                let week = week_marker(reference.resource_name.as_deref()?)?;
                Some((
                    week,
                    ResourceRef {
                        id: reference.id.clone(),
                        name: reference.resource_name.clone(),
                        media_type: reference.media_type.clone(),
                    },
                ))
            })
            .collect();

        Self {
            resolver,
            tally: ActivityTally::default(),
            sequencing: ActivitySequencing::default(),
            placement: WeekPlacement::default(),
            week_resources,
        }
    }

    pub fn run(mut self) -> WeekAssembly {
        let units = &self.resolver.source().units;
        let order = week_order(units);

        for (week_index, &unit_index) in order.iter().enumerate() {
            let week_number = week_index as u32 + 1;
            self.placement.unit_week.insert(unit_index + 1, week_number);
        }

        let weeks = order
            .iter()
            .enumerate()
            .map(|(week_index, &unit_index)| {
                self.transform_week(&units[unit_index], week_index as u32 + 1)
            })
            .collect();

        WeekAssembly {
            weeks,
            tally: self.tally,
            sequencing: self.sequencing,
            placement: self.placement,
        }
    }

    fn transform_week(&mut self, unit: &UnitEntry, week_number: u32) -> Week {
        let activities = self.transform_activities(&unit.activity_ids, week_number);
        self.record_sequencing(&activities, week_number);

        let mut by_type: BTreeMap<String, u32> = BTreeMap::new();
        for activity in &activities {
            let key = match activity.activity_type.to_lowercase() {
                t if t.is_empty() => "other".to_string(),
                t => t,
            };
            *by_type.entry(key).or_insert(0) += 1;
        }

        Week {
            week_number,
            id: unit.unit.id.clone(),
            title: unit.unit.title.clone(),
            introduction: self.transform_introduction(unit.introduction_id.as_ref()),
            duration: unit.unit.duration.clone(),
            activity_count: WeekActivityCount {
                total: activities.len() as u32,
                by_type,
            },
            activities,
            resources: self.week_resources(week_number),
        }
    }

    /// Resolve, order and number the activities of one week. Ids that do
    /// not resolve are dropped before numbering.
    fn transform_activities(&mut self, activity_ids: &[RecordId], week_number: u32) -> Vec<Activity> {
        let mut resolved: Vec<&'a ActivityEntry> = activity_ids
            .iter()
            .filter_map(|id| self.resolver.find_activity(id))
            .collect();
        resolved.sort_by_key(|entry| type_rank(entry.activity.type_name()));

        resolved
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                let sequence_number = index as u32 + 1;
                self.tally.record(entry.activity.type_name());
                self.placement
                    .activity_sequence
                    .entry(entry.activity.id.clone())
                    .or_insert((week_number, sequence_number));
                self.build_activity(entry, week_number, sequence_number)
            })
            .collect()
    }

    fn build_activity(&self, entry: &ActivityEntry, week_number: u32, sequence_number: u32) -> Activity {
        let record = &entry.activity;
        Activity {
            sequence_number,
            id: record.id.clone(),
            code: record.code.clone(),
            title: record.title.clone(),
            activity_type: record.type_name().to_string(),
            grade_type: record.grade_type.clone(),
            grade_weight: record.weight(),
            grade_points: record.points(),
            week_number,
            text: entry
                .text_id()
                .map(|id| self.resolver.find_activity_text(id))
                .unwrap_or_default(),
            scoring_guide: self.scoring_guide(record),
            resources: self.activity_resources(entry),
            competencies: distinct(
                self.resolver
                    .find_competencies_for_activity(&record.id)
                    .into_iter()
                    .cloned(),
            ),
        }
    }

    /// Rubric criteria with their performance levels; only for rubric-scored
    /// activities with at least one criterion.
    fn scoring_guide(&self, record: &ActivityRecord) -> Option<ScoringGuide> {
        if record.scoring_guide_type.as_deref() != Some("RUBRIC") {
            return None;
        }

        let criteria: Vec<ScoredCriterion> = self
            .resolver
            .criteria_rows_for_activity(&record.id)
            .filter_map(|row| {
                let criterion = row.criterion.as_ref()?;
                Some(ScoredCriterion {
                    id: criterion.id.clone(),
                    text: criterion.text.clone(),
                    grade_weight: criterion.grade_weight.unwrap_or(0.0),
                    grade_points: criterion.grade_points.unwrap_or(0.0),
                    competency_id: row.competency_id.clone(),
                    performance_levels: criterion
                        .id
                        .as_ref()
                        .map(|id| self.resolver.find_performance_levels(id))
                        .unwrap_or_default(),
                })
            })
            .collect();

        (!criteria.is_empty()).then_some(ScoringGuide { criteria })
    }

    fn activity_resources(&self, entry: &ActivityEntry) -> Vec<ResourceRef> {
        entry
            .course_resource_reference_ids
            .iter()
            .filter_map(|id| self.resolver.find_resource_reference(id))
            .map(|reference| ResourceRef {
                id: reference.id.clone(),
                name: reference.resource_name.clone(),
                media_type: reference.media_type.clone(),
            })
            .collect()
    }

    fn transform_introduction(&self, intro_id: Option<&RecordId>) -> Option<Introduction> {
        let intro = self.resolver.find_introduction(intro_id?)?;
        Some(Introduction {
            id: intro.id.clone(),
            text: clean_text(intro.text.as_deref()),
        })
    }

    fn week_resources(&self, week_number: u32) -> Vec<ResourceRef> {
        self.week_resources
            .iter()
            .filter(|(week, _)| *week == week_number)
            .map(|(_, reference)| reference.clone())
            .collect()
    }

    fn record_sequencing(&mut self, activities: &[Activity], week_number: u32) {
        let mut week = WeekSequence::default();
        for activity in activities {
            let entry = SequenceRef {
                id: activity.id.clone(),
                sequence: activity.sequence_number,
            };
            let typed = TypedSequenceRef {
                id: activity.id.clone(),
                week_number,
                sequence: activity.sequence_number,
            };
            let by_type = &mut self.sequencing.by_type;
            match activity.activity_type.to_lowercase().as_str() {
                "study" => {
                    week.studies.push(entry);
                    by_type.study.push(typed);
                }
                "discussion" => {
                    week.discussions.push(entry);
                    by_type.discussion.push(typed);
                }
                "assignment" => {
                    week.assignments.push(entry);
                    by_type.assignment.push(typed);
                }
                _ => by_type.other.push(typed),
            }
        }
        self.sequencing.by_week.insert(week_number, week);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceDocument;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn assemble(value: serde_json::Value) -> WeekAssembly {
        let source = SourceDocument::from_value(value).unwrap();
        let resolver = Resolver::new(&source);
        WeekTransformer::new(&resolver).run()
    }

    fn base() -> serde_json::Value {
        json!({
            "course": {"id": 1},
            "units": [
                {"unit": {"id": 20, "title": "Week 2 Intro"}, "activityIds": [4]},
                {"unit": {"id": 10, "title": "Week 1 Intro"}, "activityIds": [3, 1, 99, 2, 5],
                 "introductionId": 70}
            ],
            "activities": [
                {"activity": {"id": 1, "code": "u01s1", "activityType": "STUDY", "gradePoints": 0,
                              "activityTextId": 500}},
                {"activity": {"id": 2, "code": "u01d1", "activityType": "discussion", "gradePoints": 10}},
                {"activity": {"id": 3, "code": "u01a1", "activityType": "Assignment", "gradePoints": 50,
                              "scoringGuideType": "RUBRIC"},
                 "courseResourceReferenceIds": [900]},
                {"activity": {"id": 4, "activityType": "QUIZ"}},
                {"activity": {"id": 5, "activityType": "STUDY"}}
            ],
            "activityText": [{"id": 500, "text": "<p>Read <em>chapter</em> one</p>"}],
            "introductions": [{"id": 70, "text": "<h1>Welcome</h1>"}],
            "competencies": [{"id": "C1"}, {"id": "C2"}],
            "criteria": [
                {"activityId": 3, "competencyId": "C1", "criterion": {"id": 300, "text": "Thesis", "gradePoints": 25}},
                {"activityId": 3, "competencyId": "C2", "criterion": {"id": 301, "text": "Sources", "gradePoints": 25}},
                {"activityId": 3, "competencyId": "C1", "criterion": null}
            ],
            "performanceLevels": [
                {"criterionId": 300, "performanceLevel": {"performanceLevelType": "PROFICIENT", "gradePoints": 20, "text": "ok"}}
            ],
            "resourcesReferences": [
                {"courseResourceReference": {"id": 900, "resourceName": "Week 1 Reading List", "mediaType": "document"}},
                {"courseResourceReference": {"id": 901, "resourceName": "week 2 video", "mediaType": "video"}},
                {"courseResourceReference": {"id": 902, "resourceName": "Syllabus"}}
            ]
        })
    }

    #[test]
    fn test_week_marker() {
        assert_eq!(week_marker("Week 3: Strategy"), Some(3));
        assert_eq!(week_marker("UNIT week 12"), Some(12));
        assert_eq!(week_marker("Orientation"), None);
    }

    #[test]
    fn test_marker_overrides_source_position() {
        let assembly = assemble(base());
        let titles: Vec<_> = assembly
            .weeks
            .iter()
            .map(|w| (w.week_number, w.title.clone().unwrap()))
            .collect();
        assert_eq!(
            titles,
            vec![(1, "Week 1 Intro".to_string()), (2, "Week 2 Intro".to_string())]
        );
        assert_eq!(assembly.placement.week_of_unit(2), Some(1));
        assert_eq!(assembly.placement.week_of_unit(1), Some(2));
    }

    #[test]
    fn test_unmarked_units_use_position_and_sort_stably() {
        let units: Vec<UnitEntry> = serde_json::from_value(json!([
            {"unit": {"title": "Orientation"}},
            {"unit": {"title": "Week 1"}},
            {"unit": {"title": "Capstone"}},
            {"unit": {"title": "Week 5"}}
        ]))
        .unwrap();
        // keys: 1, 1, 3, 5
        assert_eq!(week_order(&units), vec![0, 1, 2, 3]);

        let units: Vec<UnitEntry> = serde_json::from_value(json!([
            {"unit": {"title": "Week 9"}},
            {"unit": {"title": "Intro"}},
            {"unit": null}
        ]))
        .unwrap();
        // keys: 9, 2, 3
        assert_eq!(week_order(&units), vec![1, 2, 0]);
    }

    #[test]
    fn test_activities_ordered_by_type_precedence() {
        let assembly = assemble(base());
        let week1 = &assembly.weeks[0];
        let order: Vec<_> = week1
            .activities
            .iter()
            .map(|a| (a.sequence_number, a.id.clone()))
            .collect();
        assert_eq!(
            order,
            vec![
                (1, RecordId::Num(1)),
                (2, RecordId::Num(5)),
                (3, RecordId::Num(2)),
                (4, RecordId::Num(3)),
            ]
        );
    }

    #[test]
    fn test_unresolvable_ids_are_dropped() {
        let assembly = assemble(base());
        assert_eq!(assembly.weeks[0].activity_count.total, 4);
        assert_eq!(assembly.tally.accepted(), 5);
        assert!(assembly.weeks[0]
            .activities
            .iter()
            .all(|a| a.id != RecordId::Num(99)));
    }

    #[test]
    fn test_activity_fields_are_resolved() {
        let assembly = assemble(base());
        let week1 = &assembly.weeks[0];
        let study = &week1.activities[0];
        assert_eq!(study.text, "Read chapter one");
        assert!(study.scoring_guide.is_none());

        let assignment = &week1.activities[3];
        assert_eq!(assignment.competencies, vec![RecordId::from("C1"), RecordId::from("C2")]);
        let guide = assignment.scoring_guide.as_ref().unwrap();
        assert_eq!(guide.criteria.len(), 2);
        assert_eq!(guide.criteria[0].performance_levels.len(), 1);
        assert_eq!(assignment.resources.len(), 1);
        assert_eq!(assignment.resources[0].name.as_deref(), Some("Week 1 Reading List"));

        assert_eq!(
            week1.introduction.as_ref().map(|i| i.text.as_str()),
            Some("Welcome")
        );
    }

    #[test]
    fn test_week_resources_join_on_name_marker() {
        let assembly = assemble(base());
        let names = |w: &Week| -> Vec<String> {
            w.resources.iter().filter_map(|r| r.name.clone()).collect()
        };
        assert_eq!(names(&assembly.weeks[0]), vec!["Week 1 Reading List"]);
        assert_eq!(names(&assembly.weeks[1]), vec!["week 2 video"]);
    }

    #[test]
    fn test_week_counts_and_sequencing() {
        let assembly = assemble(base());
        let week1 = &assembly.weeks[0];
        assert_eq!(week1.activity_count.by_type.get("study"), Some(&2));
        assert_eq!(week1.activity_count.by_type.get("assignment"), Some(&1));
        assert_eq!(assembly.weeks[1].activity_count.by_type.get("quiz"), Some(&1));

        let seq = &assembly.sequencing.by_week[&1];
        assert_eq!(seq.studies.len(), 2);
        assert_eq!(seq.assignments[0].sequence, 4);
        assert_eq!(assembly.sequencing.by_type.other.len(), 1);
        assert_eq!(assembly.sequencing.by_type.other[0].week_number, 2);
    }

    #[test]
    fn test_finalize_folds_unknown_types_into_other() {
        let assembly = assemble(base());
        let (counts, advisories) = assembly.tally.finalize(&assembly.weeks);
        assert!(advisories.is_empty());
        assert_eq!(counts.total, 5);
        assert_eq!(
            counts.by_type,
            TypeCounts {
                discussion: 1,
                assignment: 1,
                study: 2,
                other: 1
            }
        );
        assert_eq!(counts.total, counts.by_type.sum());
    }

    #[test]
    fn test_finalize_reconciles_counter_drift() {
        let assembly = assemble(base());
        let mut tally = assembly.tally.clone();
        tally.record("study");
        let (counts, advisories) = tally.finalize(&assembly.weeks);
        assert_eq!(counts.total, 5);
        assert_eq!(counts.by_type.sum(), 5);
        assert_eq!(advisories[0].kind, AdvisoryKind::CountReconciliation);
    }

    #[test]
    fn test_type_rank() {
        assert_eq!(type_rank("STUDY"), 1);
        assert_eq!(type_rank("Discussion"), 2);
        assert_eq!(type_rank("assignment"), 3);
        assert_eq!(type_rank("quiz"), 4);
        assert_eq!(type_rank(""), 4);
    }
}
