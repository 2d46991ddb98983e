//! Competency view: the criteria join table inverted into
//! competency -> activities, with per-competency point totals.

use super::distinct;
use super::weeks::WeekPlacement;
use crate::document::{CompetencyActivity, CompetencyView};
use crate::normalize::clean_text;
use crate::resolver::Resolver;
use crate::source::CompetencyRecord;

pub fn map_competencies(resolver: &Resolver<'_>, placement: &WeekPlacement) -> Vec<CompetencyView> {
    resolver
        .source()
        .competencies
        .iter()
        .map(|competency| map_competency(resolver, placement, competency))
        .collect()
}

fn map_competency(
    resolver: &Resolver<'_>,
    placement: &WeekPlacement,
    competency: &CompetencyRecord,
) -> CompetencyView {
    let activities: Vec<CompetencyActivity> = match &competency.id {
        Some(competency_id) => distinct(
            resolver
                .find_activities_for_competency(competency_id)
                .into_iter()
                .cloned(),
        )
        .into_iter()
        // Unresolvable links are dropped, not kept as placeholders.
        .filter_map(|activity_id| {
            let entry = resolver.find_activity(&activity_id)?;
            let record = &entry.activity;
            let slot = placement.placement_of(&activity_id);
            Some(CompetencyActivity {
                code: record.code.clone(),
                title: record.title.clone().unwrap_or_default(),
                activity_type: record.type_name().to_string(),
                weight: record.weight(),
                points: record.points(),
                week_number: slot.map_or(0, |(week, _)| week),
                week_sequence: slot.map(|(_, sequence)| sequence),
                criteria: resolver.find_criteria_for_activity(&activity_id, competency_id),
                id: activity_id,
            })
        })
        .collect(),
        None => Vec::new(),
    };

    CompetencyView {
        id: competency.id.clone(),
        text: competency.text.as_deref().map(|text| clean_text(Some(text))),
        total_points: activities.iter().map(|activity| activity.points).sum(),
        activities,
    }
}
