//! Resource classification, usage tracking and grouping.

use super::weeks::WeekPlacement;
use crate::document::{ActivityUsage, ClassifiedResource, ResourceGroup, ResourceKind, ResourceUsage};
use crate::normalize::{classify_resource, normalize_links};
use crate::resolver::Resolver;
use crate::source::{RecordId, ResourceRecord};
use std::collections::BTreeMap;

/// Classify every source resource and group the results by kind. Only kinds
/// with at least one member appear in the map.
pub fn aggregate_resources(
    resolver: &Resolver<'_>,
    placement: &WeekPlacement,
) -> BTreeMap<ResourceKind, ResourceGroup> {
    let mut groups: BTreeMap<ResourceKind, ResourceGroup> = BTreeMap::new();

    for entry in &resolver.source().resources {
        let classified = classify(resolver, placement, &entry.resource);
        let group = groups
            .entry(classified.kind)
            .or_insert_with(|| ResourceGroup {
                resources: Vec::new(),
                count: 0,
                total_usage: 0,
            });
        group.count += 1;
        group.total_usage += classified.usage.total_references;
        group.resources.push(classified);
    }

    groups
}

fn classify(
    resolver: &Resolver<'_>,
    placement: &WeekPlacement,
    resource: &ResourceRecord,
) -> ClassifiedResource {
    ClassifiedResource {
        id: resource.id.clone(),
        name: resource.resource_name.clone(),
        kind: classify_resource(resource),
        links: normalize_links(resource.persistent_links.as_ref()),
        description: resource.annotation.clone().unwrap_or_default(),
        media_type: resource.media_type.clone().unwrap_or_default(),
        usage_type: resource.usage_type.clone().unwrap_or_default(),
        usage: resource
            .id
            .as_ref()
            .map(|id| track_usage(resolver, placement, id))
            .unwrap_or_default(),
    }
}

/// Weeks and activities that reference `resource_id` through their
/// `courseResourceReferenceIds` lists.
pub fn track_usage(
    resolver: &Resolver<'_>,
    placement: &WeekPlacement,
    resource_id: &RecordId,
) -> ResourceUsage {
    let source = resolver.source();

    let mut weeks: Vec<u32> = source
        .units
        .iter()
        .enumerate()
        .filter(|(_, unit)| unit.course_resource_reference_ids.contains(resource_id))
        .filter_map(|(index, _)| placement.week_of_unit(index + 1))
        .collect();
    weeks.sort_unstable();

    let activities: Vec<ActivityUsage> = source
        .activities
        .iter()
        .filter(|entry| entry.course_resource_reference_ids.contains(resource_id))
        .map(|entry| ActivityUsage {
            id: entry.activity.id.clone(),
            activity_type: entry.activity.activity_type.clone(),
            week: placement.week_of_activity(&entry.activity.id),
        })
        .collect();

    ResourceUsage {
        total_references: weeks.len() + activities.len(),
        weeks,
        activities,
    }
}
