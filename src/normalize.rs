//! Free-text cleanup and resource classification.

use crate::document::ResourceKind;
use crate::source::ResourceRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));

static WHITESPACE_ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)&(?:nbsp|ensp|emsp|thinsp|#160|#x0*a0|#32|#x0*20|#9|#x0*9|#10|#x0*a|#13|#x0*d);")
        .expect("valid entity pattern")
});

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Strip markup and collapse whitespace (including whitespace entities).
///
/// Idempotent: cleaning already-clean text returns it unchanged.
pub fn clean_text(html: Option<&str>) -> String {
    let Some(html) = html else {
        return String::new();
    };
    let without_tags = TAG.replace_all(html, " ");
    let without_entities = WHITESPACE_ENTITY.replace_all(&without_tags, " ");
    WHITESPACE_RUN
        .replace_all(&without_entities, " ")
        .trim()
        .to_string()
}

/// Classify a resource into the fixed taxonomy.
///
/// Rules are evaluated in order and the first match wins; the order is part
/// of the contract (a "Reading List" PDF is a reading list, not a document).
pub fn classify_resource(resource: &ResourceRecord) -> ResourceKind {
    let name = lower(resource.resource_name.as_deref());
    let media = lower(resource.media_type.as_deref());
    let file = lower(resource.file_type.as_deref());

    if name.contains("reading list") {
        ResourceKind::ReadingList
    } else if media.contains("link") {
        ResourceKind::ExternalLink
    } else if media.contains("video") || media.contains("audio") {
        ResourceKind::Multimedia
    } else if media.contains("graphic") || media.contains("image") {
        ResourceKind::Media
    } else if name.contains("tutorial") {
        ResourceKind::Tutorial
    } else if name.contains("template") {
        ResourceKind::Template
    } else if file.contains("pdf") {
        ResourceKind::Document
    } else if name.contains("simulation") {
        ResourceKind::Simulation
    } else if name.contains("assessment") {
        ResourceKind::Assessment
    } else if name.contains("rubric") {
        ResourceKind::Rubric
    } else {
        ResourceKind::Other
    }
}

fn lower(value: Option<&str>) -> String {
    value.unwrap_or_default().to_lowercase()
}

/// `persistentLinks` may be a single string or a list; always return a list.
pub fn normalize_links(links: Option<&Value>) -> Vec<String> {
    match links {
        Some(Value::String(link)) => vec![link.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}
