//! Sequencing-pattern mining: which ordered mixes of activity types recur
//! from week to week.

use super::percentage;
use crate::document::{CourseDocument, Week};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternFrequency {
    pub pattern: Vec<String>,
    pub frequency: usize,
    pub percentage: f64,
}

/// A week that does not follow the most common pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternInconsistency {
    pub week_number: u32,
    pub pattern: Vec<String>,
    pub expected: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequencingAnalysis {
    /// Most frequent first; equal frequencies keep first-seen order.
    pub typical_patterns: Vec<PatternFrequency>,
    pub weekly_patterns: BTreeMap<u32, Vec<String>>,
    pub inconsistencies: Vec<PatternInconsistency>,
}

pub fn week_pattern(week: &Week) -> Vec<String> {
    week.activities
        .iter()
        .map(|activity| activity.activity_type.clone())
        .collect()
}

pub fn sequencing_analysis(document: &CourseDocument) -> SequencingAnalysis {
    let weekly_patterns: BTreeMap<u32, Vec<String>> = document
        .weeks
        .iter()
        .map(|week| (week.week_number, week_pattern(week)))
        .collect();

    let mut tallies: Vec<(&Vec<String>, usize)> = Vec::new();
    for week in &document.weeks {
        let Some(pattern) = weekly_patterns.get(&week.week_number) else {
            continue;
        };
        match tallies.iter_mut().find(|(seen, _)| *seen == pattern) {
            Some((_, count)) => *count += 1,
            None => tallies.push((pattern, 1)),
        }
    }
    tallies.sort_by(|a, b| b.1.cmp(&a.1));

    let total_weeks = document.weeks.len();
    let typical_patterns: Vec<PatternFrequency> = tallies
        .iter()
        .map(|(pattern, frequency)| PatternFrequency {
            pattern: (*pattern).clone(),
            frequency: *frequency,
            percentage: percentage(*frequency, total_weeks),
        })
        .collect();

    let inconsistencies = match typical_patterns.first() {
        Some(dominant) => weekly_patterns
            .iter()
            .filter(|(_, pattern)| **pattern != dominant.pattern)
            .map(|(&week_number, pattern)| PatternInconsistency {
                week_number,
                pattern: pattern.clone(),
                expected: dominant.pattern.clone(),
            })
            .collect(),
        None => Vec::new(),
    };

    SequencingAnalysis {
        typical_patterns,
        weekly_patterns,
        inconsistencies,
    }
}
