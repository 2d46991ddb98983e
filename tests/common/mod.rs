// Shared fixtures for coursemap integration tests
#![allow(dead_code)]

use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Incrementally builds a source export as a JSON value.
#[derive(Debug, Clone)]
pub struct SourceBuilder {
    course: Value,
    overview: Option<Value>,
    units: Vec<Value>,
    activities: Vec<Value>,
    activity_text: Vec<Value>,
    introductions: Vec<Value>,
    competencies: Vec<Value>,
    criteria: Vec<Value>,
    performance_levels: Vec<Value>,
    resources: Vec<Value>,
    references: Vec<Value>,
}

impl SourceBuilder {
    pub fn new(name: &str, number: &str) -> Self {
        Self {
            course: json!({
                "id": 1,
                "name": name,
                "number": number,
                "credits": 3,
                "status": "ACTIVE",
                "courseDesignModelType": "GUIDED_PATH",
                "updatedDate": "2024-02-15T10:30:00Z"
            }),
            overview: None,
            units: Vec::new(),
            activities: Vec::new(),
            activity_text: Vec::new(),
            introductions: Vec::new(),
            competencies: Vec::new(),
            criteria: Vec::new(),
            performance_levels: Vec::new(),
            resources: Vec::new(),
            references: Vec::new(),
        }
    }

    pub fn course_field(mut self, key: &str, value: Value) -> Self {
        self.course[key] = value;
        self
    }

    pub fn overview(mut self, text: &str) -> Self {
        self.overview = Some(json!({"id": 500, "text": text}));
        self
    }

    pub fn unit(mut self, title: &str, activity_ids: &[i64]) -> Self {
        self.units
            .push(json!({"unit": {"title": title}, "activityIds": activity_ids}));
        self
    }

    pub fn unit_value(mut self, unit: Value) -> Self {
        self.units.push(unit);
        self
    }

    pub fn activity(self, id: i64, activity_type: &str, points: f64) -> Self {
        self.activity_value(json!({
            "id": id,
            "code": format!("a{id}"),
            "title": format!("Activity {id}"),
            "activityType": activity_type,
            "gradePoints": points,
            "gradeWeight": points / 100.0
        }))
    }

    pub fn activity_value(mut self, activity: Value) -> Self {
        self.activities.push(json!({ "activity": activity }));
        self
    }

    pub fn activity_text(mut self, id: i64, text: &str) -> Self {
        self.activity_text.push(json!({"id": id, "text": text}));
        self
    }

    pub fn introduction(mut self, id: i64, text: &str) -> Self {
        self.introductions.push(json!({"id": id, "text": text}));
        self
    }

    pub fn competency(mut self, id: &str, text: &str) -> Self {
        self.competencies.push(json!({"id": id, "text": text}));
        self
    }

    pub fn criterion(mut self, activity_id: i64, competency_id: &str, criterion_id: i64, points: f64) -> Self {
        self.criteria.push(json!({
            "activityId": activity_id,
            "competencyId": competency_id,
            "criterion": {
                "id": criterion_id,
                "text": format!("Criterion {criterion_id}"),
                "gradePoints": points,
                "gradeWeight": points / 100.0
            }
        }));
        self
    }

    pub fn performance_level(mut self, criterion_id: i64, level: &str, points: f64) -> Self {
        self.performance_levels.push(json!({
            "criterionId": criterion_id,
            "performanceLevel": {"performanceLevelType": level, "gradePoints": points, "text": level}
        }));
        self
    }

    pub fn resource(mut self, resource: Value) -> Self {
        self.resources.push(json!({ "resource": resource }));
        self
    }

    pub fn reference(mut self, id: i64, name: &str, media_type: &str) -> Self {
        self.references.push(json!({
            "courseResourceReference": {"id": id, "resourceName": name, "mediaType": media_type}
        }));
        self
    }

    pub fn build(self) -> Value {
        let mut source = json!({
            "course": self.course,
            "units": self.units,
            "activities": self.activities,
            "activityText": self.activity_text,
            "introductions": self.introductions,
            "competencies": self.competencies,
            "criteria": self.criteria,
            "performanceLevels": self.performance_levels,
            "resources": self.resources,
            "resourcesReferences": self.references
        });
        if let Some(overview) = self.overview {
            source["courseOverview"] = overview;
        }
        source
    }
}

/// Three units (one without a week marker), six activities, two competencies.
pub fn business_course() -> Value {
    SourceBuilder::new("Business Strategy", "BUS3004")
        .overview("<p>Grading: A = 93% B = 85% C = 75% F = 74%</p>")
        .unit_value(json!({
            "unit": {"id": 20, "title": "Week 2: Markets"},
            "activityIds": [4, 5],
            "courseResourceReferenceIds": [801]
        }))
        .unit_value(json!({
            "unit": {"id": 10, "title": "Week 1: Foundations", "duration": "7 days"},
            "activityIds": [3, 1, 2, 999],
            "introductionId": 70,
            "courseResourceReferenceIds": [800]
        }))
        .unit("Capstone", &[6])
        .activity_value(json!({
            "id": 1, "code": "u01s1", "title": "Read chapter 1", "activityType": "STUDY",
            "activityTextId": 600
        }))
        .activity(2, "DISCUSSION", 20.0)
        .activity_value(json!({
            "id": 3, "code": "u01a1", "title": "Strategy memo", "activityType": "ASSIGNMENT",
            "gradePoints": 100, "gradeWeight": 0.5, "scoringGuideType": "RUBRIC"
        }))
        .activity(4, "STUDY", 0.0)
        .activity(5, "ASSIGNMENT", 50.0)
        .activity(6, "QUIZ", 30.0)
        .activity_text(600, "<p>Read <b>chapter&nbsp;1</b> carefully.</p>")
        .introduction(70, "<div>Welcome to week one</div>")
        .competency("C1", "<p>Analyze markets</p>")
        .competency("C2", "Communicate strategy")
        .criterion(3, "C1", 300, 60.0)
        .criterion(3, "C2", 301, 40.0)
        .criterion(5, "C1", 302, 50.0)
        .performance_level(300, "DISTINGUISHED", 60.0)
        .performance_level(300, "BASIC", 30.0)
        .resource(json!({
            "id": 800, "resourceName": "Week 1 Reading List", "persistentLinks": "https://library.example/r1",
            "mediaType": "document", "usageType": "REQUIRED"
        }))
        .resource(json!({
            "id": 801, "resourceName": "Market video", "persistentLinks": ["https://video.example/1"],
            "mediaType": "video"
        }))
        .reference(800, "Week 1 Reading List", "document")
        .build()
}

pub fn write_json(dir: &Path, name: &str, value: &Value) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(value).expect("serializable fixture"))
        .expect("Failed to write fixture");
    path
}
