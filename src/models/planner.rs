use serde::{Deserialize, Serialize};

use super::course::new_id;

pub const DEFAULT_PLANNED_CREDITS: &str = "3";

/// A hypothetical upcoming course whose grade the planner solves for.
/// `credits` keeps the literal user input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedCourse {
    pub id: String,
    pub name: String,
    pub credits: String,
}

impl PlannedCourse {
    pub fn new(name: impl Into<String>, credits: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            credits: credits.into(),
        }
    }

    /// Falls back to the 1-based position when the name is blank.
    pub fn label(&self, index: usize) -> String {
        if self.name.is_empty() {
            format!("Course {}", index + 1)
        } else {
            self.name.clone()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPlannedCourseRequest {
    pub name: Option<String>,
    pub credits: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePlannedCourseRequest {
    pub name: Option<String>,
    pub credits: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetTargetRequest {
    pub target: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustGradeRequest {
    pub value: String,
}
