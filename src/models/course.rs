use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_CREDITS: f64 = 3.0;
pub const DEFAULT_GRADE: f64 = 4.0;
pub const UNNAMED_COURSE: &str = "New Course";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub credits: f64,
    #[serde(default)]
    pub grade: f64,
}

impl Course {
    pub fn points(&self) -> f64 {
        self.credits * self.grade
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCourseRequest {
    pub name: Option<String>,
    pub credits: Option<f64>,
    pub grade: Option<f64>,
}

impl NewCourseRequest {
    pub fn into_course(self) -> Course {
        Course {
            id: new_id(),
            name: self.name.map(|n| n.trim().to_string()).unwrap_or_default(),
            credits: self.credits.unwrap_or(DEFAULT_CREDITS),
            grade: self.grade.unwrap_or(DEFAULT_GRADE),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCourseRequest {
    pub name: Option<String>,
    pub credits: Option<f64>,
    pub grade: Option<f64>,
}

impl UpdateCourseRequest {
    pub fn apply(self, course: &mut Course) {
        if let Some(name) = self.name {
            course.name = name;
        }
        if let Some(credits) = self.credits {
            course.credits = credits;
        }
        if let Some(grade) = self.grade {
            course.grade = grade;
        }
        // saved courses always carry a name
        let trimmed = course.name.trim();
        course.name = if trimmed.is_empty() {
            UNNAMED_COURSE.to_string()
        } else {
            trimmed.to_string()
        };
    }
}

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}
