use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::course::{Course, NewCourseRequest, UpdateCourseRequest, new_id};
use super::semester::{NewSemesterRequest, Semester, UpdateSemesterRequest};

/// The whole academic history. Persisted as a single JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademicRecord {
    pub semesters: Vec<Semester>,
    #[serde(default = "now")]
    pub last_updated: String,
}

impl Default for AcademicRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl AcademicRecord {
    pub fn new() -> Self {
        Self {
            semesters: Vec::new(),
            last_updated: now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.semesters.is_empty()
    }

    fn semester_mut(&mut self, id: &str) -> Option<&mut Semester> {
        self.semesters.iter_mut().find(|s| s.id == id)
    }

    fn touch(&mut self) {
        self.last_updated = now();
    }

    pub fn add_semester(&mut self, req: NewSemesterRequest) -> Semester {
        let name = semester_name(req.name, self.semesters.len());

        let semester = Semester {
            id: new_id(),
            name,
            courses: Vec::new(),
            is_locked: None,
        };
        self.semesters.push(semester.clone());
        self.touch();
        semester
    }

    pub fn update_semester(&mut self, id: &str, req: UpdateSemesterRequest) -> Option<Semester> {
        let position = self.semesters.iter().position(|s| s.id == id)?;
        let semester = &mut self.semesters[position];
        if let Some(name) = req.name {
            semester.name = semester_name(Some(name), position);
        }
        if let Some(locked) = req.is_locked {
            semester.is_locked = Some(locked);
        }
        let updated = semester.clone();
        self.touch();
        Some(updated)
    }

    pub fn delete_semester(&mut self, id: &str) -> bool {
        let before = self.semesters.len();
        self.semesters.retain(|s| s.id != id);
        let removed = self.semesters.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    pub fn add_course(&mut self, semester_id: &str, req: NewCourseRequest) -> Option<Course> {
        let semester = self.semester_mut(semester_id)?;
        let course = req.into_course();
        semester.courses.push(course.clone());
        self.touch();
        Some(course)
    }

    pub fn update_course(
        &mut self,
        semester_id: &str,
        course_id: &str,
        req: UpdateCourseRequest,
    ) -> Option<Course> {
        let course = self
            .semester_mut(semester_id)?
            .courses
            .iter_mut()
            .find(|c| c.id == course_id)?;
        req.apply(course);
        let updated = course.clone();
        self.touch();
        Some(updated)
    }

    pub fn remove_course(&mut self, semester_id: &str, course_id: &str) -> bool {
        let Some(semester) = self.semester_mut(semester_id) else {
            return false;
        };
        let before = semester.courses.len();
        semester.courses.retain(|c| c.id != course_id);
        let removed = semester.courses.len() != before;
        if removed {
            self.touch();
        }
        removed
    }
}

/// Blank names fall back to the 1-based position.
fn semester_name(name: Option<String>, index: usize) -> String {
    name.map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| format!("Semester {}", index + 1))
}

fn now() -> String {
    Utc::now().to_rfc3339()
}
