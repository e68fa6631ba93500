pub mod course;
pub mod planner;
pub mod record;
pub mod semester;

pub use course::{Course, NewCourseRequest, UpdateCourseRequest};
pub use planner::{
    AdjustGradeRequest, NewPlannedCourseRequest, PlannedCourse, SetTargetRequest,
    UpdatePlannedCourseRequest,
};
pub use record::AcademicRecord;
pub use semester::{NewSemesterRequest, Semester, UpdateSemesterRequest};
