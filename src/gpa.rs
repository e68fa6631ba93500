//! Weighted grade-point arithmetic.
//!
//! Everything here is recomputed on demand from the record; nothing is cached.
//! Values stay unrounded until [`format_gpa`] renders them.

use serde::Serialize;

use crate::models::{Course, Semester};

/// Upper end of the nominal grade scale.
pub const MAX_GRADE: f64 = 4.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub total_credits: f64,
    pub total_points: f64,
    pub gpa: f64,
}

impl CalculationResult {
    /// A zero credit total yields a GPA of exactly 0.
    pub fn from_totals(total_credits: f64, total_points: f64) -> Self {
        let gpa = if total_credits > 0.0 {
            total_points / total_credits
        } else {
            0.0
        };
        Self {
            total_credits,
            total_points,
            gpa,
        }
    }
}

pub fn course_stats(courses: &[Course]) -> CalculationResult {
    let total_credits = courses.iter().map(|c| c.credits).sum();
    let total_points = courses.iter().map(Course::points).sum();
    CalculationResult::from_totals(total_credits, total_points)
}

pub fn semester_stats(semester: &Semester) -> CalculationResult {
    course_stats(&semester.courses)
}

pub fn cumulative_stats(semesters: &[Semester]) -> CalculationResult {
    let (credits, points) = semesters
        .iter()
        .map(semester_stats)
        .fold((0.0, 0.0), |(credits, points), stats| {
            (credits + stats.total_credits, points + stats.total_points)
        });
    CalculationResult::from_totals(credits, points)
}

pub fn format_gpa(value: f64) -> String {
    format!("{:.2}", value)
}

/// One point of the per-semester GPA trend line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub name: String,
    pub gpa: f64,
}

pub fn trend(semesters: &[Semester]) -> Vec<TrendPoint> {
    semesters
        .iter()
        .map(|s| TrendPoint {
            name: s.name.clone(),
            gpa: (semester_stats(s).gpa * 100.0).round() / 100.0,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Standing {
    Excellent,
    Good,
    NeedsAttention,
}

impl Standing {
    pub fn from_gpa(gpa: f64) -> Self {
        if gpa >= 3.5 {
            Standing::Excellent
        } else if gpa >= 3.0 {
            Standing::Good
        } else {
            Standing::NeedsAttention
        }
    }
}
