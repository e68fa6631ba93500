use serde::Serialize;

use super::{PlannerState, TargetOutcome};
use crate::gpa::{CalculationResult, format_gpa};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellStatus {
    /// The required value is above the top of the grade scale.
    NotPossible,
    Fixed,
    Auto,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedCourseView {
    pub id: String,
    pub name: String,
    pub label: String,
    pub credits: String,
    pub required: Option<String>,
    pub locked: bool,
    pub status: Option<CellStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultView {
    #[serde(flatten)]
    pub outcome: TargetOutcome,
    pub display: String,
}

/// What a client needs to draw the planner.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerView {
    pub target: String,
    pub ready: bool,
    pub current_cgpa: String,
    pub planned_credits: f64,
    pub result: Option<ResultView>,
    pub courses: Vec<PlannedCourseView>,
}

impl PlannerView {
    pub fn build(state: &PlannerState, current: &CalculationResult) -> Self {
        let courses = state
            .courses
            .iter()
            .enumerate()
            .map(|(index, course)| {
                let cell = state.values.get(&course.id);
                let locked = state.locked.contains(&course.id);
                let status = cell.map(|grade| {
                    if grade.exceeds_scale() {
                        CellStatus::NotPossible
                    } else if locked {
                        CellStatus::Fixed
                    } else {
                        CellStatus::Auto
                    }
                });

                PlannedCourseView {
                    id: course.id.clone(),
                    name: course.name.clone(),
                    label: course.label(index),
                    credits: course.credits.clone(),
                    required: cell.map(|grade| grade.display.clone()),
                    locked,
                    status,
                }
            })
            .collect();

        Self {
            target: state.target.clone(),
            ready: state.is_ready(),
            current_cgpa: format_gpa(current.gpa),
            planned_credits: state.next_credits(),
            result: state.outcome.map(|outcome| ResultView {
                outcome,
                display: outcome.display(),
            }),
            courses,
        }
    }
}
