//! Target planner: solves for the grades upcoming courses need to reach a
//! target CGPA and keeps that requirement consistent while the user pins
//! individual courses.
//!
//! [`PlannerState`] is treated as immutable. Every user intent maps to a method
//! that returns the next state, and all redistribution goes through
//! [`distribution::recompute`].

pub mod distribution;
pub mod view;

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::gpa::CalculationResult;
use crate::models::{
    NewPlannedCourseRequest, PlannedCourse, UpdatePlannedCourseRequest,
    planner::DEFAULT_PLANNED_CREDITS,
};

pub use distribution::{RequiredGrade, TargetOutcome};
pub use view::{CellStatus, PlannedCourseView, PlannerView};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlanError {
    #[error("Planned course not found: {0}")]
    UnknownCourse(String),

    #[error("Calculate the required grades first")]
    NotCalculated,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannerState {
    pub target: String,
    pub courses: Vec<PlannedCourse>,
    pub locked: BTreeSet<String>,
    pub values: BTreeMap<String, RequiredGrade>,
    pub outcome: Option<TargetOutcome>,
}

impl Default for PlannerState {
    fn default() -> Self {
        Self {
            target: String::new(),
            courses: vec![
                PlannedCourse::new("", DEFAULT_PLANNED_CREDITS),
                PlannedCourse::new("", DEFAULT_PLANNED_CREDITS),
            ],
            locked: BTreeSet::new(),
            values: BTreeMap::new(),
            outcome: None,
        }
    }
}

impl PlannerState {
    pub fn target_value(&self) -> Option<f64> {
        distribution::parse_number(&self.target)
    }

    pub fn next_credits(&self) -> f64 {
        distribution::planned_credits(&self.courses)
    }

    pub fn is_calculated(&self) -> bool {
        self.outcome.is_some()
    }

    /// Whether a calculation can be attempted at all.
    pub fn is_ready(&self) -> bool {
        self.target_value().is_some() && !self.courses.is_empty()
    }

    fn course(&self, id: &str) -> Result<&PlannedCourse, PlanError> {
        self.courses
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| PlanError::UnknownCourse(id.to_string()))
    }

    /// Drops the solved breakdown and every lock; the plan shape is kept.
    pub fn invalidated(&self) -> Self {
        Self {
            target: self.target.clone(),
            courses: self.courses.clone(),
            ..Self::empty()
        }
    }

    fn empty() -> Self {
        Self {
            target: String::new(),
            courses: Vec::new(),
            locked: BTreeSet::new(),
            values: BTreeMap::new(),
            outcome: None,
        }
    }

    /// Changing the target keeps the current breakdown; the next
    /// redistribution picks the new value up.
    pub fn with_target(&self, target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..self.clone()
        }
    }

    pub fn with_course_added(&self, req: NewPlannedCourseRequest) -> Self {
        let mut next = self.invalidated();
        next.courses.push(PlannedCourse::new(
            req.name.unwrap_or_default(),
            req.credits.unwrap_or_else(|| DEFAULT_PLANNED_CREDITS.to_string()),
        ));
        next
    }

    pub fn with_course_updated(
        &self,
        id: &str,
        req: UpdatePlannedCourseRequest,
    ) -> Result<Self, PlanError> {
        self.course(id)?;
        let mut next = self.invalidated();
        if let Some(course) = next.courses.iter_mut().find(|c| c.id == id) {
            if let Some(name) = req.name {
                course.name = name;
            }
            if let Some(credits) = req.credits {
                course.credits = credits;
            }
        }
        Ok(next)
    }

    pub fn with_course_removed(&self, id: &str) -> Result<Self, PlanError> {
        self.course(id)?;
        let mut next = self.invalidated();
        next.courses.retain(|c| c.id != id);
        Ok(next)
    }

    /// Fresh solve: every course gets the same required average and all locks
    /// are released. A non-numeric target leaves the state as it is.
    pub fn calculate(&self, current: &CalculationResult) -> Self {
        let Some(target) = self.target_value() else {
            debug!("planner target {:?} is not numeric, skipping", self.target);
            return self.clone();
        };

        let next_credits = self.next_credits();
        let Some(required) = distribution::required_average(current, target, next_credits)
        else {
            return self.invalidated();
        };

        let outcome = TargetOutcome::classify(required);
        debug!(
            "planner solved: required average {:.4} over {} credits ({:?})",
            required, next_credits, outcome
        );

        let values = self
            .courses
            .iter()
            .map(|c| (c.id.clone(), RequiredGrade::auto(required)))
            .collect();

        Self {
            target: self.target.clone(),
            courses: self.courses.clone(),
            locked: BTreeSet::new(),
            values,
            outcome: Some(outcome),
        }
    }

    /// The user typed `text` into a course's required grade: pin it and spread
    /// the rest of the requirement over the unlocked courses.
    pub fn adjust_grade(
        &self,
        current: &CalculationResult,
        id: &str,
        text: &str,
    ) -> Result<Self, PlanError> {
        self.course(id)?;
        if !self.is_calculated() {
            return Err(PlanError::NotCalculated);
        }

        let mut locked = self.locked.clone();
        locked.insert(id.to_string());
        let mut values = self.values.clone();
        values.insert(id.to_string(), RequiredGrade::pinned(text));

        Ok(self.redistributed(current, locked, values))
    }

    /// Locking pins the course at its current value. Unlocking hands its share
    /// back to the auto-adjusting pool.
    pub fn toggle_lock(&self, current: &CalculationResult, id: &str) -> Result<Self, PlanError> {
        self.course(id)?;
        if !self.is_calculated() {
            return Err(PlanError::NotCalculated);
        }

        let mut locked = self.locked.clone();
        if locked.remove(id) {
            Ok(self.redistributed(current, locked, self.values.clone()))
        } else {
            locked.insert(id.to_string());
            Ok(Self {
                locked,
                ..self.clone()
            })
        }
    }

    fn redistributed(
        &self,
        current: &CalculationResult,
        locked: BTreeSet<String>,
        values: BTreeMap<String, RequiredGrade>,
    ) -> Self {
        let values =
            distribution::recompute(current, self.target_value(), &self.courses, &locked, &values);
        Self {
            locked,
            values,
            ..self.clone()
        }
    }

    pub fn view(&self, current: &CalculationResult) -> PlannerView {
        PlannerView::build(self, current)
    }
}
