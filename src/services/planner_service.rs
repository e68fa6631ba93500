use tokio::sync::Mutex;
use tracing::info;

use crate::error::AppError;
use crate::gpa::CalculationResult;
use crate::models::{NewPlannedCourseRequest, UpdatePlannedCourseRequest};
use crate::planner::{PlannerState, PlannerView};

/// Holds the single ephemeral planning session. Every intent swaps in the next
/// immutable [`PlannerState`].
#[derive(Default)]
pub struct PlannerService {
    state: Mutex<PlannerState>,
}

impl PlannerService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn state(&self) -> PlannerState {
        self.state.lock().await.clone()
    }

    pub async fn view(&self, current: &CalculationResult) -> PlannerView {
        self.state.lock().await.view(current)
    }

    async fn transition(
        &self,
        current: &CalculationResult,
        f: impl FnOnce(&PlannerState) -> Result<PlannerState, AppError>,
    ) -> Result<PlannerView, AppError> {
        let mut state = self.state.lock().await;
        let next = f(&*state)?;
        *state = next;
        Ok(state.view(current))
    }

    pub async fn set_target(&self, current: &CalculationResult, target: String) -> PlannerView {
        let mut state = self.state.lock().await;
        *state = state.with_target(target);
        state.view(current)
    }

    pub async fn add_course(
        &self,
        current: &CalculationResult,
        req: NewPlannedCourseRequest,
    ) -> PlannerView {
        let mut state = self.state.lock().await;
        *state = state.with_course_added(req);
        state.view(current)
    }

    pub async fn update_course(
        &self,
        current: &CalculationResult,
        id: &str,
        req: UpdatePlannedCourseRequest,
    ) -> Result<PlannerView, AppError> {
        self.transition(current, |s| Ok(s.with_course_updated(id, req)?))
            .await
    }

    pub async fn remove_course(
        &self,
        current: &CalculationResult,
        id: &str,
    ) -> Result<PlannerView, AppError> {
        self.transition(current, |s| Ok(s.with_course_removed(id)?)).await
    }

    pub async fn calculate(&self, current: &CalculationResult) -> PlannerView {
        let mut state = self.state.lock().await;
        *state = state.calculate(current);
        if let Some(outcome) = state.outcome {
            info!("target {} needs {}", state.target, outcome.display());
        }
        state.view(current)
    }

    pub async fn adjust_grade(
        &self,
        current: &CalculationResult,
        id: &str,
        value: &str,
    ) -> Result<PlannerView, AppError> {
        self.transition(current, |s| Ok(s.adjust_grade(current, id, value)?))
            .await
    }

    pub async fn toggle_lock(
        &self,
        current: &CalculationResult,
        id: &str,
    ) -> Result<PlannerView, AppError> {
        self.transition(current, |s| Ok(s.toggle_lock(current, id)?))
            .await
    }

    /// Called whenever the underlying record changes shape.
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        if state.is_calculated() {
            *state = state.invalidated();
        }
    }
}
