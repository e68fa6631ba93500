use axum::Json;
use axum::extract::Path;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{patch, post, put};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use chrono::Utc;
use serde::Serialize;

use crate::error::AppError;
use crate::gpa::{self, CalculationResult, Standing, TrendPoint};
use crate::models::*;
use crate::planner::PlannerView;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SemesterSummary {
    pub id: String,
    pub name: String,
    pub course_count: usize,
    pub stats: CalculationResult,
    pub gpa: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub cumulative: CalculationResult,
    pub cgpa: String,
    pub standing: Standing,
    pub semesters: Vec<SemesterSummary>,
    pub trend: Vec<TrendPoint>,
    pub last_updated: String,
}

impl DashboardSummary {
    pub fn from_record(record: &AcademicRecord) -> Self {
        let cumulative = gpa::cumulative_stats(&record.semesters);
        let semesters = record
            .semesters
            .iter()
            .map(|s| {
                let stats = gpa::semester_stats(s);
                SemesterSummary {
                    id: s.id.clone(),
                    name: s.name.clone(),
                    course_count: s.courses.len(),
                    stats,
                    gpa: gpa::format_gpa(stats.gpa),
                }
            })
            .collect();

        Self {
            cumulative,
            cgpa: gpa::format_gpa(cumulative.gpa),
            standing: Standing::from_gpa(cumulative.gpa),
            semesters,
            trend: gpa::trend(&record.semesters),
            last_updated: record.last_updated.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub imported: bool,
}

#[derive(Debug, Serialize)]
pub struct InsightResponse {
    pub text: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/record", get(get_record).delete(clear_record))
        .route("/summary", get(summary))
        .route("/semesters", post(create_semester))
        .route(
            "/semesters/{id}",
            patch(update_semester).delete(delete_semester),
        )
        .route("/semesters/{id}/courses", post(create_course))
        .route(
            "/semesters/{id}/courses/{course_id}",
            patch(update_course).delete(delete_course),
        )
        .route("/export", get(export_record))
        .route("/import", post(import_record))
        .route("/insights", post(generate_insights))
        .route("/planner", get(get_planner))
        .route("/planner/target", put(set_planner_target))
        .route("/planner/courses", post(add_planned_course))
        .route(
            "/planner/courses/{id}",
            patch(update_planned_course).delete(remove_planned_course),
        )
        .route("/planner/calculate", post(calculate_plan))
        .route("/planner/courses/{id}/grade", put(adjust_planned_grade))
        .route("/planner/courses/{id}/lock", post(toggle_planned_lock))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

fn check_credits(credits: Option<f64>) -> Result<(), AppError> {
    match credits {
        Some(c) if !c.is_finite() || c < 0.0 => Err(AppError::BadRequest(
            "credits must be a non-negative number".to_string(),
        )),
        _ => Ok(()),
    }
}

async fn get_record(State(state): State<AppState>) -> Json<AcademicRecord> {
    Json(state.records.snapshot().await)
}

async fn clear_record(State(state): State<AppState>) -> Result<Json<AcademicRecord>, AppError> {
    let record = state.records.clear().await?;
    Ok(Json(record))
}

async fn summary(State(state): State<AppState>) -> Json<DashboardSummary> {
    let record = state.records.snapshot().await;
    Json(DashboardSummary::from_record(&record))
}

async fn create_semester(
    State(state): State<AppState>,
    Json(req): Json<NewSemesterRequest>,
) -> Json<Semester> {
    Json(state.records.add_semester(req).await)
}

async fn update_semester(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateSemesterRequest>,
) -> Result<Json<Semester>, AppError> {
    let semester = state.records.update_semester(&id, req).await?;
    Ok(Json(semester))
}

async fn delete_semester(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.records.delete_semester(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<NewCourseRequest>,
) -> Result<Json<Course>, AppError> {
    check_credits(req.credits)?;
    let course = state.records.add_course(&id, req).await?;
    Ok(Json(course))
}

async fn update_course(
    State(state): State<AppState>,
    Path((id, course_id)): Path<(String, String)>,
    Json(req): Json<UpdateCourseRequest>,
) -> Result<Json<Course>, AppError> {
    check_credits(req.credits)?;
    let course = state.records.update_course(&id, &course_id, req).await?;
    Ok(Json(course))
}

async fn delete_course(
    State(state): State<AppState>,
    Path((id, course_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    state.records.remove_course(&id, &course_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn export_record(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let body = state.records.export().await?;
    let filename = format!("gpa-backup-{}.json", Utc::now().format("%Y-%m-%d"));

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    ))
}

async fn import_record(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<ImportResponse>, AppError> {
    if body.trim().is_empty() || !state.records.import(&body).await {
        return Err(AppError::BadRequest("Invalid data format.".to_string()));
    }
    Ok(Json(ImportResponse { imported: true }))
}

async fn generate_insights(
    State(state): State<AppState>,
) -> Result<Json<InsightResponse>, AppError> {
    let record = state.records.snapshot().await;
    if record.is_empty() {
        return Err(AppError::BadRequest(
            "Add some course data first!".to_string(),
        ));
    }
    let text = state.insights.generate(&record).await?;
    Ok(Json(InsightResponse { text }))
}

async fn get_planner(State(state): State<AppState>) -> Json<PlannerView> {
    let records = state.records.lock().await;
    let current = records.stats();
    Json(state.planner.view(&current).await)
}

async fn set_planner_target(
    State(state): State<AppState>,
    Json(req): Json<SetTargetRequest>,
) -> Json<PlannerView> {
    let records = state.records.lock().await;
    let current = records.stats();
    Json(state.planner.set_target(&current, req.target).await)
}

async fn add_planned_course(
    State(state): State<AppState>,
    Json(req): Json<NewPlannedCourseRequest>,
) -> Json<PlannerView> {
    let records = state.records.lock().await;
    let current = records.stats();
    Json(state.planner.add_course(&current, req).await)
}

async fn update_planned_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePlannedCourseRequest>,
) -> Result<Json<PlannerView>, AppError> {
    let records = state.records.lock().await;
    let current = records.stats();
    let view = state.planner.update_course(&current, &id, req).await?;
    Ok(Json(view))
}

async fn remove_planned_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PlannerView>, AppError> {
    let records = state.records.lock().await;
    let current = records.stats();
    let view = state.planner.remove_course(&current, &id).await?;
    Ok(Json(view))
}

async fn calculate_plan(State(state): State<AppState>) -> Json<PlannerView> {
    let records = state.records.lock().await;
    let current = records.stats();
    Json(state.planner.calculate(&current).await)
}

async fn adjust_planned_grade(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AdjustGradeRequest>,
) -> Result<Json<PlannerView>, AppError> {
    let records = state.records.lock().await;
    let current = records.stats();
    let view = state.planner.adjust_grade(&current, &id, &req.value).await?;
    Ok(Json(view))
}

async fn toggle_planned_lock(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PlannerView>, AppError> {
    let records = state.records.lock().await;
    let current = records.stats();
    let view = state.planner.toggle_lock(&current, &id).await?;
    Ok(Json(view))
}
