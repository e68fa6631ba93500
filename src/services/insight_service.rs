use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{error, info, warn};

use crate::error::AppError;
use crate::gpa::{format_gpa, semester_stats};
use crate::insight::InsightClient;
use crate::models::AcademicRecord;

pub const MISSING_KEY_MESSAGE: &str =
    "API key is missing. Set GEMINI_API_KEY to enable AI academic insights.";
pub const FAILURE_MESSAGE: &str = "An error occurred while analyzing your data. Please check your internet connection or verify your API Key.";
pub const EMPTY_MESSAGE: &str = "Could not generate insights at this time.";

/// Produces advisor-style commentary on the record. Never fails outward:
/// every problem turns into one of the fixed messages above.
pub struct InsightService {
    client: Option<Arc<dyn InsightClient>>,
    in_flight: AtomicBool,
}

struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl InsightService {
    pub fn new(client: Option<Arc<dyn InsightClient>>) -> Self {
        Self {
            client,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn build_prompt(record: &AcademicRecord) -> String {
        let summaries = record
            .semesters
            .iter()
            .map(|s| {
                let courses = s
                    .courses
                    .iter()
                    .map(|c| format!("{}: {} ({} cr)", c.name, c.grade, c.credits))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "Semester: {}, GPA: {}, Courses: [{}]",
                    s.name,
                    format_gpa(semester_stats(s).gpa),
                    courses
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "You are an expert academic advisor. Analyze the following academic record for a university student.\n\
             Provide a brief, encouraging summary of their performance trend (CGPA).\n\
             Identify any specific weak areas if visible (low grades in specific types of courses).\n\
             Give 3 actionable tips to improve their GPA in the next semester.\n\
             \n\
             Data:\n\
             {}\n\
             \n\
             Keep the tone professional, motivating, and concise (under 200 words).",
            summaries
        )
    }

    /// Refuses to start while another request is still outstanding.
    pub async fn generate(&self, record: &AcademicRecord) -> Result<String, AppError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(AppError::Conflict(
                "An analysis is already in progress".to_string(),
            ));
        }
        let _guard = InFlight(&self.in_flight);

        Ok(self.generate_text(record).await)
    }

    async fn generate_text(&self, record: &AcademicRecord) -> String {
        let Some(client) = &self.client else {
            warn!("insight requested without an API key");
            return MISSING_KEY_MESSAGE.to_string();
        };

        let prompt = Self::build_prompt(record);
        match client.generate(&prompt).await {
            Ok(Some(text)) => {
                info!("insight generated ({} chars)", text.len());
                text
            }
            Ok(None) => {
                warn!("insight service returned no text");
                EMPTY_MESSAGE.to_string()
            }
            Err(e) => {
                error!("insight generation failed: {}", e);
                FAILURE_MESSAGE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::Notify;

    use crate::models::{NewCourseRequest, NewSemesterRequest, UpdateCourseRequest};

    struct FixedClient(Option<String>);

    #[async_trait]
    impl InsightClient for FixedClient {
        async fn generate(&self, _prompt: &str) -> Result<Option<String>, AppError> {
            Ok(self.0.clone())
        }
    }

    struct FailingClient;

    #[async_trait]
    impl InsightClient for FailingClient {
        async fn generate(&self, _prompt: &str) -> Result<Option<String>, AppError> {
            Err(AppError::Upstream("connection refused".to_string()))
        }
    }

    struct BlockingClient(Arc<Notify>);

    #[async_trait]
    impl InsightClient for BlockingClient {
        async fn generate(&self, _prompt: &str) -> Result<Option<String>, AppError> {
            self.0.notified().await;
            Ok(Some("done".to_string()))
        }
    }

    fn record() -> AcademicRecord {
        let mut record = AcademicRecord::new();
        let semester = record.add_semester(NewSemesterRequest {
            name: Some("Fall".to_string()),
        });
        let course = record
            .add_course(&semester.id, NewCourseRequest::default())
            .expect("Semester not found");
        record.update_course(
            &semester.id,
            &course.id,
            UpdateCourseRequest {
                name: Some("Physics".to_string()),
                credits: Some(3.0),
                grade: Some(3.7),
            },
        );
        record
            .add_course(
                &semester.id,
                NewCourseRequest {
                    name: Some("Lab".to_string()),
                    credits: Some(1.5),
                    grade: Some(4.0),
                },
            )
            .expect("Semester not found");
        record
    }

    #[test]
    fn test_prompt_lists_semesters_and_courses() {
        let prompt = InsightService::build_prompt(&record());

        assert!(prompt.contains("Semester: Fall, GPA: 3.80, Courses: [Physics: 3.7 (3 cr), Lab: 4 (1.5 cr)]"));
        assert!(prompt.starts_with("You are an expert academic advisor."));
        assert!(prompt.contains("under 200 words"));
    }

    #[tokio::test]
    async fn test_missing_client_returns_key_message() {
        let service = InsightService::disabled();
        let text = service.generate(&record()).await.expect("Expected text");
        assert_eq!(text, MISSING_KEY_MESSAGE);
    }

    #[tokio::test]
    async fn test_fallbacks_for_empty_and_failure() {
        let empty = InsightService::new(Some(Arc::new(FixedClient(None))));
        assert_eq!(
            empty.generate(&record()).await.expect("Expected text"),
            EMPTY_MESSAGE
        );

        let failing = InsightService::new(Some(Arc::new(FailingClient)));
        assert_eq!(
            failing.generate(&record()).await.expect("Expected text"),
            FAILURE_MESSAGE
        );
    }

    #[tokio::test]
    async fn test_returns_client_text() {
        let service = InsightService::new(Some(Arc::new(FixedClient(Some(
            "Solid upward trend.".to_string(),
        )))));
        let text = service.generate(&record()).await.expect("Expected text");
        assert_eq!(text, "Solid upward trend.");
        assert!(!service.is_in_flight());
    }

    #[tokio::test]
    async fn test_second_request_is_refused_while_in_flight() {
        let notify = Arc::new(Notify::new());
        let service = Arc::new(InsightService::new(Some(Arc::new(BlockingClient(
            notify.clone(),
        )))));

        let first = {
            let service = service.clone();
            tokio::spawn(async move { service.generate(&record()).await })
        };
        while !service.is_in_flight() {
            tokio::task::yield_now().await;
        }

        let second = service.generate(&record()).await;
        assert!(matches!(second, Err(AppError::Conflict(_))));

        notify.notify_one();
        let text = first
            .await
            .expect("Task panicked")
            .expect("Expected text");
        assert_eq!(text, "done");
        assert!(!service.is_in_flight());
    }
}
