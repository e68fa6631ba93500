use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info};

use crate::error::AppError;
use crate::gpa::{self, CalculationResult};
use crate::models::{
    AcademicRecord, Course, NewCourseRequest, NewSemesterRequest, Semester, UpdateCourseRequest,
    UpdateSemesterRequest,
};
use crate::services::planner_service::PlannerService;
use crate::services::record_store::RecordStore;

struct Session {
    record: AcademicRecord,
    hydrated: bool,
}

/// Owns the in-memory record. Each mutation and its autosave run under one
/// lock; nothing is written back until [`RecordService::hydrate`] has run, so
/// an empty default can never overwrite stored data.
///
/// Lock order is always record, then planner: a mutation that moves the
/// cumulative totals invalidates the plan before the record is released.
pub struct RecordService {
    store: RecordStore,
    planner: Arc<PlannerService>,
    session: Mutex<Session>,
}

/// Read access to the record, held for as long as the guard lives.
pub struct RecordGuard<'a> {
    session: MutexGuard<'a, Session>,
}

impl RecordGuard<'_> {
    pub fn record(&self) -> &AcademicRecord {
        &self.session.record
    }

    pub fn stats(&self) -> CalculationResult {
        gpa::cumulative_stats(&self.session.record.semesters)
    }
}

impl RecordService {
    pub fn new(store: RecordStore, planner: Arc<PlannerService>) -> Self {
        Self {
            store,
            planner,
            session: Mutex::new(Session {
                record: AcademicRecord::new(),
                hydrated: false,
            }),
        }
    }

    pub async fn hydrate(&self) -> AcademicRecord {
        let mut session = self.session.lock().await;
        session.record = self.store.load().await;
        session.hydrated = true;
        info!(
            "record hydrated from {} ({} semesters)",
            self.store.key(),
            session.record.semesters.len()
        );
        session.record.clone()
    }

    pub async fn is_hydrated(&self) -> bool {
        self.session.lock().await.hydrated
    }

    /// Blocks every mutation until the guard is dropped, so planner work
    /// done while holding it sees totals that cannot go stale.
    pub async fn lock(&self) -> RecordGuard<'_> {
        RecordGuard {
            session: self.session.lock().await,
        }
    }

    pub async fn snapshot(&self) -> AcademicRecord {
        self.lock().await.record().clone()
    }

    pub async fn stats(&self) -> CalculationResult {
        self.lock().await.stats()
    }

    async fn mutate<T>(&self, f: impl FnOnce(&mut AcademicRecord) -> T) -> T {
        let mut session = self.session.lock().await;
        let before = gpa::cumulative_stats(&session.record.semesters);
        let out = f(&mut session.record);
        if session.hydrated {
            if let Err(e) = self.store.save(&session.record).await {
                error!("Failed to save record: {}", e);
            }
        } else {
            debug!("record not hydrated yet, skipping save");
        }
        if gpa::cumulative_stats(&session.record.semesters) != before {
            self.planner.invalidate().await;
        }
        out
    }

    pub async fn add_semester(&self, req: NewSemesterRequest) -> Semester {
        self.mutate(|record| record.add_semester(req)).await
    }

    pub async fn update_semester(
        &self,
        id: &str,
        req: UpdateSemesterRequest,
    ) -> Result<Semester, AppError> {
        self.mutate(|record| record.update_semester(id, req))
            .await
            .ok_or(AppError::NotFound)
    }

    pub async fn delete_semester(&self, id: &str) -> Result<(), AppError> {
        if self.mutate(|record| record.delete_semester(id)).await {
            Ok(())
        } else {
            Err(AppError::NotFound)
        }
    }

    pub async fn add_course(
        &self,
        semester_id: &str,
        req: NewCourseRequest,
    ) -> Result<Course, AppError> {
        self.mutate(|record| record.add_course(semester_id, req))
            .await
            .ok_or(AppError::NotFound)
    }

    pub async fn update_course(
        &self,
        semester_id: &str,
        course_id: &str,
        req: UpdateCourseRequest,
    ) -> Result<Course, AppError> {
        self.mutate(|record| record.update_course(semester_id, course_id, req))
            .await
            .ok_or(AppError::NotFound)
    }

    pub async fn remove_course(&self, semester_id: &str, course_id: &str) -> Result<(), AppError> {
        if self.mutate(|record| record.remove_course(semester_id, course_id)).await {
            Ok(())
        } else {
            Err(AppError::NotFound)
        }
    }

    pub async fn export(&self) -> Result<String, AppError> {
        self.store.export().await
    }

    /// On success the in-memory record is re-read from the store and any
    /// calculated plan is dropped.
    pub async fn import(&self, json: &str) -> bool {
        let mut session = self.session.lock().await;
        if !self.store.import(json).await {
            return false;
        }
        session.record = self.store.load().await;
        session.hydrated = true;
        self.planner.invalidate().await;
        true
    }

    pub async fn clear(&self) -> Result<AcademicRecord, AppError> {
        let mut session = self.session.lock().await;
        self.store.clear().await?;
        session.record = AcademicRecord::new();
        if session.hydrated {
            self.store.save(&session.record).await?;
        }
        self.planner.invalidate().await;
        info!("record cleared");
        Ok(session.record.clone())
    }
}
