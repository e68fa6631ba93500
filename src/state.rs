use std::sync::Arc;

use sqlx::SqlitePool;

use crate::insight::InsightClient;
use crate::services::{InsightService, PlannerService, RecordService, RecordStore};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub records: Arc<RecordService>,
    pub planner: Arc<PlannerService>,
    pub insights: Arc<InsightService>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        record_key: &str,
        insight_client: Option<Arc<dyn InsightClient>>,
    ) -> Self {
        let store = RecordStore::new(db.clone(), record_key);
        let planner = Arc::new(PlannerService::new());
        Self {
            db,
            records: Arc::new(RecordService::new(store, planner.clone())),
            planner,
            insights: Arc::new(InsightService::new(insight_client)),
        }
    }
}
