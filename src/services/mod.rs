pub mod insight_service;
pub mod planner_service;
pub mod record_service;
pub mod record_store;

pub use insight_service::InsightService;
pub use planner_service::PlannerService;
pub use record_service::RecordService;
pub use record_store::RecordStore;
