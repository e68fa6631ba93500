use serde_json::Value;
use sqlx::SqlitePool;
use tracing::{debug, error, info, warn};

use crate::db::repository;
use crate::error::AppError;
use crate::models::AcademicRecord;

/// Durable home of the academic record: one JSON document under one key.
#[derive(Clone)]
pub struct RecordStore {
    db: SqlitePool,
    key: String,
}

impl RecordStore {
    pub fn new(db: SqlitePool, key: impl Into<String>) -> Self {
        Self {
            db,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Never fails: a missing, unreadable or malformed document yields a fresh
    /// empty record.
    pub async fn load(&self) -> AcademicRecord {
        let raw = match repository::fetch_value(&self.db, &self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("no stored record under {}, starting empty", self.key);
                return AcademicRecord::new();
            }
            Err(e) => {
                error!("Failed to load record from store: {}", e);
                return AcademicRecord::new();
            }
        };

        match serde_json::from_str::<AcademicRecord>(&raw) {
            Ok(record) => record,
            Err(e) => {
                warn!("Stored record under {} is malformed: {}", self.key, e);
                AcademicRecord::new()
            }
        }
    }

    pub async fn save(&self, record: &AcademicRecord) -> Result<(), AppError> {
        let json = serde_json::to_string(record)?;
        repository::put_value(&self.db, &self.key, &json).await?;
        debug!("saved record ({} semesters)", record.semesters.len());
        Ok(())
    }

    /// Pretty-printed copy of the last saved state.
    pub async fn export(&self) -> Result<String, AppError> {
        let record = self.load().await;
        Ok(serde_json::to_string_pretty(&record)?)
    }

    /// Accepts any JSON object with a list-typed `semesters` field whose entries
    /// fit the record shape, and replaces the stored document wholesale.
    pub async fn import(&self, json: &str) -> bool {
        let parsed: Value = match serde_json::from_str(json) {
            Ok(value) => value,
            Err(e) => {
                warn!("import rejected, not JSON: {}", e);
                return false;
            }
        };

        if !parsed.get("semesters").is_some_and(Value::is_array) {
            warn!("import rejected, missing semesters list");
            return false;
        }

        let record: AcademicRecord = match serde_json::from_value(parsed) {
            Ok(record) => record,
            Err(e) => {
                warn!("import rejected, unexpected record shape: {}", e);
                return false;
            }
        };

        match self.save(&record).await {
            Ok(()) => {
                info!("imported record with {} semesters", record.semesters.len());
                true
            }
            Err(e) => {
                error!("Failed to save imported record: {}", e);
                false
            }
        }
    }

    pub async fn clear(&self) -> Result<(), AppError> {
        repository::delete_value(&self.db, &self.key).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::tests::setup_test_db;
    use crate::models::{NewCourseRequest, NewSemesterRequest, UpdateCourseRequest};

    fn sample_record() -> AcademicRecord {
        let mut record = AcademicRecord::new();
        let semester = record.add_semester(NewSemesterRequest {
            name: Some("Fall 2025".to_string()),
        });
        let course = record
            .add_course(&semester.id, NewCourseRequest::default())
            .expect("Semester not found");
        record.update_course(
            &semester.id,
            &course.id,
            UpdateCourseRequest {
                name: Some("Linear Algebra".to_string()),
                credits: Some(4.0),
                grade: Some(3.7),
            },
        );
        record
    }

    #[tokio::test]
    async fn test_load_missing_key_returns_empty_record() {
        let store = RecordStore::new(setup_test_db().await, "record");

        let record = store.load().await;
        assert!(record.semesters.is_empty());
        assert!(!record.last_updated.is_empty());
    }

    #[tokio::test]
    async fn test_load_malformed_returns_empty_record() {
        let pool = setup_test_db().await;
        repository::put_value(&pool, "record", "{not json")
            .await
            .expect("Failed to put value");
        let store = RecordStore::new(pool, "record");

        assert!(store.load().await.semesters.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_twice_is_stable() {
        let store = RecordStore::new(setup_test_db().await, "record");
        let record = sample_record();
        store.save(&record).await.expect("Failed to save");

        let first = store.load().await;
        let second = store.load().await;
        assert_eq!(first, record);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_export_import_round_trip() {
        let store = RecordStore::new(setup_test_db().await, "record");
        let record = sample_record();
        store.save(&record).await.expect("Failed to save");

        let exported = store.export().await.expect("Failed to export");
        assert!(exported.contains("\n  \"semesters\""));
        assert!(exported.contains("lastUpdated"));

        assert!(store.import(&exported).await);
        assert_eq!(store.load().await, record);
    }

    #[tokio::test]
    async fn test_import_rejects_bad_shapes() {
        let store = RecordStore::new(setup_test_db().await, "record");
        let record = sample_record();
        store.save(&record).await.expect("Failed to save");

        assert!(!store.import("not json").await);
        assert!(!store.import(r#"{"semesters": {}}"#).await);
        assert!(!store.import(r#"{"terms": []}"#).await);
        assert!(!store.import(r#"[1, 2, 3]"#).await);
        assert!(
            !store
                .import(r#"{"semesters": [{"courses": [{"credits": "three"}]}]}"#)
                .await
        );

        assert_eq!(store.load().await, record);
    }

    #[tokio::test]
    async fn test_import_overwrites_wholesale() {
        let store = RecordStore::new(setup_test_db().await, "record");
        store.save(&sample_record()).await.expect("Failed to save");

        let json = r#"{
            "semesters": [{"id": "s1", "name": "Imported", "courses": [], "isLocked": true}],
            "lastUpdated": "2025-01-01T00:00:00+00:00"
        }"#;
        assert!(store.import(json).await);

        let record = store.load().await;
        assert_eq!(record.semesters.len(), 1);
        assert_eq!(record.semesters[0].name, "Imported");
        assert_eq!(record.semesters[0].is_locked, Some(true));
        assert_eq!(record.last_updated, "2025-01-01T00:00:00+00:00");
    }

    #[tokio::test]
    async fn test_clear_removes_document() {
        let store = RecordStore::new(setup_test_db().await, "record");
        store.save(&sample_record()).await.expect("Failed to save");

        store.clear().await.expect("Failed to clear");
        assert!(store.load().await.semesters.is_empty());
    }
}
