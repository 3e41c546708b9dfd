//! Table-oriented data backend.
//!
//! Every screen of the dashboard reads and writes through the same small
//! surface: equality-filtered select, single or bulk insert, update by id,
//! delete by id or by equality, and object upload. Records travel as JSON
//! objects; repositories turn them into typed rows.
//!
//! Implementations:
//! - [`MemoryBackend`] - in-process tables, used by tests and dry runs
//! - [`SqliteBackend`] - JSON documents in a local SQLite file (feature `sqlite`)
//! - [`LocalStorage`] - object storage on the local filesystem

mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;
mod storage;

pub use memory::MemoryBackend;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteBackend;
pub use storage::{LocalStorage, ObjectStorage, StoredObject};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};

use crate::types::errors::BackendError;

/// Result of a backend call.
pub type BackendResult<T> = Result<T, BackendError>;

/// A data backend exposing generic table operations.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Returns the backend name.
    fn name(&self) -> &str;

    /// Returns every row of `table` in insertion order.
    async fn select_all(&self, table: &str) -> BackendResult<Vec<Value>>;

    /// Returns the rows of `table` whose `column` equals `value`.
    async fn select_eq(&self, table: &str, column: &str, value: &Value)
        -> BackendResult<Vec<Value>>;

    /// Inserts one record and returns it as stored.
    async fn insert(&self, table: &str, record: Value) -> BackendResult<Value> {
        self.insert_many(table, vec![record])
            .await?
            .pop()
            .ok_or_else(|| BackendError::new("insert returned no row"))
    }

    /// Inserts several records in one request.
    ///
    /// Either every record is stored or none is.
    async fn insert_many(&self, table: &str, records: Vec<Value>) -> BackendResult<Vec<Value>>;

    /// Merges `patch` into the row with `id` and returns the updated row.
    async fn update_by_id(&self, table: &str, id: &str, patch: Value) -> BackendResult<Value>;

    /// Deletes the row with `id`. Deleting a missing row succeeds.
    async fn delete_by_id(&self, table: &str, id: &str) -> BackendResult<()>;

    /// Deletes every row whose `column` equals `value` in one request.
    ///
    /// Returns the number of deleted rows.
    async fn delete_eq(&self, table: &str, column: &str, value: &Value) -> BackendResult<usize>;
}

/// Validates a record before insert and fills `id` and `created_at` when absent.
pub fn prepare_record(record: Value) -> BackendResult<Map<String, Value>> {
    let Value::Object(mut map) = record else {
        return Err(BackendError::new("record must be a JSON object").with_code("invalid_record"));
    };

    let missing = |map: &Map<String, Value>, key: &str| map.get(key).map_or(true, Value::is_null);

    if missing(&map, "id") {
        map.insert(
            "id".to_string(),
            Value::String(uuid::Uuid::new_v4().to_string()),
        );
    }
    if missing(&map, "created_at") {
        map.insert(
            "created_at".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
    }

    Ok(map)
}

/// Extracts the string id of a record.
pub fn record_id(record: &Map<String, Value>) -> BackendResult<String> {
    match record.get("id") {
        Some(Value::String(id)) => Ok(id.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(BackendError::new("record has no id").with_code("invalid_record")),
    }
}

/// Applies `patch` on top of `record`. The id is never changed.
pub fn merge_patch(record: &mut Map<String, Value>, patch: Value) -> BackendResult<()> {
    let Value::Object(patch) = patch else {
        return Err(BackendError::new("patch must be a JSON object").with_code("invalid_record"));
    };

    for (key, value) in patch {
        if key != "id" {
            record.insert(key, value);
        }
    }

    Ok(())
}

/// Equality filter on a column; a missing column equals `null`.
pub fn column_eq(record: &Map<String, Value>, column: &str, value: &Value) -> bool {
    record.get(column).unwrap_or(&Value::Null) == value
}

/// Error for an update that matched no row.
pub(crate) fn not_found(table: &str, id: &str) -> BackendError {
    BackendError::new(format!("no row with id '{}' in '{}'", id, table)).with_code("not_found")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prepare_record_assigns_id_and_timestamp() {
        let map = prepare_record(json!({ "name": "Khoa Nội", "id": null })).unwrap();

        assert!(map["id"].as_str().is_some_and(|id| !id.is_empty()));
        assert!(map["created_at"].as_str().is_some());
        assert_eq!(map["name"], "Khoa Nội");
    }

    #[test]
    fn test_prepare_record_keeps_given_values() {
        let map = prepare_record(json!({ "id": "x1", "created_at": "2024-01-01T00:00:00Z" }))
            .unwrap();

        assert_eq!(map["id"], "x1");
        assert_eq!(map["created_at"], "2024-01-01T00:00:00Z");
    }

    #[test]
    fn test_prepare_record_rejects_non_objects() {
        let err = prepare_record(json!([1, 2])).unwrap_err();
        assert_eq!(err.code.as_deref(), Some("invalid_record"));
    }

    #[test]
    fn test_merge_patch_ignores_id() {
        let mut map = prepare_record(json!({ "id": "x1", "status": "open" })).unwrap();
        merge_patch(&mut map, json!({ "id": "other", "status": "closed" })).unwrap();

        assert_eq!(map["id"], "x1");
        assert_eq!(map["status"], "closed");
    }

    #[test]
    fn test_column_eq_treats_missing_as_null() {
        let map = prepare_record(json!({ "id": "x1" })).unwrap();

        assert!(column_eq(&map, "sheet_id", &Value::Null));
        assert!(!column_eq(&map, "id", &json!("x2")));
        assert!(column_eq(&map, "id", &json!("x1")));
    }
}
