//! Generic CRUD over one table.

use std::marker::PhantomData;

use serde_json::Value;

use crate::backend::BackendResult;

use super::{decode, encode, Record, SharedBackend};

/// CRUD repository for a [`Record`] type.
pub struct TableRepository<T> {
    backend: SharedBackend,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for TableRepository<T> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: Record> TableRepository<T> {
    /// Creates a repository over `backend`.
    pub fn new(backend: SharedBackend) -> Self {
        Self {
            backend,
            _record: PhantomData,
        }
    }

    /// Every row of the table.
    pub async fn list(&self) -> BackendResult<Vec<T>> {
        decode(self.backend.select_all(T::TABLE).await?)
    }

    /// Rows whose `column` equals `value`.
    pub async fn find_by(&self, column: &str, value: impl Into<Value>) -> BackendResult<Vec<T>> {
        let value = value.into();
        decode(self.backend.select_eq(T::TABLE, column, &value).await?)
    }

    /// Row with `id`, if any.
    pub async fn get(&self, id: &str) -> BackendResult<Option<T>> {
        Ok(self.find_by("id", id).await?.into_iter().next())
    }

    /// Inserts `record` and returns it with its backend-assigned fields.
    pub async fn create(&self, record: &T) -> BackendResult<T> {
        let stored = self.backend.insert(T::TABLE, encode(record)?).await?;
        tracing::info!(table = T::TABLE, "Row created");
        Ok(serde_json::from_value(stored)?)
    }

    /// Inserts several records in one request.
    pub async fn create_many(&self, records: &[T]) -> BackendResult<Vec<T>> {
        let encoded = records.iter().map(encode).collect::<BackendResult<Vec<_>>>()?;
        let stored = self.backend.insert_many(T::TABLE, encoded).await?;
        tracing::info!(table = T::TABLE, rows = stored.len(), "Rows created");
        decode(stored)
    }

    /// Merges `patch` into the row with `id`.
    pub async fn update(&self, id: &str, patch: Value) -> BackendResult<T> {
        let stored = self.backend.update_by_id(T::TABLE, id, patch).await?;
        tracing::info!(table = T::TABLE, id, "Row updated");
        Ok(serde_json::from_value(stored)?)
    }

    /// Deletes the row with `id`.
    pub async fn delete(&self, id: &str) -> BackendResult<()> {
        self.backend.delete_by_id(T::TABLE, id).await?;
        tracing::info!(table = T::TABLE, id, "Row deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::NaiveDate;
    use serde_json::json;

    use crate::backend::MemoryBackend;
    use crate::types::records::{IncidentReport, IncidentStatus, PersonnelRole, Severity};

    fn incident(department: &str, severity: Severity) -> IncidentReport {
        IncidentReport {
            id: None,
            occurred_at: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            department: department.to_string(),
            description: "Nhầm thuốc".to_string(),
            severity,
            status: IncidentStatus::Reported,
            reporter: None,
            corrective_action: None,
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id() {
        let repo = TableRepository::<IncidentReport>::new(Arc::new(MemoryBackend::new()));

        let created = repo.create(&incident("Khoa Nội", Severity::Mild)).await.unwrap();

        assert!(created.id.is_some());
        assert!(created.created_at.is_some());
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_find_by_enum_column() {
        let repo = TableRepository::<IncidentReport>::new(Arc::new(MemoryBackend::new()));
        repo.create_many(&[
            incident("Khoa Nội", Severity::Severe),
            incident("Khoa Ngoại", Severity::Mild),
            incident("Khoa Nhi", Severity::Severe),
        ])
        .await
        .unwrap();

        let severe = repo.find_by("severity", "severe").await.unwrap();
        assert_eq!(severe.len(), 2);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let repo = TableRepository::<IncidentReport>::new(Arc::new(MemoryBackend::new()));
        let created = repo.create(&incident("Khoa Nội", Severity::Moderate)).await.unwrap();
        let id = created.id.clone().unwrap();

        let updated = repo
            .update(&id, json!({ "status": "resolved", "corrective_action": "Đào tạo lại" }))
            .await
            .unwrap();
        assert_eq!(updated.status, IncidentStatus::Resolved);

        repo.delete(&id).await.unwrap();
        assert!(repo.get(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_backend_error_is_passed_through() {
        let backend = Arc::new(MemoryBackend::new());
        let repo = TableRepository::<PersonnelRole>::new(backend.clone());
        backend.fail_with("JWT expired");

        let err = repo.list().await.unwrap_err();
        assert_eq!(err.message, "JWT expired");
    }
}
