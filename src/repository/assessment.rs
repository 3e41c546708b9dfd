//! Evaluation rows of the 83-criteria self-assessment.

use serde_json::Value;

use crate::assessment::{ScoreAggregator, ScoreBreakdown, DEFAULT_PRECISION};
use crate::backend::BackendResult;
use crate::types::evaluation::{EvaluationRow, SheetSummary};

use super::{decode, encode, SharedBackend};

/// Default table of evaluation rows.
pub const EVALUATION_TABLE: &str = "danh_gia_tieu_chi";

/// Reads and writes evaluation rows, and summarizes sheets.
///
/// Summaries are recomputed from a fresh fetch on every call.
#[derive(Clone)]
pub struct AssessmentRepository {
    backend: SharedBackend,
    table: String,
    precision: u32,
}

impl AssessmentRepository {
    /// Creates a repository over the default evaluation table.
    pub fn new(backend: SharedBackend) -> Self {
        Self {
            backend,
            table: EVALUATION_TABLE.to_string(),
            precision: DEFAULT_PRECISION,
        }
    }

    /// Uses another table name.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Uses another score precision.
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    /// Every evaluation row, unfiltered.
    pub async fn fetch_all_rows(&self) -> BackendResult<Vec<EvaluationRow>> {
        decode(self.backend.select_all(&self.table).await?)
    }

    /// Rows of one sheet.
    pub async fn fetch_rows_for_sheet(&self, sheet_id: &str) -> BackendResult<Vec<EvaluationRow>> {
        let rows = self
            .backend
            .select_eq(&self.table, "sheet_id", &Value::from(sheet_id))
            .await?;
        decode(rows)
    }

    /// Deletes every row of a sheet in one request.
    ///
    /// Returns the number of deleted rows.
    pub async fn delete_sheet(&self, sheet_id: &str) -> BackendResult<usize> {
        let deleted = self
            .backend
            .delete_eq(&self.table, "sheet_id", &Value::from(sheet_id))
            .await?;
        tracing::info!(sheet_id, deleted, "Assessment sheet deleted");
        Ok(deleted)
    }

    /// Stores the rows of a new sheet in one request.
    pub async fn insert_rows(&self, rows: &[EvaluationRow]) -> BackendResult<Vec<EvaluationRow>> {
        let encoded = rows.iter().map(encode).collect::<BackendResult<Vec<_>>>()?;
        let stored = self.backend.insert_many(&self.table, encoded).await?;
        tracing::info!(rows = stored.len(), "Evaluation rows stored");
        decode(stored)
    }

    /// Summaries of every sheet, newest first.
    pub async fn list_summaries(&self) -> BackendResult<Vec<SheetSummary>> {
        let rows = self.fetch_all_rows().await?;
        Ok(ScoreAggregator::summarize_with_precision(&rows, self.precision))
    }

    /// Rows and score tree of one sheet.
    pub async fn sheet_breakdown(
        &self,
        sheet_id: &str,
    ) -> BackendResult<(Vec<EvaluationRow>, ScoreBreakdown)> {
        let rows = self.fetch_rows_for_sheet(sheet_id).await?;
        let breakdown = ScoreAggregator::breakdown(&rows);
        Ok((rows, breakdown))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::backend::MemoryBackend;

    fn sheet(id: &str, levels: &[&str]) -> Vec<EvaluationRow> {
        levels
            .iter()
            .enumerate()
            .map(|(i, level)| {
                EvaluationRow::new(id, format!("A1.{}-01", i + 1))
                    .with_path("A", "A1")
                    .with_level(*level)
            })
            .collect()
    }

    #[tokio::test]
    async fn test_fetch_rows_for_sheet() {
        let repo = AssessmentRepository::new(Arc::new(MemoryBackend::new()));
        repo.insert_rows(&sheet("P1", &["Mức 1", "Mức 2"])).await.unwrap();
        repo.insert_rows(&sheet("P2", &["Mức 3"])).await.unwrap();

        let rows = repo.fetch_rows_for_sheet("P1").await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.sheet_id.as_deref() == Some("P1")));
        assert!(rows.iter().all(|r| r.id.is_some()));
    }

    #[tokio::test]
    async fn test_delete_sheet_removes_only_that_sheet() {
        let repo = AssessmentRepository::new(Arc::new(MemoryBackend::new()));
        repo.insert_rows(&sheet("P1", &["Mức 1", "Mức 2"])).await.unwrap();
        repo.insert_rows(&sheet("P2", &["Mức 3"])).await.unwrap();

        assert_eq!(repo.delete_sheet("P1").await.unwrap(), 2);

        let summaries = repo.list_summaries().await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].sheet_id, "P2");
    }

    #[tokio::test]
    async fn test_list_summaries_is_not_cached() {
        let backend = Arc::new(MemoryBackend::new());
        let repo = AssessmentRepository::new(backend.clone());
        repo.insert_rows(&sheet("P1", &["Mức 2"])).await.unwrap();

        repo.list_summaries().await.unwrap();
        repo.insert_rows(&sheet("P2", &["Mức 4"])).await.unwrap();
        let summaries = repo.list_summaries().await.unwrap();

        assert_eq!(summaries.len(), 2);
        assert_eq!(backend.select_count(), 2);
    }

    #[tokio::test]
    async fn test_summary_id_round_trips_through_point_queries() {
        let repo = AssessmentRepository::new(Arc::new(MemoryBackend::new()));
        repo.insert_rows(&sheet(" P1", &["Mức 2", "Mức 3"])).await.unwrap();

        let summaries = repo.list_summaries().await.unwrap();
        let id = summaries[0].sheet_id.clone();
        assert_eq!(id, " P1");

        assert_eq!(repo.fetch_rows_for_sheet(&id).await.unwrap().len(), 2);
        assert_eq!(repo.delete_sheet(&id).await.unwrap(), 2);
        assert!(repo.list_summaries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_backend_error_propagates() {
        let backend = Arc::new(MemoryBackend::new());
        let repo = AssessmentRepository::new(backend.clone());
        backend.fail_with("update or delete violates foreign key constraint");

        let err = repo.delete_sheet("P1").await.unwrap_err();
        assert_eq!(err.message, "update or delete violates foreign key constraint");

        assert!(repo.fetch_rows_for_sheet("P1").await.is_err());
    }
}
