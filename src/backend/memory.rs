//! In-process backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::types::errors::BackendError;

use super::{column_eq, merge_patch, not_found, prepare_record, record_id, Backend, BackendResult};

type Table = Vec<Map<String, Value>>;

/// Backend keeping every table in memory.
///
/// Can be told to fail every call, to exercise error paths.
#[derive(Default)]
pub struct MemoryBackend {
    tables: RwLock<HashMap<String, Table>>,
    failure: Mutex<Option<String>>,
    selects: AtomicUsize,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following call fail with `message`.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.lock().unwrap_or_else(|p| p.into_inner()) = Some(message.into());
    }

    /// Stops failing.
    pub fn recover(&self) {
        *self.failure.lock().unwrap_or_else(|p| p.into_inner()) = None;
    }

    /// Number of select calls served so far.
    pub fn select_count(&self) -> usize {
        self.selects.load(Ordering::Relaxed)
    }

    fn check(&self) -> BackendResult<()> {
        match self.failure.lock().unwrap_or_else(|p| p.into_inner()).as_ref() {
            Some(message) => Err(BackendError::new(message.clone()).with_code("injected")),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    async fn select_all(&self, table: &str) -> BackendResult<Vec<Value>> {
        self.check()?;
        self.selects.fetch_add(1, Ordering::Relaxed);

        let tables = self.tables.read().await;
        Ok(tables
            .get(table)
            .map(|rows| rows.iter().cloned().map(Value::Object).collect())
            .unwrap_or_default())
    }

    async fn select_eq(
        &self,
        table: &str,
        column: &str,
        value: &Value,
    ) -> BackendResult<Vec<Value>> {
        self.check()?;
        self.selects.fetch_add(1, Ordering::Relaxed);

        let tables = self.tables.read().await;
        Ok(tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| column_eq(row, column, value))
                    .cloned()
                    .map(Value::Object)
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert_many(&self, table: &str, records: Vec<Value>) -> BackendResult<Vec<Value>> {
        self.check()?;

        let prepared = records
            .into_iter()
            .map(prepare_record)
            .collect::<BackendResult<Vec<_>>>()?;

        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_string()).or_default();

        // Reject the whole batch on any duplicate id.
        let mut ids = Vec::with_capacity(prepared.len());
        for record in &prepared {
            let id = record_id(record)?;
            let taken = ids.contains(&id)
                || rows.iter().any(|row| record_id(row).is_ok_and(|r| r == id));
            if taken {
                return Err(BackendError::new(format!(
                    "duplicate key value violates unique constraint on '{}.id'",
                    table
                ))
                .with_code("unique_violation"));
            }
            ids.push(id);
        }

        rows.extend(prepared.iter().cloned());
        Ok(prepared.into_iter().map(Value::Object).collect())
    }

    async fn update_by_id(&self, table: &str, id: &str, patch: Value) -> BackendResult<Value> {
        self.check()?;

        let mut tables = self.tables.write().await;
        let row = tables
            .get_mut(table)
            .and_then(|rows| {
                rows.iter_mut()
                    .find(|row| record_id(row).is_ok_and(|r| r == id))
            })
            .ok_or_else(|| not_found(table, id))?;

        merge_patch(row, patch)?;
        Ok(Value::Object(row.clone()))
    }

    async fn delete_by_id(&self, table: &str, id: &str) -> BackendResult<()> {
        self.check()?;

        let mut tables = self.tables.write().await;
        if let Some(rows) = tables.get_mut(table) {
            rows.retain(|row| !record_id(row).is_ok_and(|r| r == id));
        }
        Ok(())
    }

    async fn delete_eq(&self, table: &str, column: &str, value: &Value) -> BackendResult<usize> {
        self.check()?;

        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(table) else {
            return Ok(0);
        };

        let before = rows.len();
        rows.retain(|row| !column_eq(row, column, value));
        Ok(before - rows.len())
    }
}
