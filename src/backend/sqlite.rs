//! SQLite backend storing each row as a JSON document.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::{Map, Value};

use crate::types::errors::BackendError;

use super::{merge_patch, not_found, prepare_record, record_id, Backend, BackendResult};

/// Backend keeping all tables in a single SQLite `records` table.
///
/// Filters run through `json_extract`, so any column of any table can be
/// used in an equality filter.
pub struct SqliteBackend {
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    /// Creates or opens the database at `db_path`.
    pub fn open(db_path: &Path) -> BackendResult<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path)?;
        Self::with_connection(conn)
    }

    /// Creates a backend on a private in-memory database.
    pub fn in_memory() -> BackendResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> BackendResult<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                table_name TEXT NOT NULL,
                id TEXT NOT NULL,
                data TEXT NOT NULL,
                UNIQUE(table_name, id)
            );

            CREATE INDEX IF NOT EXISTS idx_records_table ON records(table_name);
        "#,
        )?;

        tracing::debug!("SQLite backend ready");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn decode_rows(raw: Vec<String>) -> BackendResult<Vec<Value>> {
        raw.iter()
            .map(|data| serde_json::from_str(data).map_err(BackendError::from))
            .collect()
    }
}

/// JSON path of a top-level column.
fn json_path(column: &str) -> String {
    format!("$.\"{}\"", column.replace('"', "\\\""))
}

/// Maps a JSON scalar to the SQL value `json_extract` would return for it.
fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

#[async_trait]
impl Backend for SqliteBackend {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn select_all(&self, table: &str) -> BackendResult<Vec<Value>> {
        let raw = {
            let conn = self.conn();
            let mut stmt =
                conn.prepare("SELECT data FROM records WHERE table_name = ?1 ORDER BY seq")?;
            let rows = stmt.query_map(params![table], |row| row.get::<_, String>(0))?;
            let collected = rows.collect::<Result<Vec<_>, _>>()?;
            collected
        };

        Self::decode_rows(raw)
    }

    async fn select_eq(
        &self,
        table: &str,
        column: &str,
        value: &Value,
    ) -> BackendResult<Vec<Value>> {
        let raw = {
            let conn = self.conn();
            let mut stmt = conn.prepare(
                "SELECT data FROM records
                 WHERE table_name = ?1 AND json_extract(data, ?2) IS ?3
                 ORDER BY seq",
            )?;
            let rows = stmt.query_map(params![table, json_path(column), to_sql(value)], |row| {
                row.get::<_, String>(0)
            })?;
            let collected = rows.collect::<Result<Vec<_>, _>>()?;
            collected
        };

        tracing::debug!(table, column, rows = raw.len(), "SQLite select");
        Self::decode_rows(raw)
    }

    async fn insert_many(&self, table: &str, records: Vec<Value>) -> BackendResult<Vec<Value>> {
        let prepared = records
            .into_iter()
            .map(prepare_record)
            .collect::<BackendResult<Vec<_>>>()?;

        let mut conn = self.conn();
        let tx = conn.transaction()?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO records (table_name, id, data) VALUES (?1, ?2, ?3)")?;
            for record in &prepared {
                let id = record_id(record)?;
                let data = serde_json::to_string(record)?;
                stmt.execute(params![table, id, data])?;
            }
        }
        tx.commit()?;

        Ok(prepared.into_iter().map(Value::Object).collect())
    }

    async fn update_by_id(&self, table: &str, id: &str, patch: Value) -> BackendResult<Value> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let data: Option<String> = tx
            .query_row(
                "SELECT data FROM records WHERE table_name = ?1 AND id = ?2",
                params![table, id],
                |row| row.get(0),
            )
            .optional()?;
        let data = data.ok_or_else(|| not_found(table, id))?;

        let mut record: Map<String, Value> = serde_json::from_str(&data)?;
        merge_patch(&mut record, patch)?;

        tx.execute(
            "UPDATE records SET data = ?3 WHERE table_name = ?1 AND id = ?2",
            params![table, id, serde_json::to_string(&record)?],
        )?;
        tx.commit()?;

        Ok(Value::Object(record))
    }

    async fn delete_by_id(&self, table: &str, id: &str) -> BackendResult<()> {
        self.conn().execute(
            "DELETE FROM records WHERE table_name = ?1 AND id = ?2",
            params![table, id],
        )?;
        Ok(())
    }

    async fn delete_eq(&self, table: &str, column: &str, value: &Value) -> BackendResult<usize> {
        let deleted = self.conn().execute(
            "DELETE FROM records WHERE table_name = ?1 AND json_extract(data, ?2) IS ?3",
            params![table, json_path(column), to_sql(value)],
        )?;

        tracing::debug!(table, column, deleted, "SQLite delete");
        Ok(deleted)
    }
}
