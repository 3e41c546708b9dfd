//! Per-table repositories.
//!
//! Thin glue between typed rows and a [`Backend`]. Backend errors are
//! returned untouched; the only work done here is (de)serialization.
//!
//! - [`AssessmentRepository`] - evaluation rows and sheet summaries
//! - [`TableRepository`] - generic CRUD for documents, incidents, personnel, indicators
//! - [`DocumentRepository`] - documents with an attached uploaded file
//! - [`LookupRepository`] - reference tables read through the TTL cache

mod assessment;
mod documents;
mod lookup;
mod table;

pub use assessment::AssessmentRepository;
pub use documents::DocumentRepository;
pub use lookup::{LookupRepository, LookupTable};
pub use table::TableRepository;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::backend::{Backend, BackendResult};
use crate::types::records::{Document, IncidentReport, PersonnelRole, QualityIndicator};

/// A typed row stored in a backend table.
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    /// Backend table name.
    const TABLE: &'static str;
}

impl Record for Document {
    const TABLE: &'static str = "tai_lieu";
}

impl Record for IncidentReport {
    const TABLE: &'static str = "su_co";
}

impl Record for PersonnelRole {
    const TABLE: &'static str = "nhan_su";
}

impl Record for QualityIndicator {
    const TABLE: &'static str = "chi_so";
}

/// Decodes backend rows into typed values.
pub(crate) fn decode<T: DeserializeOwned>(rows: Vec<Value>) -> BackendResult<Vec<T>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(Into::into))
        .collect()
}

/// Encodes a typed value into a backend record.
pub(crate) fn encode<T: Serialize>(value: &T) -> BackendResult<Value> {
    serde_json::to_value(value).map_err(Into::into)
}

/// Convenience alias for a shared backend handle.
pub type SharedBackend = std::sync::Arc<dyn Backend>;
