//! # QMS
//!
//! Core of a hospital quality management dashboard.
//!
//! The dashboard screens (documents, incident reports, personnel roles,
//! quality indicators, the 83-criteria self-assessment) are CRUD over a
//! table-oriented backend. The logic that lives here is the hierarchical
//! scoring of self-assessment sheets and a TTL cache for lookup tables.
//!
//! ## Modules
//!
//! - [`assessment`] - Score aggregation of evaluation sheets
//! - [`cache`] - TTL cache for reference tables
//! - [`backend`] - Table backend and object storage
//! - [`repository`] - Typed per-table repositories
//! - [`context`] - Wiring of repositories from configuration
//! - [`cli`] - Command line interface
//! - [`types`] - Shared types

pub mod assessment;
pub mod backend;
pub mod cache;
#[cfg(feature = "cli")]
pub mod cli;
pub mod context;
pub mod repository;
pub mod types;

pub use context::QmsContext;
pub use types::config::Config;
pub use types::errors::{BackendError, QmsError, QmsResult};
