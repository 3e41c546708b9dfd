//! Shared types of QMS.

pub mod config;
pub mod errors;
pub mod evaluation;
pub mod records;
