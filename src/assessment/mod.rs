//! Self-assessment scoring.
//!
//! Turns flat per-sub-criterion evaluation rows into sheet summaries.
//! A sheet's score is the mean of its sections, a section the mean of
//! its chapters, a chapter the mean of its criteria, and a criterion the
//! highest level reached by its rows.
//!
//! ## Example
//!
//! ```rust
//! use qms::assessment::ScoreAggregator;
//! use qms::types::evaluation::EvaluationRow;
//!
//! let rows = vec![
//!     EvaluationRow::new("P-01", "A1.1-M1").with_path("A", "A1").with_level("Mức 1"),
//!     EvaluationRow::new("P-01", "A1.1-M3").with_path("A", "A1").with_level("Mức 3"),
//! ];
//!
//! let summaries = ScoreAggregator::summarize(&rows);
//! assert_eq!(summaries[0].score, 3.0);
//! ```

mod aggregator;
mod level;

pub use aggregator::{
    round_to, ChapterScore, CriterionScore, ScoreAggregator, ScoreBreakdown, SectionScore,
    DEFAULT_PRECISION, OTHER_BUCKET,
};
pub use level::{criterion_code, AchievedLevel};
