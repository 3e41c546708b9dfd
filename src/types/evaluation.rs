//! Self-assessment evaluation types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::assessment::{criterion_code, AchievedLevel};

/// One assessment of a single sub-criterion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRow {
    /// Row id assigned by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Assessment sheet this row belongs to.
    #[serde(default)]
    pub sheet_id: Option<String>,

    /// Section ("Phần"), e.g. "A".
    #[serde(default)]
    pub section: Option<String>,

    /// Chapter ("Chương"), e.g. "A1".
    #[serde(default)]
    pub chapter: Option<String>,

    /// Composite sub-item code, e.g. "A1.1-M2-03".
    #[serde(default)]
    pub item_code: Option<String>,

    /// Free text achieved level, e.g. "Mức 2".
    #[serde(default)]
    pub achieved_level: Option<String>,

    #[serde(default)]
    pub passed: bool,

    #[serde(default)]
    pub evaluated_at: Option<NaiveDate>,

    #[serde(default)]
    pub evaluated_by: Option<String>,

    #[serde(default)]
    pub evaluated_unit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl EvaluationRow {
    /// Creates a row for a sheet and sub-item.
    pub fn new(sheet_id: impl Into<String>, item_code: impl Into<String>) -> Self {
        Self {
            sheet_id: Some(sheet_id.into()),
            item_code: Some(item_code.into()),
            ..Self::default()
        }
    }

    /// Sets section and chapter.
    pub fn with_path(mut self, section: impl Into<String>, chapter: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self.chapter = Some(chapter.into());
        self
    }

    /// Sets the achieved level text.
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.achieved_level = Some(level.into());
        self
    }

    /// Sets the passed flag.
    pub fn with_passed(mut self, passed: bool) -> Self {
        self.passed = passed;
        self
    }

    /// Sets evaluator, unit and evaluation date.
    pub fn with_evaluator(
        mut self,
        by: impl Into<String>,
        unit: impl Into<String>,
        at: NaiveDate,
    ) -> Self {
        self.evaluated_by = Some(by.into());
        self.evaluated_unit = Some(unit.into());
        self.evaluated_at = Some(at);
        self
    }

    /// Sets the creation timestamp.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Sheet id usable for grouping, exactly as stored. Empty ids count as missing.
    pub fn grouping_key(&self) -> Option<&str> {
        self.sheet_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Criterion code derived from the composite sub-item code.
    pub fn criterion_code(&self) -> Option<&str> {
        self.item_code
            .as_deref()
            .map(criterion_code)
            .filter(|code| !code.is_empty())
    }

    /// Parsed achieved level.
    pub fn level(&self) -> AchievedLevel {
        self.achieved_level
            .as_deref()
            .map(AchievedLevel::parse)
            .unwrap_or_default()
    }
}

/// Sheet-level summary computed from evaluation rows. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetSummary {
    pub sheet_id: String,

    pub evaluated_at: Option<NaiveDate>,

    pub evaluated_by: Option<String>,

    pub evaluated_unit: Option<String>,

    pub created_at: Option<DateTime<Utc>>,

    /// Number of rows in the sheet.
    pub total_criteria: usize,

    /// Number of rows marked as passed.
    pub passed_criteria: usize,

    /// Hierarchical average of achieved levels.
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sheet_id_has_no_grouping_key() {
        let mut row = EvaluationRow::new("", "A1.1");
        assert_eq!(row.grouping_key(), None);

        row.sheet_id = None;
        assert_eq!(row.grouping_key(), None);
    }

    #[test]
    fn test_grouping_key_is_not_trimmed() {
        let row = EvaluationRow::new(" P-01 ", "A1.1");
        assert_eq!(row.grouping_key(), Some(" P-01 "));
    }

    #[test]
    fn test_row_deserializes_with_missing_fields() {
        let row: EvaluationRow = serde_json::from_value(serde_json::json!({
            "sheet_id": "P-01",
            "item_code": "C2.1-M3-01",
            "achieved_level": "Mức 3",
            "created_at": "2024-03-01T08:00:00Z"
        }))
        .unwrap();

        assert!(!row.passed);
        assert_eq!(row.criterion_code(), Some("C2.1"));
        assert_eq!(row.level(), AchievedLevel::Level3);
        assert!(row.created_at.is_some());
        assert!(row.section.is_none());
    }
}
