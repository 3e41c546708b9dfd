//! Rows of the dashboard's CRUD tables.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Quality document (procedure, regulation, form).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Document code, e.g. "QT.01.QLCL".
    pub code: String,

    pub title: String,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub issued_at: Option<NaiveDate>,

    /// Owning department.
    #[serde(default)]
    pub department: Option<String>,

    /// Public URL of the attached file.
    #[serde(default)]
    pub file_url: Option<String>,

    /// Storage path of the attached file.
    #[serde(default)]
    pub file_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Incident severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Caught before reaching the patient.
    NearMiss,
    #[default]
    Mild,
    Moderate,
    Severe,
}

/// Handling state of an incident report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    #[default]
    Reported,
    Analyzing,
    Resolved,
}

/// Medical incident report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub occurred_at: NaiveDate,

    pub department: String,

    pub description: String,

    #[serde(default)]
    pub severity: Severity,

    #[serde(default)]
    pub status: IncidentStatus,

    #[serde(default)]
    pub reporter: Option<String>,

    #[serde(default)]
    pub corrective_action: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Staff member with a role in the quality network.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonnelRole {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub full_name: String,

    #[serde(default)]
    pub position: Option<String>,

    #[serde(default)]
    pub department: Option<String>,

    /// Role in the quality network, e.g. "Thành viên mạng lưới".
    #[serde(default)]
    pub quality_role: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Quality indicator measured per period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityIndicator {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub code: String,

    pub name: String,

    /// Indicator group code.
    #[serde(default)]
    pub group: Option<String>,

    /// Reporting period, e.g. "2024-Q1".
    #[serde(default)]
    pub period: Option<String>,

    #[serde(default)]
    pub department: Option<String>,

    #[serde(default)]
    pub target: Option<f64>,

    #[serde(default)]
    pub actual: Option<f64>,

    /// Whether a lower value is better (e.g. infection rate).
    #[serde(default)]
    pub lower_is_better: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl QualityIndicator {
    /// Whether the measured value reaches the target. `None` until both are known.
    pub fn meets_target(&self) -> Option<bool> {
        let (target, actual) = (self.target?, self.actual?);
        Some(if self.lower_is_better {
            actual <= target
        } else {
            actual >= target
        })
    }
}

/// Entry of a reference table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub code: String,

    pub name: String,

    #[serde(default)]
    pub parent_code: Option<String>,
}

impl LookupItem {
    /// Creates an item.
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: None,
            code: code.into(),
            name: name.into(),
            parent_code: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meets_target() {
        let mut indicator = QualityIndicator {
            code: "CS05".to_string(),
            name: "Tỷ lệ nhiễm khuẩn vết mổ".to_string(),
            target: Some(2.0),
            actual: Some(1.5),
            lower_is_better: true,
            ..Default::default()
        };
        assert_eq!(indicator.meets_target(), Some(true));

        indicator.lower_is_better = false;
        assert_eq!(indicator.meets_target(), Some(false));

        indicator.actual = None;
        assert_eq!(indicator.meets_target(), None);
    }

    #[test]
    fn test_incident_defaults() {
        let report: IncidentReport = serde_json::from_value(serde_json::json!({
            "occurred_at": "2024-04-01",
            "department": "Khoa Cấp cứu",
            "description": "Bệnh nhân té ngã"
        }))
        .unwrap();

        assert_eq!(report.severity, Severity::Mild);
        assert_eq!(report.status, IncidentStatus::Reported);
    }
}
