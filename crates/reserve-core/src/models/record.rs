//! Payroll reserve record model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{Line, UserId};

/// Stable record identifier.
///
/// New ids are UUID v7 strings; ids written by other clients are kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Create a new unique record ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Marketing progress of a record.
///
/// Same wire labels as [`Line`]: the shared document's own, with upper-case
/// names accepted on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RecordStatus {
    #[default]
    #[serde(rename = "跟进中", alias = "FOLLOWING")]
    Following,
    #[serde(rename = "已落地", alias = "COMPLETED")]
    Completed,
    #[serde(rename = "无法落地", alias = "FAILED")]
    Failed,
}

impl RecordStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Following => "Following",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RecordStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "following" => Ok(Self::Following),
            "completed" | "landed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(format!(
                "unknown status '{other}' (expected following, completed, or failed)"
            )),
        }
    }
}

/// One change-log line, stored newest-first on the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub date: String,
    pub updated_by_name: String,
    pub change_summary: String,
}

impl HistoryEntry {
    pub fn now(actor_name: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            date: Utc::now().to_rfc3339(),
            updated_by_name: actor_name.into(),
            change_summary: summary.into(),
        }
    }
}

/// A tracked payroll-acquisition lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: RecordId,
    pub company_name: String,
    #[serde(default)]
    pub total_employees: u32,
    #[serde(default)]
    pub estimated_new_payroll: u32,
    #[serde(default)]
    pub estimated_landing_date: String,
    #[serde(default)]
    pub cards_issued: u32,
    #[serde(default)]
    pub card_schedule: String,
    #[serde(default)]
    pub last_visit_date: String,
    /// Landing probability, 0..=100
    #[serde(default)]
    pub probability: u8,
    #[serde(default)]
    pub progress_notes: String,
    /// Last mutation time; decides record merge conflicts
    pub updated_at: DateTime<Utc>,
    pub updated_by_user_id: UserId,
    pub updated_by_name: String,
    pub department: String,
    pub line: Line,
    #[serde(default)]
    pub status: RecordStatus,
    /// Newest-first change log
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl Record {
    /// The estimated landing day, if the stored value starts with an ISO date.
    pub fn landing_date(&self) -> Option<NaiveDate> {
        iso_day(&self.estimated_landing_date)
    }

    /// The last visit day, read the same way as [`Record::landing_date`].
    pub fn last_visit(&self) -> Option<NaiveDate> {
        iso_day(&self.last_visit_date)
    }

    /// Percentage of the estimated new payroll that already has cards issued.
    pub fn card_coverage(&self) -> f64 {
        if self.estimated_new_payroll == 0 {
            return 0.0;
        }
        f64::from(self.cards_issued) / f64::from(self.estimated_new_payroll) * 100.0
    }
}

/// Fields supplied when creating a record; identity and attribution are
/// assigned by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordDraft {
    pub company_name: String,
    pub total_employees: u32,
    pub estimated_new_payroll: u32,
    pub estimated_landing_date: String,
    pub cards_issued: u32,
    pub card_schedule: String,
    pub last_visit_date: String,
    pub probability: u8,
    pub progress_notes: String,
    pub status: RecordStatus,
}

impl RecordDraft {
    pub fn new(company_name: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            ..Self::default()
        }
    }
}

/// Partial update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPatch {
    pub company_name: Option<String>,
    pub total_employees: Option<u32>,
    pub estimated_new_payroll: Option<u32>,
    pub estimated_landing_date: Option<String>,
    pub cards_issued: Option<u32>,
    pub card_schedule: Option<String>,
    pub last_visit_date: Option<String>,
    pub probability: Option<u8>,
    pub progress_notes: Option<String>,
    pub status: Option<RecordStatus>,
    /// Reassign ownership to another user
    pub owner: Option<UserId>,
}

impl RecordPatch {
    /// Apply every field except ownership, which needs the owner's profile.
    pub fn apply_fields(&self, record: &mut Record) {
        if let Some(value) = &self.company_name {
            record.company_name.clone_from(value);
        }
        if let Some(value) = self.total_employees {
            record.total_employees = value;
        }
        if let Some(value) = self.estimated_new_payroll {
            record.estimated_new_payroll = value;
        }
        if let Some(value) = &self.estimated_landing_date {
            record.estimated_landing_date.clone_from(value);
        }
        if let Some(value) = self.cards_issued {
            record.cards_issued = value;
        }
        if let Some(value) = &self.card_schedule {
            record.card_schedule.clone_from(value);
        }
        if let Some(value) = &self.last_visit_date {
            record.last_visit_date.clone_from(value);
        }
        if let Some(value) = self.probability {
            record.probability = value;
        }
        if let Some(value) = &self.progress_notes {
            record.progress_notes.clone_from(value);
        }
        if let Some(value) = self.status {
            record.status = value;
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.company_name.is_none()
            && self.total_employees.is_none()
            && self.estimated_new_payroll.is_none()
            && self.estimated_landing_date.is_none()
            && self.cards_issued.is_none()
            && self.card_schedule.is_none()
            && self.last_visit_date.is_none()
            && self.probability.is_none()
            && self.progress_notes.is_none()
            && self.status.is_none()
            && self.owner.is_none()
    }
}

fn iso_day(value: &str) -> Option<NaiveDate> {
    let day = value.trim().get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_unique() {
        assert_ne!(RecordId::new(), RecordId::new());
    }

    #[test]
    fn test_record_parses_minimal_remote_payload() {
        let payload = r#"{
            "id": "r1",
            "companyName": "Harbor Seafood Processing",
            "estimatedNewPayroll": 180,
            "updatedAt": "2023-10-20T10:00:00.000Z",
            "updatedByUserId": "s_r1",
            "updatedByName": "Yang",
            "department": "Retail One",
            "line": "零售",
            "status": "已落地"
        }"#;

        let record: Record = serde_json::from_str(payload).unwrap();
        assert_eq!(record.id.as_str(), "r1");
        assert_eq!(record.line, Line::Retail);
        assert_eq!(record.status, RecordStatus::Completed);
        assert!(record.history.is_empty());
        assert_eq!(record.total_employees, 0);
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let payload = r#"{
            "id": "r2",
            "companyName": "East Tech Park",
            "updatedAt": "2023-10-20T10:00:00Z",
            "updatedByUserId": "s_c1",
            "updatedByName": "Liu",
            "department": "Corporate One",
            "line": "CORPORATE"
        }"#;
        let record: Record = serde_json::from_str(payload).unwrap();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["companyName"], "East Tech Park");
        assert_eq!(value["status"], "跟进中");
        assert_eq!(value["line"], "公司");
        assert!(value.get("updated_at").is_none());
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!(
            "completed".parse::<RecordStatus>().unwrap(),
            RecordStatus::Completed
        );
        assert!("paused".parse::<RecordStatus>().is_err());
    }

    #[test]
    fn test_patch_apply_fields_leaves_unset_fields() {
        let mut record: Record = serde_json::from_str(
            r#"{
                "id": "r3",
                "companyName": "Club",
                "estimatedNewPayroll": 50,
                "probability": 30,
                "updatedAt": "2023-11-01T14:30:00Z",
                "updatedByUserId": "s_p3",
                "updatedByName": "Zhao",
                "department": "Private Banking",
                "line": "PERSONAL"
            }"#,
        )
        .unwrap();

        let patch = RecordPatch {
            probability: Some(60),
            ..RecordPatch::default()
        };
        assert!(!patch.is_empty());
        patch.apply_fields(&mut record);

        assert_eq!(record.probability, 60);
        assert_eq!(record.estimated_new_payroll, 50);
        assert_eq!(record.company_name, "Club");
    }

    #[test]
    fn test_landing_date_reads_date_prefix() {
        let mut record: Record = serde_json::from_str(
            r#"{
                "id": "r5",
                "companyName": "Fishery",
                "estimatedLandingDate": "2024-06-01T00:00:00.000Z",
                "updatedAt": "2023-11-10T00:00:00Z",
                "updatedByUserId": "s_c1",
                "updatedByName": "Liu",
                "department": "Corporate One",
                "line": "公司"
            }"#,
        )
        .unwrap();
        assert_eq!(record.landing_date(), NaiveDate::from_ymd_opt(2024, 6, 1));

        record.estimated_landing_date = "soon".to_string();
        assert_eq!(record.landing_date(), None);
        record.estimated_landing_date.clear();
        assert_eq!(record.landing_date(), None);

        record.last_visit_date = "2024-05-20".to_string();
        assert_eq!(record.last_visit(), NaiveDate::from_ymd_opt(2024, 5, 20));
    }

    #[test]
    fn test_card_coverage() {
        let mut record: Record = serde_json::from_str(
            r#"{
                "id": "r4",
                "companyName": "Fishery",
                "estimatedNewPayroll": 200,
                "cardsIssued": 50,
                "updatedAt": "2023-11-10T00:00:00Z",
                "updatedByUserId": "s_c1",
                "updatedByName": "Liu",
                "department": "Corporate One",
                "line": "CORPORATE"
            }"#,
        )
        .unwrap();
        assert!((record.card_coverage() - 25.0).abs() < f64::EPSILON);
        record.estimated_new_payroll = 0;
        assert!(record.card_coverage().abs() < f64::EPSILON);
    }
}
