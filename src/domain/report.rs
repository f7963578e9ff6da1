use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportType {
    App,
    Comment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportReason {
    Malware,
    InappropriateContent,
    CopyrightViolation,
    Spam,
    Misleading,
    Harassment,
    Other,
}

impl ReportReason {
    /// `OTHER` carries no meaning without a free-text description.
    pub fn requires_description(&self) -> bool {
        matches!(self, ReportReason::Other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    Pending,
    Reviewing,
    Resolved,
    Rejected,
}

impl ReportStatus {
    pub fn can_transition_to(&self, next: ReportStatus) -> bool {
        matches!(
            (self, next),
            (ReportStatus::Pending, ReportStatus::Reviewing)
                | (ReportStatus::Reviewing, ReportStatus::Resolved)
                | (ReportStatus::Reviewing, ReportStatus::Rejected)
        )
    }

    pub fn is_final(&self) -> bool {
        matches!(self, ReportStatus::Resolved | ReportStatus::Rejected)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    #[serde(rename = "id")]
    pub id: String,
    #[serde(rename = "type", alias = "reportType")]
    pub report_type: ReportType,
    #[serde(rename = "targetId")]
    pub target_id: String,
    #[serde(rename = "reason")]
    pub reason: ReportReason,
    #[serde(rename = "description", default)]
    pub description: String,
    #[serde(rename = "reporterUserId", alias = "userId")]
    pub reporter_user_id: String,
    #[serde(rename = "status")]
    pub status: ReportStatus,
    #[serde(
        rename = "createdAt",
        with = "chrono::serde::ts_milliseconds_option",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

/// Request body of `submitReport`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSubmission {
    #[serde(rename = "reportType")]
    pub report_type: ReportType,
    #[serde(rename = "targetId")]
    pub target_id: String,
    #[serde(rename = "reason")]
    pub reason: ReportReason,
    #[serde(rename = "description")]
    pub description: String,
}
