//! Download records handed to the download manager.
//!
//! Records are snapshots: every change produces a new value, and the allowed
//! status changes are fixed here so any download manager implementation has
//! to go through the same checks.

use crate::utils::error::{Result, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DownloadStatus {
    Pending,
    Downloading,
    Paused,
    Completed,
    Installing,
    Installed,
    Failed,
    Canceled,
}

impl DownloadStatus {
    pub fn can_transition_to(&self, next: DownloadStatus) -> bool {
        use DownloadStatus::*;
        matches!(
            (self, next),
            (Pending, Downloading)
                | (Downloading, Paused)
                | (Paused, Downloading)
                | (Downloading, Completed)
                | (Downloading, Failed)
                | (Downloading, Canceled)
                | (Completed, Installing)
                | (Installing, Installed)
        )
    }

    /// No way out except starting a new download.
    pub fn is_terminal(&self) -> bool {
        use DownloadStatus::*;
        matches!(self, Failed | Canceled | Installed)
    }
}

impl fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DownloadStatus::Pending => "PENDING",
            DownloadStatus::Downloading => "DOWNLOADING",
            DownloadStatus::Paused => "PAUSED",
            DownloadStatus::Completed => "COMPLETED",
            DownloadStatus::Installing => "INSTALLING",
            DownloadStatus::Installed => "INSTALLED",
            DownloadStatus::Failed => "FAILED",
            DownloadStatus::Canceled => "CANCELED",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Download {
    #[serde(rename = "id")]
    pub id: String,
    #[serde(rename = "appId")]
    pub app_id: String,
    #[serde(rename = "urls")]
    pub urls: Vec<String>,
    #[serde(rename = "startTime", with = "chrono::serde::ts_milliseconds")]
    pub started_at: DateTime<Utc>,
    #[serde(
        rename = "endTime",
        with = "chrono::serde::ts_milliseconds_option",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(rename = "progress")]
    pub progress: f32,
    #[serde(rename = "status")]
    pub status: DownloadStatus,
    #[serde(rename = "filePath", default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

impl Download {
    pub fn new(id: impl Into<String>, app_id: impl Into<String>, urls: Vec<String>) -> Result<Self> {
        if urls.is_empty() {
            return Err(StoreError::validation("urls", "a download needs at least one URL"));
        }
        Ok(Self {
            id: id.into(),
            app_id: app_id.into(),
            urls,
            started_at: Utc::now(),
            finished_at: None,
            progress: 0.0,
            status: DownloadStatus::Pending,
            file_path: None,
        })
    }

    pub fn transition(&self, next: DownloadStatus) -> Result<Download> {
        if !self.status.can_transition_to(next) {
            return Err(StoreError::validation(
                "status",
                format!("download {} cannot move from {} to {}", self.id, self.status, next),
            ));
        }

        let mut updated = self.clone();
        updated.status = next;
        match next {
            DownloadStatus::Completed => {
                updated.progress = 1.0;
                updated.finished_at = Some(Utc::now());
            }
            DownloadStatus::Failed | DownloadStatus::Canceled => {
                updated.finished_at = Some(Utc::now());
            }
            _ => {}
        }
        Ok(updated)
    }

    pub fn with_progress(&self, progress: f32) -> Result<Download> {
        if self.status != DownloadStatus::Downloading {
            return Err(StoreError::validation(
                "progress",
                format!("progress only moves while DOWNLOADING, status is {}", self.status),
            ));
        }
        if !(0.0..=1.0).contains(&progress) {
            return Err(StoreError::validation(
                "progress",
                format!("{} is outside 0.0..=1.0", progress),
            ));
        }
        if progress < self.progress {
            return Err(StoreError::validation(
                "progress",
                format!("progress went backwards from {} to {}", self.progress, progress),
            ));
        }

        let mut updated = self.clone();
        updated.progress = progress;
        Ok(updated)
    }

    /// Only meaningful once the payload is on disk.
    pub fn with_file_path(&self, path: impl Into<String>) -> Result<Download> {
        if self.status != DownloadStatus::Completed {
            return Err(StoreError::validation(
                "filePath",
                format!("file path is set on COMPLETED downloads, status is {}", self.status),
            ));
        }
        let mut updated = self.clone();
        updated.file_path = Some(path.into());
        Ok(updated)
    }
}
