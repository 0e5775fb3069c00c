use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;

/// Content type recorded when a storage notification does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Upload lifecycle status
///
/// A record is created `Pending` and moves to `Completed` once the object
/// store confirms the write. It never moves back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Pending,
    Completed,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Pending => "pending",
            FileStatus::Completed => "completed",
        }
    }
}

impl FromStr for FileStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(FileStatus::Pending),
            "completed" => Ok(FileStatus::Completed),
            other => Err(anyhow::anyhow!("Invalid file status: {}", other)),
        }
    }
}

impl Display for FileStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Metadata row for one uploaded file.
///
/// `file_id` doubles as the object key of the original upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub file_id: String,
    pub file_name: String,
    pub content_type: String,
    pub status: FileStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
}

impl FileRecord {
    /// A freshly issued upload that the client has not written yet.
    pub fn pending(
        file_id: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            file_id: file_id.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
            status: FileStatus::Pending,
            created_at,
            uploaded_at: None,
            file_size: None,
        }
    }

    /// Apply a confirmed write. `file_name` and `created_at` are left untouched, and
    /// `uploaded_at` keeps the time of the first completion.
    pub fn apply_completion(&mut self, update: &CompletedUpload) {
        self.status = FileStatus::Completed;
        self.file_size = Some(update.file_size);
        self.content_type = update.content_type.clone();
        self.uploaded_at.get_or_insert(update.uploaded_at);
    }
}

/// Values written by the pending → completed transition.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedUpload {
    pub file_size: i64,
    pub content_type: String,
    pub uploaded_at: DateTime<Utc>,
}

impl CompletedUpload {
    /// Build the update from a storage notification.
    ///
    /// A missing or blank declared content type falls back to `application/octet-stream`.
    pub fn from_notification(
        size: u64,
        declared_content_type: Option<&str>,
        uploaded_at: DateTime<Utc>,
    ) -> Self {
        let content_type = declared_content_type
            .map(str::trim)
            .filter(|ct| !ct.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        Self {
            file_size: i64::try_from(size).unwrap_or(i64::MAX),
            content_type,
            uploaded_at,
        }
    }
}
