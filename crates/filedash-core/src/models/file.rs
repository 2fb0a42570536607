use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ClientError;

/// Destination folder for an upload.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UploadDestination {
    Root,
    Uploads,
    Assets,
    Schedules,
}

impl Display for UploadDestination {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UploadDestination::Root => write!(f, "root"),
            UploadDestination::Uploads => write!(f, "uploads"),
            UploadDestination::Assets => write!(f, "assets"),
            UploadDestination::Schedules => write!(f, "schedules"),
        }
    }
}

impl FromStr for UploadDestination {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "root" => Ok(UploadDestination::Root),
            "uploads" => Ok(UploadDestination::Uploads),
            "assets" => Ok(UploadDestination::Assets),
            "schedules" => Ok(UploadDestination::Schedules),
            other => Err(ClientError::validation(format!(
                "Invalid destination: {}. Must be one of: root, uploads, assets, schedules",
                other
            ))),
        }
    }
}

/// Server-side lifecycle of an uploaded object.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Pending,
    Completed,
    Failed,
}

impl Display for UploadStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UploadStatus::Pending => write!(f, "pending"),
            UploadStatus::Completed => write!(f, "completed"),
            UploadStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Server-owned file entity. The client never mutates these fields directly;
/// it triggers transitions (upload-url generation, completion, deletion) and
/// re-fetches the authoritative list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: Uuid,
    pub original_filename: String,
    pub file_size: i64,
    pub mime_type: String,
    pub upload_to: UploadDestination,
    pub upload_status: UploadStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// MIME type inferred from a file extension, with a generic binary default.
pub fn mime_type_for(path: &Path) -> String {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    let mime = match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "json" => "application/json",
        "xml" => "application/xml",
        "zip" => "application/zip",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => "application/octet-stream",
    };
    mime.to_string()
}
