use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::UploadDestination;

/// Request to generate a presigned URL for a direct object-storage upload.
#[derive(Debug, Serialize, Validate)]
pub struct UploadUrlRequest {
    /// Original filename
    #[validate(length(
        min = 1,
        max = 255,
        message = "Filename must be between 1 and 255 characters"
    ))]
    pub filename: String,
    /// File size in bytes
    #[validate(range(min = 1, message = "File size must be at least 1 byte"))]
    pub file_size: u64,
    /// Content type (MIME type)
    #[validate(length(
        min = 1,
        max = 255,
        message = "MIME type must be between 1 and 255 characters"
    ))]
    pub mime_type: String,
    /// Destination folder
    pub upload_to: UploadDestination,
}

/// Response containing the presigned upload target.
#[derive(Debug, Deserialize)]
pub struct UploadUrlResponse {
    /// File ID (used to complete the upload)
    pub file_id: Uuid,
    /// Presigned URL for the direct PUT to object storage
    pub upload_url: String,
    /// URL expiration time
    pub expires_at: DateTime<Utc>,
}

/// Request to acknowledge that the object-storage transfer finished.
#[derive(Debug, Serialize)]
pub struct CompleteUploadRequest {
    pub file_id: Uuid,
}

/// Response containing a presigned download URL.
#[derive(Debug, Deserialize)]
pub struct DownloadUrlResponse {
    pub download_url: String,
    pub expires_at: DateTime<Utc>,
}
