use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Permission scope attached to a sync token.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SyncTokenScope {
    Read,
    Write,
    Delete,
}

/// Credential issued to external tooling for programmatic file sync.
/// Read-only projection; issuance and revocation happen backend-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncToken {
    pub id: Uuid,
    pub name: String,
    pub scopes: Vec<SyncTokenScope>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_used_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub revoked_at: Option<DateTime<Utc>>,
}

impl SyncToken {
    /// A token is usable when it is neither revoked nor past its expiry.
    pub fn is_active(&self) -> bool {
        self.revoked_at.is_none() && self.expires_at.map(|at| at > Utc::now()).unwrap_or(true)
    }
}

/// Usage statistics for one sync token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncTokenStats {
    pub token_id: Uuid,
    pub total_requests: i64,
    pub uploads: i64,
    pub downloads: i64,
    pub deletes: i64,
    #[serde(default)]
    pub bytes_uploaded: i64,
    #[serde(default)]
    pub bytes_downloaded: i64,
    #[serde(default)]
    pub last_used_at: Option<DateTime<Utc>>,
}
