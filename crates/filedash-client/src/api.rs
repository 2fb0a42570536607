//! Domain methods for the Filedash backend API.
//!
//! One method per endpoint, layered over the generic request plumbing in
//! `lib.rs`. Request/response types live in `filedash_core::models`.

use reqwest::Method;
use uuid::Uuid;
use validator::Validate;

use filedash_core::constants::API_PREFIX;
use filedash_core::error::ClientError;
use filedash_core::models::{
    ChangePasswordRequest, DownloadUrlResponse, FileRecord, LoginRequest, LoginResponse,
    LogoutRequest, SyncToken, SyncTokenStats, TenantProfile, UploadUrlRequest, UploadUrlResponse,
};
use filedash_core::validation::validate_password;

use crate::{ApiClient, AuthPolicy};

fn api_path(path: &str) -> String {
    format!("{API_PREFIX}{path}")
}

pub(crate) fn refresh_path() -> String {
    api_path("/auth/refresh")
}

impl ApiClient {
    /// Authenticate a tenant user. Sent without an auth header.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        request.validate()?;
        self.request_json(
            Method::POST,
            &api_path("/auth/tenant/login"),
            Some(serde_json::to_value(&request)?),
            AuthPolicy::Public,
        )
        .await
    }

    /// Invalidate the refresh token backend-side. Callers treat this as
    /// best-effort; local logout never depends on it succeeding.
    pub async fn logout(&self, refresh_token: Option<&str>) -> Result<(), ClientError> {
        let request = LogoutRequest {
            refresh_token: refresh_token.map(str::to_string),
        };
        let _: serde_json::Value = self
            .request_json(
                Method::POST,
                &api_path("/auth/logout"),
                Some(serde_json::to_value(&request)?),
                AuthPolicy::Bearer,
            )
            .await?;
        Ok(())
    }

    /// Fetch the authoritative file list.
    pub async fn list_files(&self) -> Result<Vec<FileRecord>, ClientError> {
        self.request_json(Method::GET, &api_path("/files"), None, AuthPolicy::Bearer)
            .await
    }

    /// Request a presigned upload target for a new file.
    pub async fn request_upload_url(
        &self,
        request: &UploadUrlRequest,
    ) -> Result<UploadUrlResponse, ClientError> {
        request.validate()?;
        self.request_json(
            Method::POST,
            &api_path("/files/upload-url"),
            Some(serde_json::to_value(request)?),
            AuthPolicy::Bearer,
        )
        .await
    }

    /// Acknowledge that the direct object-storage transfer finished.
    pub async fn complete_upload(&self, file_id: Uuid) -> Result<(), ClientError> {
        let _: serde_json::Value = self
            .request_json(
                Method::POST,
                &api_path("/files/complete-upload"),
                Some(serde_json::json!({ "file_id": file_id })),
                AuthPolicy::Bearer,
            )
            .await?;
        Ok(())
    }

    /// Fetch a presigned download URL for a file.
    pub async fn download_url(&self, file_id: Uuid) -> Result<DownloadUrlResponse, ClientError> {
        self.request_json(
            Method::GET,
            &api_path(&format!("/files/{file_id}/download-url")),
            None,
            AuthPolicy::Bearer,
        )
        .await
    }

    /// Delete a file. The backend removes the stored object as well.
    pub async fn delete_file(&self, file_id: Uuid) -> Result<(), ClientError> {
        let _: serde_json::Value = self
            .request_json(
                Method::DELETE,
                &api_path(&format!("/files/{file_id}")),
                None,
                AuthPolicy::Bearer,
            )
            .await?;
        Ok(())
    }

    /// List the tenant's sync tokens.
    pub async fn list_sync_tokens(&self) -> Result<Vec<SyncToken>, ClientError> {
        self.request_json(
            Method::GET,
            &api_path("/tenant/sync-tokens"),
            None,
            AuthPolicy::Bearer,
        )
        .await
    }

    /// Fetch a single sync token.
    pub async fn get_sync_token(&self, token_id: Uuid) -> Result<SyncToken, ClientError> {
        self.request_json(
            Method::GET,
            &api_path(&format!("/tenant/sync-tokens/{token_id}")),
            None,
            AuthPolicy::Bearer,
        )
        .await
    }

    /// Fetch usage statistics for a sync token.
    pub async fn sync_token_stats(&self, token_id: Uuid) -> Result<SyncTokenStats, ClientError> {
        self.request_json(
            Method::GET,
            &api_path(&format!("/tenant/sync-tokens/{token_id}/stats")),
            None,
            AuthPolicy::Bearer,
        )
        .await
    }

    /// Fetch the tenant account profile.
    pub async fn tenant_profile(&self) -> Result<TenantProfile, ClientError> {
        self.request_json(
            Method::GET,
            &api_path("/tenant/profile"),
            None,
            AuthPolicy::Bearer,
        )
        .await
    }

    /// Change the account password. The new password is checked against the
    /// client-side policy before any request is sent. A 401 here means the
    /// current password was wrong, not that the session expired, so no
    /// refresh is attempted.
    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ClientError> {
        validate_password(new_password)?;
        let request = ChangePasswordRequest {
            current_password: current_password.to_string(),
            new_password: new_password.to_string(),
        };
        request.validate()?;
        let _: serde_json::Value = self
            .request_json(
                Method::POST,
                &api_path("/tenant/change-password"),
                Some(serde_json::to_value(&request)?),
                AuthPolicy::BearerNoRefresh,
            )
            .await?;
        Ok(())
    }
}
