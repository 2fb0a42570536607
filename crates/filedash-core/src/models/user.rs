use serde::{Deserialize, Serialize};
use validator::Validate;

/// Authenticated tenant user, as returned by the login endpoint and cached
/// in the session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
}

impl UserRecord {
    /// Placeholder record for backends that omit the user from the login
    /// response. The session is still usable; only display fields are missing.
    pub fn unknown(email: &str) -> Self {
        Self {
            id: "unknown".to_string(),
            email: email.to_string(),
            full_name: None,
            company_name: None,
        }
    }
}

/// Login request body.
#[derive(Debug, Serialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

/// Login response payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<UserRecord>,
}

/// Refresh request body. Sent without an auth header.
#[derive(Debug, Serialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Refresh response payload. The refresh endpoint rotates only the access
/// token; the stored refresh token stays valid.
#[derive(Debug, Deserialize)]
pub struct RefreshTokenResponse {
    pub access_token: String,
}

/// Logout request body.
#[derive(Debug, Serialize)]
pub struct LogoutRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}
