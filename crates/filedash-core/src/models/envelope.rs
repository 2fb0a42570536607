use serde::Deserialize;

/// Standard response wrapper used by every backend endpoint.
///
/// A non-2xx status or `success: false` is an error; otherwise `data` (or the
/// whole body when `data` is absent) is the payload.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
}
