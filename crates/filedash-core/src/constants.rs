//! Shared constants
//!
//! Fixed values used across the client and CLI: the API path prefix, the
//! upload queue bound, and default timing knobs.

/// API base path prefix, including version.
pub const API_PREFIX: &str = "/api/v1";

/// Maximum number of files accepted into one upload queue. Extra selected
/// files are truncated, not rejected.
pub const MAX_UPLOAD_FILES: usize = 3;

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Delay after an upload run completes, before the queue is cleared, so the
/// terminal per-item status stays visible.
pub const UPLOAD_SETTLE_DELAY_MS: u64 = 1200;

/// Keys under which session state is persisted.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const USER_KEY: &str = "user";
