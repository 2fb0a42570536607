//! Configuration module
//!
//! Client configuration sourced from the environment, with defaults suitable
//! for local development against a backend on localhost.

use std::env;
use std::path::PathBuf;

use crate::constants::DEFAULT_TIMEOUT_SECS;

/// Client configuration
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URL of the backend, without trailing slash.
    pub api_base_url: String,
    /// Transport-level request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Path of the persistent session file.
    pub session_file: PathBuf,
}

impl ClientConfig {
    /// Build configuration from environment variables.
    ///
    /// - `FILEDASH_API_URL` (default `http://localhost:3000`)
    /// - `FILEDASH_TIMEOUT_SECS` (default 60)
    /// - `FILEDASH_SESSION_FILE` (default `<config dir>/filedash/session.json`)
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let api_base_url = env::var("FILEDASH_API_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        let request_timeout_secs = match env::var("FILEDASH_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|_| anyhow::anyhow!("FILEDASH_TIMEOUT_SECS must be an integer: {raw}"))?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        let session_file = match env::var("FILEDASH_SESSION_FILE") {
            Ok(path) => PathBuf::from(path),
            Err(_) => default_session_file(),
        };

        Ok(Self {
            api_base_url,
            request_timeout_secs,
            session_file,
        })
    }
}

/// Default session file location under the platform config directory.
fn default_session_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("filedash")
        .join("session.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_session_file_ends_with_expected_name() {
        let path = default_session_file();
        assert!(path.ends_with("filedash/session.json"));
    }
}
