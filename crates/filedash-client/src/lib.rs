//! Authenticated HTTP client for the Filedash backend.
//!
//! Single point of HTTP access for the dashboard: injects bearer auth read
//! fresh from the session store on every call, unwraps the standard
//! `{success, message, data}` envelope, and transparently recovers from
//! expired-session responses. At most one token refresh is in flight at any
//! time; concurrent callers hitting a 401 park on the in-flight refresh and
//! replay their original request exactly once after it settles.
//!
//! When recovery is impossible (no refresh token, refresh failure, or a 401
//! from the login/refresh endpoints themselves) the client clears the stored
//! session and broadcasts a [`LogoutReason`] that the session manager
//! observes. That signal is the only channel through which the client affects
//! state outside of its return values.

pub mod api;
pub mod session;
pub mod store;
pub mod upload;

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::{broadcast, Mutex};

use filedash_core::constants::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use filedash_core::error::ClientError;
use filedash_core::models::{
    ApiEnvelope, LogoutReason, RefreshTokenRequest, RefreshTokenResponse,
};
use filedash_core::ClientConfig;

use crate::store::SessionStore;

/// How a request participates in authentication.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AuthPolicy {
    /// No auth header. A 401 is terminal: the session is cleared and the
    /// error surfaced (login and refresh endpoints).
    Public,
    /// Bearer header; a 401 triggers the refresh-and-replay flow.
    Bearer,
    /// Bearer header, but a 401 is a domain error, not a session problem
    /// (change-password: wrong current password).
    BearerNoRefresh,
}

/// Coordination state for the single in-flight refresh. Waiters subscribe to
/// the sender and receive `true` when the refresh succeeded.
#[derive(Default)]
struct RefreshState {
    in_flight: Option<broadcast::Sender<bool>>,
}

const LOGOUT_CHANNEL_CAPACITY: usize = 8;
const REFRESH_WAITER_CAPACITY: usize = 64;

/// HTTP client for the Filedash backend with session-aware auth.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn SessionStore>,
    refresh_state: Arc<Mutex<RefreshState>>,
    logout_tx: broadcast::Sender<LogoutReason>,
}

impl ApiClient {
    pub fn new(
        config: &ClientConfig,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|err| ClientError::network(format!("Failed to create HTTP client: {err}")))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            store,
            refresh_state: Arc::new(Mutex::new(RefreshState::default())),
            logout_tx: broadcast::channel(LOGOUT_CHANNEL_CAPACITY).0,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Raw client for direct transfers to object storage. Presigned URLs
    /// carry their own authorization; no bearer header is applied.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Subscribe to forced-logout signals for the lifetime of the process.
    pub fn subscribe_logout(&self) -> broadcast::Receiver<LogoutReason> {
        self.logout_tx.subscribe()
    }

    /// Send a request, unwrap the envelope, and recover from an expired
    /// session according to the policy. The single entry point for every
    /// backend call.
    pub(crate) async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        policy: AuthPolicy,
    ) -> Result<T, ClientError> {
        let (status, text) = self.execute(&method, path, body.as_ref(), policy).await?;

        if status == StatusCode::UNAUTHORIZED {
            match policy {
                AuthPolicy::Public => {
                    // Login/refresh rejected the credentials themselves;
                    // retrying cannot help.
                    self.clear_session(LogoutReason::TerminalUnauthorized);
                    return Err(Self::error_from_body(status, &text));
                }
                AuthPolicy::BearerNoRefresh => {
                    return Err(Self::error_from_body(status, &text));
                }
                AuthPolicy::Bearer => {
                    if self.recover_expired_session().await? {
                        // Replay exactly once with the refreshed token. A
                        // second 401 falls through as a plain error.
                        let (status, text) =
                            self.execute(&method, path, body.as_ref(), policy).await?;
                        return Self::decode_body(status, &text);
                    }
                    return Err(Self::error_from_body(status, &text));
                }
            }
        }

        Self::decode_body(status, &text)
    }

    /// Perform one HTTP round trip and capture status plus raw body. The
    /// bearer token is read from the store at call time, never cached on the
    /// client, so a just-refreshed token is always used.
    async fn execute(
        &self,
        method: &Method,
        path: &str,
        body: Option<&serde_json::Value>,
        policy: AuthPolicy,
    ) -> Result<(StatusCode, String), ClientError> {
        let url = self.build_url(path);
        let mut request = self.http.request(method.clone(), &url);

        if policy != AuthPolicy::Public {
            if let Some(token) = self.store.get(ACCESS_TOKEN_KEY)? {
                request = request.header(reqwest::header::AUTHORIZATION, format!("Bearer {token}"));
            }
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|err| ClientError::network(err.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| ClientError::network(err.to_string()))?;
        Ok((status, text))
    }

    /// Unwrap the response envelope into the payload type.
    fn decode_body<T: DeserializeOwned>(status: StatusCode, text: &str) -> Result<T, ClientError> {
        if !status.is_success() {
            return Err(Self::error_from_body(status, text));
        }

        let value: serde_json::Value = if text.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(text).map_err(|err| {
                ClientError::network(format!("Invalid JSON in response body: {err}"))
            })?
        };

        // A 2xx body may still report failure through the envelope; and when
        // the envelope carries no `data`, the raw body is the payload.
        if let Ok(envelope) =
            serde_json::from_value::<ApiEnvelope<serde_json::Value>>(value.clone())
        {
            if !envelope.success {
                return Err(ClientError::Business {
                    status: status.as_u16(),
                    message: envelope
                        .message
                        .unwrap_or_else(|| "Request failed".to_string()),
                });
            }
            if let Some(data) = envelope.data {
                return serde_json::from_value(data).map_err(|err| {
                    ClientError::network(format!("Unexpected response shape: {err}"))
                });
            }
        }

        serde_json::from_value(value)
            .map_err(|err| ClientError::network(format!("Unexpected response shape: {err}")))
    }

    /// Extract a human-readable message from an error body, trying the
    /// conventional fields before falling back to a generic message.
    fn error_from_body(status: StatusCode, text: &str) -> ClientError {
        let message = serde_json::from_str::<serde_json::Value>(text)
            .ok()
            .and_then(|value| {
                value
                    .get("message")
                    .and_then(|v| v.as_str())
                    .or_else(|| value.get("error").and_then(|v| v.as_str()))
                    .or_else(|| {
                        value
                            .get("data")
                            .and_then(|d| d.get("message"))
                            .and_then(|v| v.as_str())
                    })
                    .map(str::to_string)
            })
            .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));

        ClientError::Http {
            status: status.as_u16(),
            message,
        }
    }

    /// Handle an expired access token: join the in-flight refresh if one
    /// exists, otherwise run the refresh ourselves. Returns `Ok(true)` when
    /// the caller should replay its original request, `Ok(false)` when the
    /// original 401 should be surfaced as-is, and `Err` when the refresh
    /// call itself failed (initiator only).
    async fn recover_expired_session(&self) -> Result<bool, ClientError> {
        let mut state = self.refresh_state.lock().await;

        if let Some(in_flight) = state.in_flight.as_ref() {
            let mut waiter = in_flight.subscribe();
            drop(state);
            // Waiters replay on success and surface their own 401 on failure
            // (or if the refresh task dropped the channel).
            return Ok(waiter.recv().await.unwrap_or(false));
        }

        let refresh_token = match self.store.get(REFRESH_TOKEN_KEY)? {
            Some(token) => token,
            None => {
                drop(state);
                tracing::warn!("received 401 with no stored refresh token, ending session");
                self.clear_session(LogoutReason::MissingRefreshToken);
                return Ok(false);
            }
        };

        let (release_tx, _keepalive) = broadcast::channel(REFRESH_WAITER_CAPACITY);
        state.in_flight = Some(release_tx.clone());
        drop(state);

        let outcome = match self.refresh_access_token(&refresh_token).await {
            Ok(access_token) => self.store.set(ACCESS_TOKEN_KEY, &access_token),
            Err(err) => Err(err),
        };

        if let Err(err) = &outcome {
            tracing::warn!(error = %err, "token refresh failed, ending session");
            self.clear_session(LogoutReason::RefreshFailed);
        }

        {
            let mut state = self.refresh_state.lock().await;
            state.in_flight = None;
        }
        let _ = release_tx.send(outcome.is_ok());

        outcome.map(|_| true)
    }

    /// Call the refresh endpoint. No auth header, no recursion into the 401
    /// handling above.
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<String, ClientError> {
        let body = serde_json::to_value(RefreshTokenRequest {
            refresh_token: refresh_token.to_string(),
        })?;
        let (status, text) = self
            .execute(&Method::POST, &api::refresh_path(), Some(&body), AuthPolicy::Public)
            .await?;
        let response: RefreshTokenResponse = Self::decode_body(status, &text)?;
        Ok(response.access_token)
    }

    /// Tear down the stored session and broadcast the reason. Storage
    /// failures are logged, not propagated: local teardown must not fail.
    fn clear_session(&self, reason: LogoutReason) {
        if let Err(err) = self.store.clear_session() {
            tracing::warn!(error = %err, "failed to clear session store");
        }
        let _ = self.logout_tx.send(reason);
        tracing::warn!(?reason, "session ended");
    }
}
