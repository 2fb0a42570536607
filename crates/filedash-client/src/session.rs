//! Session context
//!
//! Process-wide authentication state with an explicit lifecycle: restored
//! from the persistent store at startup, updated by login/logout, and torn
//! down when the API client broadcasts a forced logout.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use filedash_core::constants::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY};
use filedash_core::error::ClientError;
use filedash_core::models::UserRecord;
use filedash_core::validation::validate_email;

use crate::ApiClient;

/// Owned session state, constructed once per process.
pub struct SessionManager {
    client: ApiClient,
    user: RwLock<Option<UserRecord>>,
    ready: AtomicBool,
}

impl SessionManager {
    /// Build the manager and subscribe to the client's forced-logout signal
    /// for the lifetime of the process. Call [`initialize`](Self::initialize)
    /// before rendering anything session-dependent.
    pub fn new(client: ApiClient) -> Arc<Self> {
        let manager = Arc::new(Self {
            client,
            user: RwLock::new(None),
            ready: AtomicBool::new(false),
        });

        let mut logout_rx = manager.client.subscribe_logout();
        let weak = Arc::downgrade(&manager);
        tokio::spawn(async move {
            while let Ok(reason) = logout_rx.recv().await {
                let Some(manager) = weak.upgrade() else {
                    break;
                };
                // Storage was already cleared by the signal's raiser; only
                // the in-memory mirror is left to drop.
                tracing::warn!(?reason, "clearing in-memory session after forced logout");
                *manager.write_user() = None;
            }
        });

        manager
    }

    /// Restore the session from the persistent store.
    ///
    /// Authenticated only when both the access token and a parseable user
    /// record are present. A stored user record that fails to parse clears
    /// every session key. Marks the manager ready regardless of outcome.
    pub fn initialize(&self) {
        let restored = self.restore_from_store();
        *self.write_user() = restored;
        self.ready.store(true, Ordering::Release);
    }

    fn restore_from_store(&self) -> Option<UserRecord> {
        let store = self.client.store();

        let access_token = match store.get(ACCESS_TOKEN_KEY) {
            Ok(token) => token,
            Err(err) => {
                tracing::warn!(error = %err, "session store unreadable at startup");
                return None;
            }
        };
        // Without an access token the cached user record is meaningless.
        access_token?;
        let raw_user = store.get(USER_KEY).ok().flatten()?;

        match serde_json::from_str::<UserRecord>(&raw_user) {
            Ok(user) => {
                tracing::debug!(user_id = %user.id, "restored session from store");
                Some(user)
            }
            Err(err) => {
                tracing::warn!(error = %err, "stored user record corrupt, clearing session");
                if let Err(err) = store.clear_session() {
                    tracing::warn!(error = %err, "failed to clear corrupt session");
                }
                None
            }
        }
    }

    /// Authenticate and persist the resulting session. Errors from the API
    /// client pass through unmasked; the caller decides presentation.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserRecord, ClientError> {
        validate_email(email)?;

        let response = self.client.login(email, password).await?;
        let user = response
            .user
            .unwrap_or_else(|| UserRecord::unknown(email));

        let store = self.client.store();
        store.set(ACCESS_TOKEN_KEY, &response.access_token)?;
        if let Some(refresh_token) = &response.refresh_token {
            store.set(REFRESH_TOKEN_KEY, refresh_token)?;
        }
        store.set(USER_KEY, &serde_json::to_string(&user)?)?;

        *self.write_user() = Some(user.clone());
        tracing::info!(user_id = %user.id, "logged in");
        Ok(user)
    }

    /// End the session. The backend notification is best-effort; local
    /// teardown always succeeds.
    pub async fn logout(&self) {
        let store = self.client.store();
        let refresh_token = store.get(REFRESH_TOKEN_KEY).ok().flatten();

        if let Err(err) = self.client.logout(refresh_token.as_deref()).await {
            tracing::debug!(error = %err, "backend logout failed, continuing locally");
        }
        if let Err(err) = store.clear_session() {
            tracing::warn!(error = %err, "failed to clear session store on logout");
        }
        *self.write_user() = None;
        tracing::info!("logged out");
    }

    pub fn current_user(&self) -> Option<UserRecord> {
        self.read_user().clone()
    }

    /// Pure derivation: authenticated iff a user record is held in memory.
    pub fn is_authenticated(&self) -> bool {
        self.read_user().is_some()
    }

    /// Consumers must not act on session state before this is true.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    fn read_user(&self) -> RwLockReadGuard<'_, Option<UserRecord>> {
        match self.user.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_user(&self) -> RwLockWriteGuard<'_, Option<UserRecord>> {
        match self.user.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
