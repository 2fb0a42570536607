//! Test helpers: build a client against a mock backend.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use filedash_client::store::{MemorySessionStore, SessionStore};
use filedash_client::ApiClient;
use filedash_core::constants::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY};
use filedash_core::ClientConfig;

/// Client wired to the given base URL with a fresh in-memory store.
pub fn build_client(base_url: &str) -> (ApiClient, Arc<MemorySessionStore>) {
    let store = Arc::new(MemorySessionStore::new());
    let dyn_store: Arc<dyn SessionStore> = store.clone();
    let config = ClientConfig {
        api_base_url: base_url.to_string(),
        request_timeout_secs: 5,
        session_file: PathBuf::from("unused.json"),
    };
    let client = ApiClient::new(&config, dyn_store).expect("client");
    (client, store)
}

pub const TEST_USER_JSON: &str = r#"{"id":"u-1","email":"ada@example.com","full_name":"Ada"}"#;

/// Seed a full session: access token, refresh token, and user record.
pub fn seed_session(store: &MemorySessionStore, access_token: &str, refresh_token: &str) {
    store.set(ACCESS_TOKEN_KEY, access_token).expect("seed access token");
    store.set(REFRESH_TOKEN_KEY, refresh_token).expect("seed refresh token");
    store.set(USER_KEY, TEST_USER_JSON).expect("seed user");
}

pub fn stored(store: &MemorySessionStore, key: &str) -> Option<String> {
    store.get(key).expect("store read")
}
