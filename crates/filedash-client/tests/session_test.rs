//! Session manager lifecycle: restore, login, logout, forced logout.

mod helpers;

use std::time::Duration;

use mockito::Matcher;
use serde_json::json;

use filedash_client::session::SessionManager;
use filedash_client::store::SessionStore;
use filedash_core::constants::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY};

use helpers::{build_client, seed_session, stored};

#[tokio::test]
async fn initialize_restores_session_without_any_network_call() {
    // No mocks are registered: any request would fail loudly.
    let server = mockito::Server::new_async().await;
    let (client, store) = build_client(&server.url());
    seed_session(&store, "tok-1", "ref-1");

    let manager = SessionManager::new(client);
    assert!(!manager.is_ready());
    manager.initialize();

    assert!(manager.is_ready());
    assert!(manager.is_authenticated());
    let user = manager.current_user().expect("restored user");
    assert_eq!(user.id, "u-1");
    assert_eq!(user.email, "ada@example.com");
}

#[tokio::test]
async fn initialize_with_corrupt_user_record_clears_every_key() {
    let server = mockito::Server::new_async().await;
    let (client, store) = build_client(&server.url());
    store.set(ACCESS_TOKEN_KEY, "tok-1").unwrap();
    store.set(REFRESH_TOKEN_KEY, "ref-1").unwrap();
    store.set(USER_KEY, "{{{ not json").unwrap();

    let manager = SessionManager::new(client);
    manager.initialize();

    assert!(manager.is_ready());
    assert!(!manager.is_authenticated());
    assert_eq!(stored(&store, ACCESS_TOKEN_KEY), None);
    assert_eq!(stored(&store, REFRESH_TOKEN_KEY), None);
    assert_eq!(stored(&store, USER_KEY), None);
}

#[tokio::test]
async fn initialize_without_token_ignores_cached_user() {
    let server = mockito::Server::new_async().await;
    let (client, store) = build_client(&server.url());
    store.set(USER_KEY, helpers::TEST_USER_JSON).unwrap();

    let manager = SessionManager::new(client);
    manager.initialize();

    assert!(!manager.is_authenticated());
    // Partial state is tolerated, not destroyed.
    assert_eq!(stored(&store, USER_KEY).as_deref(), Some(helpers::TEST_USER_JSON));
}

#[tokio::test]
async fn login_persists_tokens_and_user() {
    let mut server = mockito::Server::new_async().await;
    let (client, store) = build_client(&server.url());

    let _login = server
        .mock("POST", "/api/v1/auth/tenant/login")
        .match_body(Matcher::PartialJson(json!({"email": "ada@example.com"})))
        .with_status(200)
        .with_body(
            r#"{"success":true,"data":{
                "access_token":"tok-9",
                "refresh_token":"ref-9",
                "user":{"id":"u-9","email":"ada@example.com","full_name":"Ada"}
            }}"#,
        )
        .create_async()
        .await;

    let manager = SessionManager::new(client);
    manager.initialize();
    let user = manager
        .login("ada@example.com", "Sufficient1")
        .await
        .expect("login");

    assert_eq!(user.id, "u-9");
    assert!(manager.is_authenticated());
    assert_eq!(stored(&store, ACCESS_TOKEN_KEY).as_deref(), Some("tok-9"));
    assert_eq!(stored(&store, REFRESH_TOKEN_KEY).as_deref(), Some("ref-9"));
    let cached: serde_json::Value =
        serde_json::from_str(&stored(&store, USER_KEY).expect("user cached")).unwrap();
    assert_eq!(cached["id"], "u-9");
}

#[tokio::test]
async fn login_defaults_the_user_record_when_backend_omits_it() {
    let mut server = mockito::Server::new_async().await;
    let (client, _store) = build_client(&server.url());

    let _login = server
        .mock("POST", "/api/v1/auth/tenant/login")
        .with_status(200)
        .with_body(r#"{"success":true,"data":{"access_token":"tok-9"}}"#)
        .create_async()
        .await;

    let manager = SessionManager::new(client);
    manager.initialize();
    let user = manager
        .login("ada@example.com", "Sufficient1")
        .await
        .expect("login");

    assert_eq!(user.id, "unknown");
    assert_eq!(user.email, "ada@example.com");
}

#[tokio::test]
async fn failed_login_leaves_state_unauthenticated_and_storage_untouched() {
    let mut server = mockito::Server::new_async().await;
    let (client, store) = build_client(&server.url());

    let _login = server
        .mock("POST", "/api/v1/auth/tenant/login")
        .with_status(401)
        .with_body(r#"{"success":false,"message":"Invalid credentials"}"#)
        .create_async()
        .await;

    let manager = SessionManager::new(client);
    manager.initialize();
    let err = manager
        .login("ada@example.com", "Wrong1234")
        .await
        .expect_err("login must fail");
    assert!(err.is_unauthorized());

    assert!(!manager.is_authenticated());
    assert_eq!(stored(&store, ACCESS_TOKEN_KEY), None);
    assert_eq!(stored(&store, USER_KEY), None);
}

#[tokio::test]
async fn malformed_email_is_rejected_before_any_request() {
    let mut server = mockito::Server::new_async().await;
    let (client, _store) = build_client(&server.url());

    let login = server
        .mock("POST", "/api/v1/auth/tenant/login")
        .expect(0)
        .create_async()
        .await;

    let manager = SessionManager::new(client);
    manager.initialize();
    let err = manager
        .login("notanemail", "Sufficient1")
        .await
        .expect_err("validation must fail");
    assert_eq!(err.error_type(), "Validation");

    login.assert_async().await;
}

#[tokio::test]
async fn logout_succeeds_locally_even_when_the_backend_fails() {
    let mut server = mockito::Server::new_async().await;
    let (client, store) = build_client(&server.url());
    seed_session(&store, "tok-1", "ref-1");

    let _logout = server
        .mock("POST", "/api/v1/auth/logout")
        .with_status(500)
        .with_body(r#"{"success":false,"message":"Backend down"}"#)
        .create_async()
        .await;

    let manager = SessionManager::new(client);
    manager.initialize();
    assert!(manager.is_authenticated());

    manager.logout().await;

    assert!(!manager.is_authenticated());
    assert_eq!(stored(&store, ACCESS_TOKEN_KEY), None);
    assert_eq!(stored(&store, REFRESH_TOKEN_KEY), None);
    assert_eq!(stored(&store, USER_KEY), None);
}

#[tokio::test]
async fn forced_logout_signal_clears_the_in_memory_session() {
    let mut server = mockito::Server::new_async().await;
    let (client, store) = build_client(&server.url());
    // Access token and user, but no refresh token: the next 401 is final.
    store.set(ACCESS_TOKEN_KEY, "tok-1").unwrap();
    store.set(USER_KEY, helpers::TEST_USER_JSON).unwrap();

    let _files = server
        .mock("GET", "/api/v1/files")
        .with_status(401)
        .with_body(r#"{"success":false,"message":"Token expired"}"#)
        .create_async()
        .await;

    let manager = SessionManager::new(client.clone());
    manager.initialize();
    assert!(manager.is_authenticated());

    let err = client.list_files().await.expect_err("401 must surface");
    assert!(err.is_unauthorized());

    // Give the subscribed listener a turn to process the broadcast.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!manager.is_authenticated());
    assert!(manager.current_user().is_none());
}
