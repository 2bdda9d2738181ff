//! Integration tests for the OAuth token client and token manager using
//! wiremock HTTP mocks.

use chrono::Utc;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cartwise_retail::{
    Credential, CredentialStore, MemoryCredentialStore, RetailError, ScopeKind, TokenClient,
    TokenManager, APP_CREDENTIAL_KEY,
};

// base64("test-client:test-secret")
const BASIC_AUTH: &str = "Basic dGVzdC1jbGllbnQ6dGVzdC1zZWNyZXQ=";

fn test_token_client(base_url: &str) -> TokenClient {
    TokenClient::new(
        base_url,
        "test-client",
        "test-secret",
        "http://localhost:3000/auth/callback",
        30,
    )
    .expect("client construction should not fail")
}

fn token_body(access_token: &str, refresh_token: Option<&str>, expires_in: i64) -> serde_json::Value {
    let mut body = serde_json::json!({
        "access_token": access_token,
        "expires_in": expires_in,
        "token_type": "bearer",
    });
    if let Some(rt) = refresh_token {
        body["refresh_token"] = serde_json::json!(rt);
    }
    body
}

#[tokio::test]
async fn client_credentials_grant_yields_app_credential() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/connect/oauth2/token"))
        .and(header("authorization", BASIC_AUTH))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("scope=product.compact"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("app-tok", None, 1800)))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_token_client(&server.uri());
    let credential = client
        .client_credentials_grant()
        .await
        .expect("grant should succeed");

    assert_eq!(credential.access_token, "app-tok");
    assert!(credential.refresh_token.is_none());
    assert_eq!(credential.scope_kind, ScopeKind::App);
    assert!(credential.is_valid_at(Utc::now().timestamp_millis()));
}

#[tokio::test]
async fn authorization_code_grant_yields_user_credential() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/connect/oauth2/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=auth-code-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(token_body("user-tok", Some("refresh-1"), 1800)),
        )
        .mount(&server)
        .await;

    let client = test_token_client(&server.uri());
    let credential = client
        .authorization_code_grant("auth-code-1")
        .await
        .expect("grant should succeed");

    assert_eq!(credential.access_token, "user-tok");
    assert_eq!(credential.refresh_token.as_deref(), Some("refresh-1"));
    assert_eq!(credential.scope_kind, ScopeKind::User);
}

#[tokio::test]
async fn non_success_token_response_is_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/connect/oauth2/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("{\"error\":\"invalid_client\"}"))
        .mount(&server)
        .await;

    let client = test_token_client(&server.uri());
    let result = client.client_credentials_grant().await;

    match result {
        Err(RetailError::Auth { status, body }) => {
            assert_eq!(status, 401);
            assert!(body.contains("invalid_client"), "body was: {body}");
        }
        other => panic!("expected Auth error, got: {other:?}"),
    }
}

#[tokio::test]
async fn valid_app_token_triggers_zero_token_calls() {
    let server = MockServer::start().await;

    // expect(0): any hit on the token endpoint fails the test on drop.
    Mock::given(method("POST"))
        .and(path("/v1/connect/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("fresh", None, 1800)))
        .expect(0)
        .mount(&server)
        .await;

    let store = MemoryCredentialStore::new();
    store
        .set(
            APP_CREDENTIAL_KEY,
            Credential {
                access_token: "still-good".to_owned(),
                refresh_token: None,
                expires_at_ms: Utc::now().timestamp_millis() + 60_000,
                scope_kind: ScopeKind::App,
            },
        )
        .await;

    let manager = TokenManager::new(test_token_client(&server.uri()), store);
    let credential = manager.ensure_app_token().await.expect("cached token");
    assert_eq!(credential.access_token, "still-good");
}

#[tokio::test]
async fn expired_app_token_triggers_exactly_one_refetch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/connect/oauth2/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("fresh", None, 1800)))
        .expect(1)
        .mount(&server)
        .await;

    let store = MemoryCredentialStore::new();
    store
        .set(
            APP_CREDENTIAL_KEY,
            Credential {
                access_token: "stale".to_owned(),
                refresh_token: None,
                expires_at_ms: Utc::now().timestamp_millis() - 1_000,
                scope_kind: ScopeKind::App,
            },
        )
        .await;

    let manager = TokenManager::new(test_token_client(&server.uri()), store);
    let credential = manager.ensure_app_token().await.expect("refetched token");
    assert_eq!(credential.access_token, "fresh");

    // Second call hits the cache; expect(1) above would fail otherwise.
    let again = manager.ensure_app_token().await.expect("cached token");
    assert_eq!(again.access_token, "fresh");
}

#[tokio::test]
async fn expired_user_token_refreshes_via_refresh_grant() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/connect/oauth2/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-9"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(token_body("renewed", Some("refresh-10"), 1800)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = MemoryCredentialStore::new();
    store
        .set(
            "user:u-1",
            Credential {
                access_token: "stale".to_owned(),
                refresh_token: Some("refresh-9".to_owned()),
                expires_at_ms: Utc::now().timestamp_millis() - 1_000,
                scope_kind: ScopeKind::User,
            },
        )
        .await;

    let manager = TokenManager::new(test_token_client(&server.uri()), store);
    let credential = manager.ensure_user_token("u-1").await.expect("refreshed");
    assert_eq!(credential.access_token, "renewed");
    assert_eq!(credential.refresh_token.as_deref(), Some("refresh-10"));
}

#[tokio::test]
async fn missing_user_credential_is_reported_without_token_calls() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/connect/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("x", None, 1800)))
        .expect(0)
        .mount(&server)
        .await;

    let manager = TokenManager::new(
        test_token_client(&server.uri()),
        MemoryCredentialStore::new(),
    );
    let result = manager.ensure_user_token("nobody").await;
    assert!(matches!(result, Err(RetailError::MissingCredential(_))));
}

#[tokio::test]
async fn expired_user_token_without_refresh_token_is_dropped() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/connect/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("x", None, 1800)))
        .expect(0)
        .mount(&server)
        .await;

    let store = MemoryCredentialStore::new();
    store
        .set(
            "user:u-2",
            Credential {
                access_token: "stale".to_owned(),
                refresh_token: None,
                expires_at_ms: Utc::now().timestamp_millis() - 1_000,
                scope_kind: ScopeKind::User,
            },
        )
        .await;

    let manager = TokenManager::new(test_token_client(&server.uri()), store);
    let result = manager.ensure_user_token("u-2").await;
    assert!(matches!(result, Err(RetailError::MissingCredential(_))));
}
