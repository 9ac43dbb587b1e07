//! API integration tests for passgate-server.
//!
//! These tests drive the full router with realistic JSON requests. The
//! stub verifier stands in for the cryptographic library, so complete
//! register/login flows can run end to end.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde_json::{json, Value};
use tower::ServiceExt;

use passgate_core::{MemoryCredentialStore, PasskeyRelyingParty, RpPolicy, StubVerifier};
use passgate_server::{create_router, Config, SharedRelyingParty};

const ORIGIN: &str = "http://localhost:8080";
const EVIL_ORIGIN: &str = "https://evil.example";

const REG_FLAGS: u8 = 0x45;
const AUTH_FLAGS: u8 = 0x05;

fn test_app_with_config(config: Config) -> Router {
    let policy = config.rp_policy().unwrap();
    let verifier = StubVerifier::new(policy.clone());
    let rp: SharedRelyingParty = Arc::new(PasskeyRelyingParty::new(
        policy,
        Arc::new(MemoryCredentialStore::new()),
        verifier,
    ));
    create_router(rp, &config)
}

fn test_app() -> Router {
    test_app_with_config(Config::default())
}

async fn post_json(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(path)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

async fn get_json(app: &Router, path: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

fn challenge_of(options: &Value) -> String {
    options["publicKey"]["challenge"]
        .as_str()
        .expect("options carry a challenge string")
        .to_owned()
}

fn client_data(ceremony_type: &str, challenge: &str, origin: &str) -> String {
    let payload = json!({
        "type": ceremony_type,
        "challenge": challenge,
        "origin": origin,
    });
    URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload).unwrap())
}

fn auth_data(flags: u8, counter: u32) -> Vec<u8> {
    let mut data = vec![0u8; 32];
    data.push(flags);
    data.extend_from_slice(&counter.to_be_bytes());
    data.push(0xA5);
    data
}

fn attestation(challenge: &str, origin: &str, cred_id: &str, counter: u32) -> Value {
    json!({
        "id": cred_id,
        "rawId": cred_id,
        "type": "public-key",
        "response": {
            "clientDataJSON": client_data("webauthn.create", challenge, origin),
            "attestationObject": URL_SAFE_NO_PAD.encode(auth_data(REG_FLAGS, counter)),
            "transports": ["internal"],
        }
    })
}

fn assertion(challenge: &str, origin: &str, cred_id: &str, counter: u32) -> Value {
    json!({
        "id": cred_id,
        "rawId": cred_id,
        "type": "public-key",
        "response": {
            "clientDataJSON": client_data("webauthn.get", challenge, origin),
            "authenticatorData": URL_SAFE_NO_PAD.encode(auth_data(AUTH_FLAGS, counter)),
            "signature": URL_SAFE_NO_PAD.encode(b"stub-signature"),
            "userHandle": null,
        }
    })
}

/// Register a credential for `username` through the HTTP endpoints.
async fn register_user(app: &Router, username: &str, cred_id: &str, counter: u32) {
    let (status, options) =
        post_json(app, "/register/options", json!({"username": username})).await;
    assert_eq!(status, StatusCode::OK);

    let credential = attestation(&challenge_of(&options), ORIGIN, cred_id, counter);
    let (status, body) = post_json(
        app,
        "/register/verify",
        json!({"username": username, "credential": credential}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["verified"], true);
}

/// Read a stored sign counter back through the debug endpoint.
async fn stored_counter(app: &Router, username: &str, cred_id: &str) -> u64 {
    let (status, body) = get_json(app, "/debug/users").await;
    assert_eq!(status, StatusCode::OK);
    let user = body["users"]
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["username"] == username)
        .expect("user listed");
    let credential = user["credentials"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["id"] == cred_id)
        .expect("credential listed");
    credential["sign_count"].as_u64().unwrap()
}

// ============================================================================
// Health & Readiness
// ============================================================================

#[tokio::test]
async fn test_health_endpoint_returns_ok() {
    let app = test_app();
    let (status, body) = get_json(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "passgate-server");
    assert!(body["version"].is_string());
    assert_eq!(body["users"], 0);
    assert_eq!(body["credentials"], 0);
}

#[tokio::test]
async fn test_ready_endpoint_returns_ok() {
    let app = test_app();
    let (status, body) = get_json(&app, "/ready").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready"], true);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = test_app();
    let (status, body) = get_json(&app, "/api-docs/openapi.json").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/register/options"].is_object());
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_register_options_requires_username() {
    let app = test_app();

    let (status, body) = post_json(&app, "/register/options", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
    assert!(body["error"].is_string());

    let (status, body) = post_json(&app, "/register/options", json!({"username": "   "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_register_flow_end_to_end() {
    let app = test_app();

    let (status, options) =
        post_json(&app, "/register/options", json!({"username": "alice"})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!challenge_of(&options).is_empty());
    assert!(options["publicKey"]["excludeCredentials"]
        .as_array()
        .unwrap()
        .is_empty());

    let credential = attestation(&challenge_of(&options), ORIGIN, "cred-alice", 0);
    let (status, body) = post_json(
        &app,
        "/register/verify",
        json!({"username": "alice", "credential": credential}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"verified": true}));

    // a second options call now excludes the registered credential
    let (status, options) =
        post_json(&app, "/register/options", json!({"username": "alice"})).await;
    assert_eq!(status, StatusCode::OK);
    let exclusions = options["publicKey"]["excludeCredentials"].as_array().unwrap();
    assert_eq!(exclusions.len(), 1);
    assert_eq!(exclusions[0]["id"], "cred-alice");
}

#[tokio::test]
async fn test_register_verify_without_options_fails() {
    let app = test_app();

    let credential = attestation("whatever", ORIGIN, "cred-1", 0);
    let (status, body) = post_json(
        &app,
        "/register/verify",
        json!({"username": "alice", "credential": credential}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "NO_PENDING_CHALLENGE");
}

#[tokio::test]
async fn test_register_verify_replay_is_rejected() {
    let app = test_app();

    let (_, options) = post_json(&app, "/register/options", json!({"username": "alice"})).await;
    let credential = attestation(&challenge_of(&options), ORIGIN, "cred-1", 0);
    let request = json!({"username": "alice", "credential": credential});

    let (status, _) = post_json(&app, "/register/verify", request.clone()).await;
    assert_eq!(status, StatusCode::OK);

    // the same response cannot be verified twice
    let (status, body) = post_json(&app, "/register/verify", request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "NO_PENDING_CHALLENGE");

    // and no second credential was committed
    let (_, debug) = get_json(&app, "/debug/users").await;
    assert_eq!(debug["users"][0]["credentials"].as_array().unwrap().len(), 1);
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_login_options_unknown_user() {
    let app = test_app();

    let (status, body) = post_json(&app, "/login/options", json!({"username": "bob"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "UNKNOWN_USER");
}

#[tokio::test]
async fn test_login_options_without_credentials() {
    let app = test_app();

    // the options call creates the account, but no credential is committed
    post_json(&app, "/register/options", json!({"username": "bob"})).await;

    let (status, body) = post_json(&app, "/login/options", json!({"username": "bob"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "NO_CREDENTIALS");
}

#[tokio::test]
async fn test_login_flow_end_to_end() {
    let app = test_app();
    register_user(&app, "alice", "cred-alice", 1).await;

    let (status, options) = post_json(&app, "/login/options", json!({"username": "alice"})).await;
    assert_eq!(status, StatusCode::OK);
    let allowed = options["publicKey"]["allowCredentials"].as_array().unwrap();
    assert_eq!(allowed[0]["id"], "cred-alice");

    let credential = assertion(&challenge_of(&options), ORIGIN, "cred-alice", 2);
    let (status, body) = post_json(
        &app,
        "/login/verify",
        json!({"username": "alice", "credential": credential}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"verified": true}));
    assert_eq!(stored_counter(&app, "alice", "cred-alice").await, 2);
}

#[tokio::test]
async fn test_login_verify_tampered_origin_rejected() {
    let app = test_app();
    register_user(&app, "alice", "cred-alice", 1).await;

    let (_, options) = post_json(&app, "/login/options", json!({"username": "alice"})).await;
    let credential = assertion(&challenge_of(&options), EVIL_ORIGIN, "cred-alice", 2);
    let (status, body) = post_json(
        &app,
        "/login/verify",
        json!({"username": "alice", "credential": credential}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VERIFICATION_FAILED");
    // the stored counter is untouched
    assert_eq!(stored_counter(&app, "alice", "cred-alice").await, 1);

    // a fresh ceremony from the real origin still works
    let (_, options) = post_json(&app, "/login/options", json!({"username": "alice"})).await;
    let credential = assertion(&challenge_of(&options), ORIGIN, "cred-alice", 2);
    let (status, _) = post_json(
        &app,
        "/login/verify",
        json!({"username": "alice", "credential": credential}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_counter_regression_rejected() {
    let app = test_app();
    register_user(&app, "alice", "cred-alice", 5).await;

    for stale in [5u32, 3] {
        let (_, options) = post_json(&app, "/login/options", json!({"username": "alice"})).await;
        let credential = assertion(&challenge_of(&options), ORIGIN, "cred-alice", stale);
        let (status, body) = post_json(
            &app,
            "/login/verify",
            json!({"username": "alice", "credential": credential}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "COUNTER_REGRESSION");
        assert_eq!(stored_counter(&app, "alice", "cred-alice").await, 5);
    }

    let (_, options) = post_json(&app, "/login/options", json!({"username": "alice"})).await;
    let credential = assertion(&challenge_of(&options), ORIGIN, "cred-alice", 6);
    let (status, _) = post_json(
        &app,
        "/login/verify",
        json!({"username": "alice", "credential": credential}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored_counter(&app, "alice", "cred-alice").await, 6);
}

#[tokio::test]
async fn test_login_verify_unknown_credential() {
    let app = test_app();
    register_user(&app, "alice", "cred-alice", 1).await;

    let (_, options) = post_json(&app, "/login/options", json!({"username": "alice"})).await;
    let credential = assertion(&challenge_of(&options), ORIGIN, "cred-other", 2);
    let (status, body) = post_json(
        &app,
        "/login/verify",
        json!({"username": "alice", "credential": credential}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "CREDENTIAL_NOT_FOUND");
}

#[tokio::test]
async fn test_login_verify_replay_after_success() {
    let app = test_app();
    register_user(&app, "alice", "cred-alice", 1).await;

    let (_, options) = post_json(&app, "/login/options", json!({"username": "alice"})).await;
    let credential = assertion(&challenge_of(&options), ORIGIN, "cred-alice", 2);
    let request = json!({"username": "alice", "credential": credential});

    let (status, _) = post_json(&app, "/login/verify", request.clone()).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post_json(&app, "/login/verify", request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "NO_PENDING_CHALLENGE");
}

// ============================================================================
// Debug / introspection
// ============================================================================

#[tokio::test]
async fn test_debug_users_lists_accounts() {
    let app = test_app();
    register_user(&app, "alice", "cred-alice", 0).await;

    let (status, body) = get_json(&app, "/debug/users").await;
    assert_eq!(status, StatusCode::OK);

    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["username"], "alice");
    let credentials = users[0]["credentials"].as_array().unwrap();
    assert_eq!(credentials.len(), 1);
    assert_eq!(credentials[0]["id"], "cred-alice");
    assert_eq!(credentials[0]["transports"], json!(["internal"]));
}

#[tokio::test]
async fn test_debug_routes_can_be_disabled() {
    let config = Config {
        debug_routes: false,
        ..Config::default()
    };
    let app = test_app_with_config(config);

    let (status, _) = get_json(&app, "/debug/users").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
