/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for ceramic-session-adapter tests

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use ceramic_session_adapter::{ClientConfig, Ed25519Signer, Network, ServiceConfig};
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const LINKED_STREAM: &str = "kjzl6cwe1jw14bfx";
pub const LINKED_DID: &str = "did:3:kjzl6cwe1jw14bfx";

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Fresh directory for session keys
pub fn temp_key_dir() -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("ceramic-session-it-{}", Uuid::new_v4()));
    fs::create_dir_all(&path).unwrap();
    path
}

/// Service config pointing both the gateway and link service at the mock server
pub fn mock_config(server: &MockServer, key_dir: &PathBuf) -> ServiceConfig {
    ServiceConfig {
        network: Network::TestnetClay,
        endpoint: Some(server.uri()),
        link_endpoint: Some(server.uri()),
        key_dir: Some(key_dir.clone()),
        client: ClientConfig::default(),
    }
}

/// Challenge JWT carrying a `message` claim
pub fn mock_challenge(message: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"ES256K","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD
        .encode(serde_json::to_vec(&serde_json::json!({ "message": message })).unwrap());
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

/// Link service that accepts any signature and links to `LINKED_DID`
pub async fn mount_link_service(server: &MockServer) {
    mount_link_service_at(server, "").await;
}

/// Link service mounted below `prefix`
pub async fn mount_link_service_at(server: &MockServer, prefix: &str) {
    Mock::given(method("POST"))
        .and(path(format!("{prefix}/v1/link/challenge")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "challenge": mock_challenge("Link this account to your identity"),
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("{prefix}/v1/link/confirm")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "did": LINKED_DID,
        })))
        .mount(server)
        .await;
}

/// Identity stream on the node listing `keys` as authentication keys
pub async fn mount_identity_stream(server: &MockServer, keys: &[&Ed25519Signer]) {
    mount_identity_stream_at(server, "", keys).await;
}

/// Identity stream on a node served below `prefix`
pub async fn mount_identity_stream_at(server: &MockServer, prefix: &str, keys: &[&Ed25519Signer]) {
    let public_keys: serde_json::Map<String, serde_json::Value> = keys
        .iter()
        .enumerate()
        .map(|(i, key)| {
            (
                format!("session-{i}"),
                serde_json::Value::String(key.public_key_multibase()),
            )
        })
        .collect();

    Mock::given(method("GET"))
        .and(path(format!("{prefix}/api/v0/streams/{LINKED_STREAM}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "streamId": LINKED_STREAM,
            "state": { "content": { "publicKeys": public_keys } },
        })))
        .mount(server)
        .await;
}
