/*
[INPUT]:  Mock link service and network node responses
[OUTPUT]: Test results for the end-to-end authentication handshake
[POS]:    Integration tests - session service
[UPDATE]: When handshake stages or commit semantics change
*/

mod common;

use std::fs;
use std::sync::Arc;

use ceramic_session_adapter::auth::PersistentKeyManager;
use ceramic_session_adapter::{
    AuthProvider, Chain, MockAuthProvider, Network, SessionError, SessionService,
    credential_source_fn, resolve_endpoint,
};
use common::{
    LINKED_DID, mock_config, mount_identity_stream, mount_identity_stream_at, mount_link_service,
    mount_link_service_at, setup_mock_server, temp_key_dir,
};
use futures_util::StreamExt;
use tokio_test::assert_ok;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

fn wallet() -> Arc<dyn AuthProvider> {
    Arc::new(MockAuthProvider::new(Chain::Ethereum, "0xAbC123", "0xsigned"))
}

#[test]
fn test_testnet_endpoint_without_override() {
    let endpoint = assert_ok!(resolve_endpoint("testnet-clay"));
    assert_eq!(endpoint.as_str(), "https://gateway-clay.ceramic.network/");

    let service = assert_ok!(SessionService::new(Network::TestnetClay));
    assert_eq!(service.endpoint(), &endpoint);
}

#[tokio::test]
async fn test_authenticate_with_supplied_credential() {
    let server = setup_mock_server().await;
    let key_dir = temp_key_dir();
    let credential = wallet();

    let session_key = PersistentKeyManager::new(&key_dir)
        .get_or_create_signer(&credential.account_id())
        .unwrap();
    mount_link_service(&server).await;
    mount_identity_stream(&server, &[&session_key]).await;

    let service = assert_ok!(SessionService::from_config(mock_config(&server, &key_dir)));
    assert!(!service.is_authenticated());

    let session = assert_ok!(service.authenticate(Some(credential)).await);
    assert_eq!(session.id().unwrap(), LINKED_DID);
    assert!(service.is_authenticated());

    let current = assert_ok!(service.current_session());
    assert!(Arc::ptr_eq(&current, &session));

    let mut updates = service.subscribe_authenticated();
    assert_eq!(updates.next().await, Some(true));

    fs::remove_dir_all(key_dir).unwrap();
}

#[tokio::test]
async fn test_authenticate_with_injected_source() {
    let server = setup_mock_server().await;
    let key_dir = temp_key_dir();

    let session_key = PersistentKeyManager::new(&key_dir)
        .get_or_create_signer(&wallet().account_id())
        .unwrap();
    mount_link_service(&server).await;
    mount_identity_stream(&server, &[&session_key]).await;

    let service = SessionService::from_config(mock_config(&server, &key_dir))
        .unwrap()
        .with_credential_source(credential_source_fn(|| async { Ok::<_, SessionError>(wallet()) }));

    let mut updates = service.subscribe_authenticated();
    assert_eq!(updates.next().await, Some(false));

    let session = assert_ok!(service.authenticate(None).await);
    assert_eq!(session.id().unwrap(), LINKED_DID);
    assert_eq!(updates.next().await, Some(true));

    fs::remove_dir_all(key_dir).unwrap();
}

#[tokio::test]
async fn test_rejecting_source_leaves_state_untouched() {
    let server = setup_mock_server().await;
    let key_dir = temp_key_dir();

    let service = SessionService::from_config(mock_config(&server, &key_dir))
        .unwrap()
        .with_credential_source(credential_source_fn(|| async {
            Err::<Arc<dyn AuthProvider>, _>(SessionError::SigningRejected(
                "wallet modal closed".to_string(),
            ))
        }));

    let err = service.authenticate(None).await.err().unwrap();
    assert!(matches!(err, SessionError::CredentialAcquisition(_)));
    assert!(matches!(err.cause(), Some(SessionError::SigningRejected(_))));
    assert!(!service.is_authenticated());
    assert!(server.received_requests().await.unwrap().is_empty());

    fs::remove_dir_all(key_dir).unwrap();
}

#[tokio::test]
async fn test_source_without_address_is_unusable() {
    let server = setup_mock_server().await;
    let key_dir = temp_key_dir();

    let service = SessionService::from_config(mock_config(&server, &key_dir))
        .unwrap()
        .with_credential_source(credential_source_fn(|| async {
            let blank: Arc<dyn AuthProvider> =
                Arc::new(MockAuthProvider::new(Chain::Ethereum, "  ", "0xsig"));
            Ok::<_, SessionError>(blank)
        }));

    let err = service.authenticate(None).await.err().unwrap();
    assert!(matches!(err, SessionError::CredentialAcquisition(_)));
    assert!(matches!(err.cause(), Some(SessionError::InvalidResponse(_))));
    assert!(!service.is_authenticated());
    assert!(service.client().session().is_none());
    assert!(server.received_requests().await.unwrap().is_empty());

    fs::remove_dir_all(key_dir).unwrap();
}

#[tokio::test]
async fn test_authenticate_through_path_prefixed_endpoints() {
    let server = setup_mock_server().await;
    let key_dir = temp_key_dir();
    let credential = wallet();

    let session_key = PersistentKeyManager::new(&key_dir)
        .get_or_create_signer(&credential.account_id())
        .unwrap();
    mount_link_service_at(&server, "/link").await;
    mount_identity_stream_at(&server, "/ceramic", &[&session_key]).await;

    let mut config = mock_config(&server, &key_dir);
    config.endpoint = Some(format!("{}/ceramic", server.uri()));
    config.link_endpoint = Some(format!("{}/link/", server.uri()));

    let service = assert_ok!(SessionService::from_config(config));
    assert_eq!(service.endpoint().path(), "/ceramic/");

    let session = assert_ok!(service.authenticate(Some(credential)).await);
    assert_eq!(session.id().unwrap(), LINKED_DID);
    assert!(service.is_authenticated());

    fs::remove_dir_all(key_dir).unwrap();
}

#[tokio::test]
async fn test_link_rejection_leaves_client_unbound() {
    let server = setup_mock_server().await;
    let key_dir = temp_key_dir();

    Mock::given(method("POST"))
        .and(path("/v1/link/challenge"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(serde_json::json!({"error": "account banned"})),
        )
        .mount(&server)
        .await;

    let service = SessionService::from_config(mock_config(&server, &key_dir)).unwrap();
    let err = service.authenticate(Some(wallet())).await.err().unwrap();

    match err.cause() {
        Some(SessionError::Api { code, message }) => {
            assert_eq!(*code, 403);
            assert_eq!(message, "account banned");
        }
        other => panic!("unexpected cause: {other:?}"),
    }
    assert!(matches!(err, SessionError::LinkHandshake(_)));
    assert!(service.client().session().is_none());
    assert!(!service.is_authenticated());

    fs::remove_dir_all(key_dir).unwrap();
}

#[tokio::test]
async fn test_verification_rejection_commits_nothing() {
    let server = setup_mock_server().await;
    let key_dir = temp_key_dir();

    // identity document does not list the account's session key
    let stranger = ceramic_session_adapter::Ed25519Signer::generate();
    mount_link_service(&server).await;
    mount_identity_stream(&server, &[&stranger]).await;

    let service = SessionService::from_config(mock_config(&server, &key_dir)).unwrap();
    let err = service.authenticate(Some(wallet())).await.err().unwrap();

    assert!(matches!(err, SessionError::SessionVerification(_)));
    assert!(err.is_retryable());
    assert!(!service.is_authenticated());
    assert!(matches!(
        service.current_session(),
        Err(SessionError::NotAuthenticated)
    ));

    fs::remove_dir_all(key_dir).unwrap();
}

#[tokio::test]
async fn test_concurrent_handshakes_both_bind() {
    let server = setup_mock_server().await;
    let key_dir = temp_key_dir();

    let session_key = PersistentKeyManager::new(&key_dir)
        .get_or_create_signer(&wallet().account_id())
        .unwrap();
    mount_link_service(&server).await;
    mount_identity_stream(&server, &[&session_key]).await;

    let service = Arc::new(SessionService::from_config(mock_config(&server, &key_dir)).unwrap());
    let (a, b) = tokio::join!(
        service.authenticate(Some(wallet())),
        service.authenticate(Some(wallet()))
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    let current = service.current_session().unwrap();
    assert!(Arc::ptr_eq(&current, &a) || Arc::ptr_eq(&current, &b));
    assert!(service.is_authenticated());

    fs::remove_dir_all(key_dir).unwrap();
}
