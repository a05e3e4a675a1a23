use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::json;
use tokio::test;

use session::model::{Credentials, SessionToken};
use session::transport::Method;
use session::{Endpoints, SessionError, SessionManager, SessionSettings};

use mock_transport::{InMemoryCredentialStore, MockTransport};

const LOGIN_OK: &str = r#"{"token": "new-token", "encodedContactId": "MEMBER-NEW"}"#;

fn at(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 9, 21)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

fn stored_token() -> SessionToken {
    SessionToken {
        bearer: "old-token".into(),
        member_id: "MEMBER-OLD".into(),
    }
}

fn endpoints() -> Endpoints {
    SessionSettings::default().endpoints
}

async fn start(
    transport: &Arc<MockTransport>,
    store: &Arc<InMemoryCredentialStore>,
    now: NaiveDateTime,
) -> Result<SessionManager, SessionError> {
    SessionManager::initialize(
        transport.clone(),
        store.clone(),
        SessionSettings::default(),
        now,
    )
    .await
}

#[test]
async fn absent_token_logs_in_before_anything_else() -> anyhow::Result<()> {
    let transport = Arc::new(MockTransport::default());
    transport
        .respond(Method::Post, endpoints().login_url(), 200, LOGIN_OK)
        .await;
    transport
        .respond(Method::Get, endpoints().recent_players_url(), 200, "{}")
        .await;
    let store = Arc::new(InMemoryCredentialStore::with(Credentials::new(
        "alice", "secret",
    )));

    let session = start(&transport, &store, at(10, 0)).await?;
    session.get(&endpoints().recent_players_url()).await?;

    let calls = transport.calls().await;
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].url, endpoints().login_url());
    assert_eq!(
        calls[0].body,
        Some(json!({"username": "alice", "password": "secret"}))
    );
    assert_eq!(calls[1].header_value("x-auth-token"), Some("new-token"));

    assert_eq!(session.member_id(), "MEMBER-NEW");
    assert_eq!(session.refreshed_at(), at(10, 0));

    // persisted right after login
    let saves = store.saves.lock().await.clone();
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0].0.bearer, "new-token");
    assert_eq!(saves[0].1, at(10, 0));

    Ok(())
}

#[test]
async fn stale_token_triggers_login() -> anyhow::Result<()> {
    let transport = Arc::new(MockTransport::default());
    transport
        .respond(Method::Post, endpoints().login_url(), 200, LOGIN_OK)
        .await;
    let store = Arc::new(InMemoryCredentialStore::with(
        Credentials::new("alice", "secret").with_token(stored_token(), at(8, 0)),
    ));

    let session = start(&transport, &store, at(9, 1)).await?;

    assert_eq!(session.member_id(), "MEMBER-NEW");
    assert_eq!(transport.calls().await.len(), 1);
    Ok(())
}

#[test]
async fn fresh_token_is_reused_without_login() -> anyhow::Result<()> {
    let transport = Arc::new(MockTransport::default());
    transport
        .respond(Method::Get, endpoints().recent_players_url(), 200, "{}")
        .await;
    let store = Arc::new(InMemoryCredentialStore::with(
        Credentials::new("alice", "secret").with_token(stored_token(), at(9, 30)),
    ));

    let session = start(&transport, &store, at(10, 0)).await?;
    session.get(&endpoints().recent_players_url()).await?;

    let calls = transport.calls().await;
    assert_eq!(calls.len(), 1);
    assert_ne!(calls[0].url, endpoints().login_url());
    assert_eq!(calls[0].header_value("x-auth-token"), Some("old-token"));
    assert_eq!(session.member_id(), "MEMBER-OLD");
    assert_eq!(session.refreshed_at(), at(9, 30));
    assert!(store.saves.lock().await.is_empty());
    Ok(())
}

#[test]
async fn rejected_login_is_fatal_and_persists_nothing() {
    let transport = Arc::new(MockTransport::default());
    transport
        .respond(Method::Post, endpoints().login_url(), 401, "bad credentials")
        .await;
    let store = Arc::new(InMemoryCredentialStore::with(Credentials::new(
        "alice", "wrong",
    )));

    let err = start(&transport, &store, at(10, 0)).await.err().unwrap();

    match &err {
        SessionError::Authentication { status, body } => {
            assert_eq!(*status, 401);
            assert_eq!(body, "bad credentials");
        }
        other => panic!("expected authentication error, got {other:?}"),
    }
    assert!(err.is_fatal());
    assert!(store.saves.lock().await.is_empty());
}

#[test]
async fn non_200_request_carries_method_url_payload_and_status() -> anyhow::Result<()> {
    let transport = Arc::new(MockTransport::default());
    let url = endpoints().check_court_url();
    transport
        .respond(Method::Post, url.clone(), 500, "server error")
        .await;
    let store = Arc::new(InMemoryCredentialStore::with(
        Credentials::new("alice", "secret").with_token(stored_token(), at(9, 30)),
    ));

    let session = start(&transport, &store, at(10, 0)).await?;
    let err = session
        .post(&url, json!({"courtId": 10470}))
        .await
        .err()
        .unwrap();

    match err {
        SessionError::Request {
            method,
            url: failed_url,
            payload,
            status,
            body,
        } => {
            assert_eq!(method, Method::Post);
            assert_eq!(failed_url, url);
            assert_eq!(payload, Some(json!({"courtId": 10470})));
            assert_eq!(status, 500);
            assert_eq!(body, "server error");
        }
        other => panic!("expected request error, got {other:?}"),
    }
    Ok(())
}

#[test]
async fn empty_200_body_is_null() -> anyhow::Result<()> {
    let transport = Arc::new(MockTransport::default());
    let url = endpoints().booking_url("REF");
    transport.respond(Method::Put, url.clone(), 200, "").await;
    let store = Arc::new(InMemoryCredentialStore::with(
        Credentials::new("alice", "secret").with_token(stored_token(), at(9, 30)),
    ));

    let session = start(&transport, &store, at(10, 0)).await?;
    let body = session.put(&url, json!({})).await?;

    assert!(body.is_null());
    Ok(())
}

#[test]
async fn explicit_login_replaces_the_whole_token() -> anyhow::Result<()> {
    let transport = Arc::new(MockTransport::default());
    transport
        .respond(Method::Post, endpoints().login_url(), 200, LOGIN_OK)
        .await;
    let store = Arc::new(InMemoryCredentialStore::with(
        Credentials::new("alice", "secret").with_token(stored_token(), at(9, 30)),
    ));

    let mut session = start(&transport, &store, at(10, 0)).await?;
    assert_eq!(session.member_id(), "MEMBER-OLD");

    session.login(at(10, 5)).await?;

    assert_eq!(session.member_id(), "MEMBER-NEW");
    assert_eq!(session.refreshed_at(), at(10, 5));
    Ok(())
}
