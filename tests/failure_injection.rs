//! Failure injection through the real reqwest transport.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use reqwest::Method;
use serde::Deserialize;

use resilient_http::{ErrorKind, HttpError, SendOptions};

mod common;

const CLIENT: &str = "backend";

#[derive(Debug, Deserialize, PartialEq)]
struct Status {
    state: String,
}

#[tokio::test]
async fn test_retry_on_failure() {
    let call_count = Arc::new(AtomicU32::new(0));
    let cc = call_count.clone();
    let addr = common::start_programmable_backend(move || {
        let cc = cc.clone();
        async move {
            let count = cc.fetch_add(1, Ordering::SeqCst);
            if count < 2 {
                Some((503, r#"{"State":"unavailable"}"#.into()))
            } else {
                Some((200, r#"{"State":"ready"}"#.into()))
            }
        }
    })
    .await;

    let svc = common::reqwest_service(CLIENT, common::policy(3, 20));
    let status: Status = svc
        .send::<(), _>(CLIENT, Method::GET, &format!("http://{}/status", addr), None, &SendOptions::new())
        .await
        .expect("should eventually succeed after retries");

    assert_eq!(status, Status { state: "ready".into() });
    assert_eq!(call_count.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_dropped_connection_is_retried() {
    let call_count = Arc::new(AtomicU32::new(0));
    let cc = call_count.clone();
    let addr = common::start_programmable_backend(move || {
        let cc = cc.clone();
        async move {
            if cc.fetch_add(1, Ordering::SeqCst) == 0 {
                None
            } else {
                Some((200, "recovered".into()))
            }
        }
    })
    .await;

    let svc = common::reqwest_service(CLIENT, common::policy(1, 20));
    let text = svc
        .send_text::<()>(CLIENT, Method::GET, &format!("http://{}/", addr), None, &SendOptions::new())
        .await
        .unwrap();

    assert_eq!(text, "recovered");
    assert_eq!(call_count.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let url = format!("http://{}/down", addr);
    let svc = common::reqwest_service(CLIENT, common::policy(2, 10));
    let err = svc
        .send_raw::<()>(CLIENT, Method::GET, &url, None, &SendOptions::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    match err {
        HttpError::Transport { method, url: failed, .. } => {
            assert_eq!(method, Method::GET);
            assert_eq!(failed, url);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_client_error_status_exhausts_retries() {
    let call_count = Arc::new(AtomicU32::new(0));
    let cc = call_count.clone();
    let addr = common::start_programmable_backend(move || {
        cc.fetch_add(1, Ordering::SeqCst);
        async { Some((404, r#"{"error":"not found"}"#.into())) }
    })
    .await;

    let svc = common::reqwest_service(CLIENT, common::policy(2, 10));
    let err = svc
        .send_raw::<()>(CLIENT, Method::GET, &format!("http://{}/missing", addr), None, &SendOptions::new())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert_eq!(call_count.load(Ordering::SeqCst), 3);
    match err {
        HttpError::HttpStatus { body, .. } => assert_eq!(body, r#"{"error":"not found"}"#),
        other => panic!("unexpected error: {}", other),
    }
}
