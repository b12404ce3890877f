//! End-to-end façade tests against a wiremock server.

use std::time::{Duration, Instant};

use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, body_string, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use resilient_http::config::PolicyConfig;
use resilient_http::{CircuitState, ErrorKind, HttpError, SendOptions};

mod common;

const CLIENT: &str = "remote";

#[derive(Debug, Deserialize, PartialEq)]
struct User {
    login: String,
    id: u64,
    public_repos: u32,
}

#[derive(Debug, Deserialize, PartialEq)]
struct Note {
    to: String,
    from: String,
    body: String,
}

#[tokio::test]
async fn test_get_json_with_case_insensitive_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/octocat"))
        .and(header("user-agent", "resilient-http-tests"))
        .and(header_exists("x-request-id"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"Login":"octocat","ID":583231,"Public_Repos":8}"#,
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let svc = common::reqwest_service(CLIENT, common::policy(0, 0));
    let user: User = svc
        .send::<(), _>(
            CLIENT,
            Method::GET,
            &format!("{}/users/octocat", server.uri()),
            None,
            &SendOptions::new(),
        )
        .await
        .unwrap();

    assert_eq!(
        user,
        User {
            login: "octocat".into(),
            id: 583231,
            public_repos: 8
        }
    );
}

#[tokio::test]
async fn test_get_xml_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/note"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<note><to>Tove</to><from>Jani</from><body>Don't forget me this weekend!</body></note>",
            "application/xml",
        ))
        .mount(&server)
        .await;

    let svc = common::reqwest_service(CLIENT, common::policy(0, 0));
    let note: Note = svc
        .send::<(), _>(
            CLIENT,
            Method::GET,
            &format!("{}/note", server.uri()),
            None,
            &SendOptions::new().response_format("xml"),
        )
        .await
        .unwrap();

    assert_eq!(note.to, "Tove");
    assert_eq!(note.from, "Jani");
    assert_eq!(note.body, "Don't forget me this weekend!");
}

#[tokio::test]
async fn test_post_form_with_basic_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(header("authorization", "Basic dXNlcjpwYXNz"))
        .and(body_string("user=alice&lang=en"))
        .respond_with(ResponseTemplate::new(200).set_body_string("welcome"))
        .expect(1)
        .mount(&server)
        .await;

    let svc = common::reqwest_service(CLIENT, common::policy(0, 0));
    let text = svc
        .send_text(
            CLIENT,
            Method::POST,
            &format!("{}/login", server.uri()),
            Some(&json!({"user": "alice", "lang": "en"})),
            &SendOptions::new().content_type("form").basic("user", "pass"),
        )
        .await
        .unwrap();

    assert_eq!(text, "welcome");
}

#[tokio::test]
async fn test_post_json_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/posts"))
        .and(header("authorization", "Bearer secret-token"))
        .and(header("content-type", "application/json"))
        .and(header("x-trace", "abc"))
        .and(body_json(json!({"title": "foo", "userId": 1})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"ID": 101, "Title": "foo"})))
        .expect(1)
        .mount(&server)
        .await;

    let svc = common::reqwest_service(CLIENT, common::policy(0, 0));
    let created: Value = svc
        .send(
            CLIENT,
            Method::POST,
            &format!("{}/posts", server.uri()),
            Some(&json!({"title": "foo", "userId": 1})),
            &SendOptions::new().bearer("secret-token").header("x-trace", "abc"),
        )
        .await
        .unwrap();

    assert_eq!(created["ID"], 101);
}

#[tokio::test]
async fn test_server_errors_are_retried_until_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let svc = common::reqwest_service(CLIENT, common::policy(3, 20));
    let value: Value = svc
        .send::<(), _>(
            CLIENT,
            Method::GET,
            &format!("{}/flaky", server.uri()),
            None,
            &SendOptions::new(),
        )
        .await
        .unwrap();

    assert_eq!(value, json!({"ok": true}));
    server.verify().await;
}

#[tokio::test]
async fn test_not_found_exhausts_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/invalid-endpoint"))
        .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
        .expect(4)
        .mount(&server)
        .await;

    let url = format!("{}/invalid-endpoint", server.uri());
    let svc = common::reqwest_service(CLIENT, common::policy(3, 10));
    let err = svc
        .send::<(), Value>(CLIENT, Method::GET, &url, None, &SendOptions::new())
        .await
        .unwrap_err();

    match err {
        HttpError::HttpStatus { status, url: failed, body, .. } => {
            assert_eq!(status, 404);
            assert_eq!(failed, url);
            assert_eq!(body, "missing");
        }
        other => panic!("unexpected error: {}", other),
    }
    server.verify().await;
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let svc = common::reqwest_service(
        CLIENT,
        PolicyConfig {
            timeout_secs: 1,
            ..common::policy(3, 10)
        },
    );

    let start = Instant::now();
    let err = svc
        .send_raw::<()>(
            CLIENT,
            Method::GET,
            &format!("{}/slow", server.uri()),
            None,
            &SendOptions::new(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert!(start.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn test_circuit_stops_calling_failing_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let svc = common::reqwest_service(
        CLIENT,
        PolicyConfig {
            circuit_min_throughput: 2,
            circuit_failure_ratio: 0.5,
            circuit_break_secs: 60,
            circuit_window_size: 100,
            ..common::policy(0, 0)
        },
    );
    let url = format!("{}/down", server.uri());

    let mut kinds = Vec::new();
    for _ in 0..4 {
        let err = svc
            .send_raw::<()>(CLIENT, Method::GET, &url, None, &SendOptions::new())
            .await
            .unwrap_err();
        kinds.push(err.kind());
    }

    assert_eq!(
        kinds,
        vec![
            ErrorKind::HttpStatus,
            ErrorKind::HttpStatus,
            ErrorKind::CircuitOpen,
            ErrorKind::CircuitOpen
        ]
    );
    assert_eq!(
        svc.registry().get(CLIENT).unwrap().circuit_state(),
        CircuitState::Open
    );
    server.verify().await;
}
