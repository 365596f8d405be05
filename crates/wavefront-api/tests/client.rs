//! Wire-level tests: the full transport pipeline against a mock HTTP server.

use std::collections::BTreeMap;
use std::time::Duration;

use wavefront_api::{EventApiError, EventClient, HttpTransport, RetryPolicy, RetryTransport};

const EVENT_ENVELOPE: &str = r#"{
    "status": {"result": "OK", "code": 200},
    "response": {
        "id": "12345",
        "name": "My event",
        "runningState": "ONGOING",
        "annotations": {"severity": "info"}
    }
}"#;

fn no_annotations() -> BTreeMap<String, String> {
    BTreeMap::new()
}

fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        initial_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(2),
        ..RetryPolicy::new(max_attempts)
    }
}

fn client_for(server: &mockito::ServerGuard, policy: RetryPolicy) -> EventClient {
    let http = HttpTransport::new().unwrap();
    EventClient::new(&server.url(), "t0k3n", RetryTransport::new(http, policy)).unwrap()
}

#[test]
fn get_event_sends_bearer_auth_and_unwraps_the_envelope() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/api/v2/event/12345")
        .match_header("authorization", "Bearer t0k3n")
        .match_header("accept", "application/json")
        .with_status(200)
        .with_body(EVENT_ENVELOPE)
        .create();

    let client = client_for(&server, RetryPolicy::disabled());
    let event = client.get_event("12345").unwrap();

    mock.assert();
    assert_eq!(event["name"], "My event");
    assert_eq!(event["runningState"], "ONGOING");
    assert!(event.get("status").is_none(), "envelope must be stripped");
}

#[test]
fn non_200_surfaces_as_bad_response_status() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/api/v2/event/unknown")
        .with_status(404)
        .create();

    let client = client_for(&server, RetryPolicy::disabled());
    let err = client.get_event("unknown").unwrap_err();

    match err {
        EventApiError::BadResponseStatus { status } => assert_eq!(status.as_u16(), 404),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn transient_statuses_are_retried_on_the_wire() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/api/v2/event")
        .with_status(503)
        .expect(3)
        .create();

    let client = client_for(&server, fast_retry(3));
    let err = client
        .start_ongoing_event("My event", &no_annotations(), &[])
        .unwrap_err();

    // All attempts exhausted; the terminal status comes back as the
    // client-layer error.
    mock.assert();
    assert!(matches!(err, EventApiError::BadResponseStatus { .. }));
}

#[test]
fn close_without_new_annotations_issues_no_update() {
    let mut server = mockito::Server::new();
    let put = server.mock("PUT", "/api/v2/event/12345").expect(0).create();
    let close = server
        .mock("POST", "/api/v2/event/12345/close")
        .with_status(200)
        .with_body(EVENT_ENVELOPE)
        .create();

    let client = client_for(&server, RetryPolicy::disabled());
    let snapshot: serde_json::Value = serde_json::from_str(EVENT_ENVELOPE).unwrap();
    let snapshot = snapshot["response"].clone();

    client.end_ongoing_event("12345", &snapshot, None).unwrap();

    put.assert();
    close.assert();
}

#[test]
fn close_with_changed_annotations_issues_exactly_one_update() {
    let mut server = mockito::Server::new();
    let put = server
        .mock("PUT", "/api/v2/event/12345")
        .match_header("content-type", "application/json")
        .with_status(200)
        .with_body(EVENT_ENVELOPE)
        .expect(1)
        .create();
    let close = server
        .mock("POST", "/api/v2/event/12345/close")
        .with_status(200)
        .with_body(EVENT_ENVELOPE)
        .create();

    let client = client_for(&server, RetryPolicy::disabled());
    let snapshot: serde_json::Value = serde_json::from_str(EVENT_ENVELOPE).unwrap();
    let snapshot = snapshot["response"].clone();

    let mut updates = BTreeMap::new();
    updates.insert("severity".to_string(), "FAILED".to_string());
    client
        .end_ongoing_event("12345", &snapshot, Some(&updates))
        .unwrap();

    put.assert();
    close.assert();
}
