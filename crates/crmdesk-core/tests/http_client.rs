//! Response normalization of the shared HTTP client

use std::time::Duration;

use crmdesk_core::api::{ApiError, HttpClient, NO_RESPONSE_MESSAGE, REQUEST_FAILED_MESSAGE};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_success_body_passes_through_with_default_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/customers"))
        .and(header("authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "name": "Acme" }])))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(server.uri()).unwrap();
    client.set_default_header(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));

    let customers: Value = client.get("/api/customers").await.unwrap();
    assert_eq!(customers, json!([{ "name": "Acme" }]));
}

#[tokio::test]
async fn test_post_and_put_send_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tasks"))
        .and(body_json(json!({ "title": "Patch servers" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 9 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/tasks/9"))
        .and(body_json(json!({ "status": "done" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 9, "status": "done" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(server.uri()).unwrap();
    let created: Value = client
        .post("/api/tasks", &json!({ "title": "Patch servers" }))
        .await
        .unwrap();
    assert_eq!(created["id"], 9);

    let updated: Value = client
        .put("/api/tasks/9", &json!({ "status": "done" }))
        .await
        .unwrap();
    assert_eq!(updated["status"], "done");
}

#[tokio::test]
async fn test_empty_success_body_decodes_as_null() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/projects/3"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = HttpClient::new(server.uri()).unwrap();
    let () = client.delete("/api/projects/3").await.unwrap();
    let body: Option<Value> = client.delete("/api/projects/3").await.unwrap();
    assert!(body.is_none());
}

#[tokio::test]
async fn test_error_payload_passes_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/projects"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({ "message": "Managers only", "code": "FORBIDDEN" })),
        )
        .mount(&server)
        .await;

    let client = HttpClient::new(server.uri()).unwrap();
    let err = client.get::<Value>("/api/projects").await.unwrap_err();

    assert_eq!(err.message(), "Managers only");
    assert_eq!(err.status().map(|s| s.as_u16()), Some(403));
    assert_eq!(
        err.payload().and_then(|p| p.field("code")),
        Some(&json!("FORBIDDEN"))
    );
}

#[tokio::test]
async fn test_text_error_body_passes_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad gateway"))
        .mount(&server)
        .await;

    let client = HttpClient::new(server.uri()).unwrap();
    let err = client.get::<Value>("/api/tasks").await.unwrap_err();
    assert_eq!(err.message(), "Bad gateway");
}

#[tokio::test]
async fn test_no_response_is_normalized() {
    let client = HttpClient::new("http://127.0.0.1:1").unwrap();
    let err = client.get::<Value>("/api/tasks").await.unwrap_err();
    assert!(matches!(err, ApiError::NoResponse(_)));
    assert_eq!(err.message(), NO_RESPONSE_MESSAGE);
}

#[tokio::test]
async fn test_timeout_is_no_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let client = HttpClient::with_timeout(server.uri(), Duration::from_millis(100)).unwrap();
    let err = client.get::<Value>("/api/tasks").await.unwrap_err();
    assert_eq!(err.message(), NO_RESPONSE_MESSAGE);
}

#[tokio::test]
async fn test_malformed_base_url_is_request_failure() {
    let client = HttpClient::new("not a url").unwrap();
    let err = client.get::<Value>("/api/tasks").await.unwrap_err();
    assert!(matches!(err, ApiError::RequestSetup(_)));
    assert_eq!(err.message(), REQUEST_FAILED_MESSAGE);
}

#[tokio::test]
async fn test_undecodable_success_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let client = HttpClient::new(server.uri()).unwrap();
    let err = client.get::<Value>("/api/auth/profile").await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidResponse(_)));
}
