//! HTTP transport behavior against a stub server.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use idmesh_connector_googleapps::{
    ApiError, ApiRequest, DirectoryTransport, HttpTransport, StaticAccessToken,
};

fn transport() -> HttpTransport {
    HttpTransport::new(Arc::new(StaticAccessToken::new("test-token"))).unwrap()
}

#[tokio::test]
async fn get_sends_bearer_token_and_parses_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/alice"))
        .and(header("authorization", "Bearer test-token"))
        .and(query_param("projection", "basic"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": "100001", "primaryEmail": "alice@example.com"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let request = ApiRequest::get(format!("{}/users/alice", server.uri()))
        .param("projection", "basic");
    let body = transport().dispatch(&request).await.unwrap();

    assert_eq!(body["id"], json!("100001"));
}

#[tokio::test]
async fn post_sends_the_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users"))
        .and(body_json(json!({"primaryEmail": "alice@example.com"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "100001"})))
        .expect(1)
        .mount(&server)
        .await;

    let request = ApiRequest::post(
        format!("{}/users", server.uri()),
        json!({"primaryEmail": "alice@example.com"}),
    );
    transport().dispatch(&request).await.unwrap();
}

#[tokio::test]
async fn empty_success_body_is_null() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/users/100001"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let request = ApiRequest::delete(format!("{}/users/100001", server.uri()));
    let body = transport().dispatch(&request).await.unwrap();

    assert!(body.is_null());
}

#[tokio::test]
async fn error_reason_token_is_extracted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/alice"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {
                "code": 403,
                "message": "Rate limit exceeded",
                "errors": [{"reason": "userRateLimitExceeded", "message": "Rate limit exceeded"}]
            }
        })))
        .mount(&server)
        .await;

    let request = ApiRequest::get(format!("{}/users/alice", server.uri()));
    let err = transport().dispatch(&request).await.unwrap_err();

    match err {
        ApiError::Status {
            status,
            reason,
            message,
        } => {
            assert_eq!(status, 403);
            assert_eq!(reason.as_deref(), Some("userRateLimitExceeded"));
            assert_eq!(message, "Rate limit exceeded");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_error_body_still_reports_the_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/alice"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let request = ApiRequest::get(format!("{}/users/alice", server.uri()));
    let err = transport().dispatch(&request).await.unwrap_err();

    match err {
        ApiError::Status { status, reason, .. } => {
            assert_eq!(status, 500);
            assert!(reason.is_none());
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn connection_refused_is_a_transport_error() {
    // Port 9 is discard; nothing listens there in the test environment.
    let request = ApiRequest::get("http://127.0.0.1:9/users");
    let err = transport().dispatch(&request).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport { .. }));
}
