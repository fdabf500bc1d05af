//! Shared test plumbing: an in-memory transport with canned routes.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use idmesh_connector_googleapps::{
    ApiError, ApiRequest, DirectoryTransport, GoogleAppsConfig, GoogleAppsConnector, Method,
    RetryConfig,
};

/// One dispatched request, as the connector issued it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RecordedRequest {
    pub fn query_get(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

struct Route {
    method: Method,
    url_suffix: String,
    responses: VecDeque<Result<Value, ApiError>>,
}

/// In-memory transport serving canned responses by method and URL
/// suffix. Requests are recorded in dispatch order; an unmatched
/// request fails the test.
#[derive(Default)]
pub struct FakeDirectory {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a canned response. Multiple registrations for the same
    /// route are served in registration order.
    pub fn on(
        self,
        method: Method,
        url_suffix: impl Into<String>,
        response: Result<Value, ApiError>,
    ) -> Self {
        self.routes.lock().unwrap().push(Route {
            method,
            url_suffix: url_suffix.into(),
            responses: VecDeque::from([response]),
        });
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl DirectoryTransport for FakeDirectory {
    async fn dispatch(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method: request.method,
            url: request.url.clone(),
            query: request.query.clone(),
            body: request.body.clone(),
        });

        let mut routes = self.routes.lock().unwrap();
        let route = routes
            .iter_mut()
            .find(|r| {
                r.method == request.method
                    && request.url.ends_with(&r.url_suffix)
                    && !r.responses.is_empty()
            })
            .unwrap_or_else(|| {
                panic!(
                    "unexpected request {} {}",
                    request.method.as_str(),
                    request.url
                )
            });
        route.responses.pop_front().unwrap()
    }
}

/// Connector over the fake transport, with millisecond retries.
pub fn connector(config: GoogleAppsConfig, fake: Arc<FakeDirectory>) -> GoogleAppsConnector {
    GoogleAppsConnector::new(config, fake).with_retry_config(RetryConfig::for_testing())
}

pub fn default_config() -> GoogleAppsConfig {
    GoogleAppsConfig::default()
}

/// Remote error with a status and reason token.
pub fn api_status(status: u16, reason: Option<&str>) -> ApiError {
    ApiError::Status {
        status,
        reason: reason.map(String::from),
        message: format!("HTTP {status}"),
    }
}

pub fn user_json(id: &str, email: &str) -> Value {
    json!({
        "id": id,
        "etag": format!("\"etag-{id}\""),
        "primaryEmail": email,
        "suspended": false
    })
}

pub fn group_json(id: &str, email: &str) -> Value {
    json!({
        "id": id,
        "etag": format!("\"etag-{id}\""),
        "email": email,
        "name": email.split('@').next().unwrap_or(email)
    })
}

pub fn member_json(email: &str, role: &str) -> Value {
    json!({ "email": email, "role": role, "type": "USER", "status": "ACTIVE" })
}
