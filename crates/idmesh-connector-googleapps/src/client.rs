//! HTTP transport for the Directory and Licensing APIs.
//!
//! [`DirectoryTransport`] issues exactly one remote call per dispatch;
//! retry and error classification live in [`crate::retry`]. The
//! transport's job is to speak HTTP and to surface non-2xx responses
//! as [`ApiError::Status`] with the remote reason token attached.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, trace};

use idmesh_connector::error::ConnectorError;

/// HTTP method of an API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Method name for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// One request against the remote API.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL without query parameters.
    pub url: String,
    /// Query parameters, in append order.
    pub query: Vec<(String, String)>,
    /// JSON body, for write methods.
    pub body: Option<Value>,
}

impl ApiRequest {
    fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    /// POST request with a JSON body.
    pub fn post(url: impl Into<String>, body: Value) -> Self {
        let mut request = Self::new(Method::Post, url);
        request.body = Some(body);
        request
    }

    /// PUT request with a JSON body.
    pub fn put(url: impl Into<String>, body: Value) -> Self {
        let mut request = Self::new(Method::Put, url);
        request.body = Some(body);
        request
    }

    /// PATCH request with a JSON body.
    pub fn patch(url: impl Into<String>, body: Value) -> Self {
        let mut request = Self::new(Method::Patch, url);
        request.body = Some(body);
        request
    }

    /// DELETE request.
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::Delete, url)
    }

    /// Append a query parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Append a query parameter when the value is present.
    #[must_use]
    pub fn param_opt(mut self, name: impl Into<String>, value: Option<String>) -> Self {
        if let Some(value) = value {
            self.query.push((name.into(), value));
        }
        self
    }
}

/// Failure of a single transport dispatch.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The remote API answered with a non-2xx status.
    #[error("remote status {status} ({}): {message}", .reason.as_deref().unwrap_or("unclassified"))]
    Status {
        /// HTTP status code.
        status: u16,
        /// First `error.errors[].reason` token of the error body.
        reason: Option<String>,
        /// Human-readable message from the error body.
        message: String,
    },

    /// The call never produced an HTTP response (connect, timeout,
    /// body I/O).
    #[error("transport failure: {message}")]
    Transport {
        /// Description of the failure.
        message: String,
    },
}

impl ApiError {
    /// HTTP status of this error, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { .. } => None,
        }
    }
}

/// Source of bearer tokens for API calls.
///
/// Credential acquisition and refresh are the host's concern; the
/// connector only needs a token per request.
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    /// Produce a bearer token valid for the next request.
    async fn access_token(&self) -> Result<String, ApiError>;
}

/// Fixed-token source, for tests and short-lived tooling.
pub struct StaticAccessToken {
    token: String,
}

impl StaticAccessToken {
    /// Wrap an existing bearer token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl AccessTokenSource for StaticAccessToken {
    async fn access_token(&self) -> Result<String, ApiError> {
        Ok(self.token.clone())
    }
}

/// Dispatches one API request and returns the parsed JSON body.
#[async_trait]
pub trait DirectoryTransport: Send + Sync {
    /// Issue the request once. Empty 2xx bodies yield `Value::Null`.
    async fn dispatch(&self, request: &ApiRequest) -> Result<Value, ApiError>;
}

/// [`DirectoryTransport`] backed by `reqwest`.
pub struct HttpTransport {
    http: reqwest::Client,
    token_source: Arc<dyn AccessTokenSource>,
}

impl HttpTransport {
    /// Build a transport with a 30 second request timeout.
    pub fn new(token_source: Arc<dyn AccessTokenSource>) -> Result<Self, ConnectorError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ConnectorError::InvalidConfiguration {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { http, token_source })
    }

    /// Extract the first reason token and the message from a Google
    /// error body, when the body has the expected shape.
    fn parse_error_body(body: &str) -> (Option<String>, Option<String>) {
        let Ok(json) = serde_json::from_str::<Value>(body) else {
            return (None, None);
        };
        let error = &json["error"];
        let reason = error["errors"][0]["reason"]
            .as_str()
            .map(String::from);
        let message = error["message"]
            .as_str()
            .or_else(|| error["errors"][0]["message"].as_str())
            .map(String::from);
        (reason, message)
    }
}

#[async_trait]
impl DirectoryTransport for HttpTransport {
    async fn dispatch(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        let token = self.token_source.access_token().await?;

        let mut builder = match request.method {
            Method::Get => self.http.get(&request.url),
            Method::Post => self.http.post(&request.url),
            Method::Put => self.http.put(&request.url),
            Method::Patch => self.http.patch(&request.url),
            Method::Delete => self.http.delete(&request.url),
        };
        builder = builder.bearer_auth(token);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            trace!(body = %body, "request body");
            builder = builder.json(body);
        }

        debug!(method = request.method.as_str(), url = %request.url, "dispatching API request");

        let response = builder.send().await.map_err(|e| ApiError::Transport {
            message: e.to_string(),
        })?;
        let status = response.status();
        let body = response.text().await.map_err(|e| ApiError::Transport {
            message: e.to_string(),
        })?;

        debug!(status = status.as_u16(), url = %request.url, "received API response");

        if !status.is_success() {
            let (reason, message) = Self::parse_error_body(&body);
            return Err(ApiError::Status {
                status: status.as_u16(),
                reason,
                message: message.unwrap_or_else(|| format!("HTTP {status}")),
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| ApiError::Transport {
            message: format!("response body does not parse: {e}"),
        })
    }
}
