//! Error classification and the backoff/retry executor.
//!
//! This module is the single place raw HTTP statuses and remote reason
//! tokens are interpreted. Everything above it sees either a
//! [`CallOutcome`] or a classified [`ConnectorError`].

use rand::Rng;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use idmesh_connector::error::{ConnectorError, ConnectorResult};

use crate::client::{ApiError, ApiRequest, DirectoryTransport};

/// Classification of a failed API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// 404 — the referenced object does not exist.
    NotFound,
    /// 409 `duplicate` — the object already exists.
    Duplicate,
    /// 400 `invalid` — the request payload is malformed.
    Invalid,
    /// 403 rate-limit reasons — retryable with backoff.
    RateLimited,
    /// 503 `backendError` — the backend declared itself unavailable.
    BackendUnavailable,
    /// No HTTP response at all — retryable with backoff.
    TransientIo,
    /// Anything else.
    Unknown,
}

/// Classify a transport failure by status code and reason token.
pub fn classify(error: &ApiError) -> ErrorClass {
    let ApiError::Status { status, reason, .. } = error else {
        return ErrorClass::TransientIo;
    };
    let reason = reason.as_deref().unwrap_or("");
    match (status, reason) {
        (404, _) => ErrorClass::NotFound,
        (409, "duplicate") => ErrorClass::Duplicate,
        (400, "invalid") => ErrorClass::Invalid,
        (403, "userRateLimitExceeded" | "rateLimitExceeded" | "quotaExceeded") => {
            ErrorClass::RateLimited
        }
        (503, "backendError") => ErrorClass::BackendUnavailable,
        _ => ErrorClass::Unknown,
    }
}

/// Outcome of a remote call driven to a classified conclusion.
///
/// `NotFound` and `Duplicate` are returned as values rather than errors
/// because their severity depends on the call site: removing an
/// already-removed member is benign, fetching a missing user is not.
#[derive(Debug)]
pub enum CallOutcome<T> {
    /// The call succeeded.
    Success(T),
    /// The referenced object does not exist.
    NotFound,
    /// The object already exists.
    Duplicate,
}

impl<T> CallOutcome<T> {
    /// Treat both non-success outcomes as errors.
    pub fn required(self, identifier: &str) -> ConnectorResult<T> {
        match self {
            Self::Success(value) => Ok(value),
            Self::NotFound => Err(ConnectorError::not_found(identifier)),
            Self::Duplicate => Err(ConnectorError::already_exists(identifier)),
        }
    }

    /// Treat a missing object as `None`; duplicates remain errors.
    pub fn optional(self, identifier: &str) -> ConnectorResult<Option<T>> {
        match self {
            Self::Success(value) => Ok(Some(value)),
            Self::NotFound => Ok(None),
            Self::Duplicate => Err(ConnectorError::already_exists(identifier)),
        }
    }
}

/// Retry timing parameters.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Base delay in milliseconds; retry *n* waits `base * 2^n` plus
    /// jitter.
    pub base_delay_ms: u64,
    /// Upper bound (exclusive) of the random jitter added to every
    /// delay. Zero disables jitter.
    pub jitter_ms: u64,
    /// Maximum number of retries after the initial attempt.
    pub max_retries: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 1000,
            jitter_ms: 1000,
            max_retries: 5,
        }
    }
}

impl RetryConfig {
    /// Millisecond-scale delays for tests.
    pub fn for_testing() -> Self {
        Self {
            base_delay_ms: 1,
            jitter_ms: 0,
            max_retries: 5,
        }
    }
}

/// Drives a single remote call to a classified conclusion, retrying
/// rate limits and transient I/O with full-jitter exponential backoff.
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    /// Executor with the given timing parameters.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Deterministic part of the delay before retry `attempt`
    /// (0-based): `base * 2^attempt`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.min(32);
        Duration::from_millis(self.config.base_delay_ms.saturating_mul(factor))
    }

    fn jittered(&self, delay: Duration) -> Duration {
        if self.config.jitter_ms == 0 {
            return delay;
        }
        let jitter = rand::thread_rng().gen_range(0..self.config.jitter_ms);
        delay + Duration::from_millis(jitter)
    }

    /// Dispatch `request` until it reaches a conclusion.
    ///
    /// Rate-limited calls, transport failures and bare 403s are retried
    /// up to `max_retries` times. Exhausting the budget on a transport
    /// failure yields `ConnectionFailed`; on anything else,
    /// `RetryExhausted`. `Invalid` and `BackendUnavailable` fail
    /// immediately without retrying.
    pub async fn call(
        &self,
        transport: &dyn DirectoryTransport,
        request: &ApiRequest,
    ) -> ConnectorResult<CallOutcome<Value>> {
        let mut attempt = 0u32;
        loop {
            let error = match transport.dispatch(request).await {
                Ok(body) => return Ok(CallOutcome::Success(body)),
                Err(error) => error,
            };
            let class = classify(&error);
            debug!(url = %request.url, ?class, attempt, "API call failed");

            // Bare 403s carry no usable reason token; they are retried
            // generically like rate limits.
            let retryable = matches!(class, ErrorClass::RateLimited | ErrorClass::TransientIo)
                || (class == ErrorClass::Unknown && error.status() == Some(403));

            if retryable {
                if attempt >= self.config.max_retries {
                    warn!(url = %request.url, attempts = attempt, "retry budget exhausted");
                    return Err(match class {
                        ErrorClass::TransientIo => ConnectorError::ConnectionFailed {
                            message: error.to_string(),
                        },
                        _ => ConnectorError::RetryExhausted { attempts: attempt },
                    });
                }
                let delay = self.jittered(self.backoff_delay(attempt));
                warn!(
                    url = %request.url,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "retrying after backoff"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            return match class {
                ErrorClass::NotFound => Ok(CallOutcome::NotFound),
                ErrorClass::Duplicate => Ok(CallOutcome::Duplicate),
                ErrorClass::Invalid => Err(ConnectorError::invalid_data(error.to_string())),
                ErrorClass::BackendUnavailable => Err(ConnectorError::TargetUnavailable {
                    message: error.to_string(),
                }),
                _ => Err(ConnectorError::operation_failed(error.to_string())),
            };
        }
    }
}
