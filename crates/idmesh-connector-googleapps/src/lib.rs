//! Google Workspace directory connector.
//!
//! Provisions accounts, groups, group members, organizational units and
//! license assignments through the Admin SDK Directory and Enterprise
//! License Manager REST APIs.
//!
//! # Features
//!
//! - Full CRUD for all five object types via the `idmesh-connector`
//!   capability traits
//! - Classified error handling with full-jitter exponential backoff on
//!   rate limits and transient I/O failures
//! - Bounded (cookie-continuation) and unbounded pagination
//! - Server-side field masks derived from requested attributes,
//!   including custom-schema expansion
//! - Group membership reconciliation (add / keep / re-role / remove)
//! - Optional license removal when an account is disabled
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use idmesh_connector::prelude::*;
//! use idmesh_connector_googleapps::{
//!     GoogleAppsConfig, GoogleAppsConnector, HttpTransport, StaticAccessToken,
//! };
//!
//! # async fn run() -> ConnectorResult<()> {
//! let config = GoogleAppsConfig::builder()
//!     .domain("example.com")
//!     .build()?;
//! let transport = HttpTransport::new(Arc::new(StaticAccessToken::new("ya29.token")))?;
//! let connector = GoogleAppsConnector::new(config, Arc::new(transport));
//!
//! connector.test_connection().await?;
//! let result = connector
//!     .search(ObjectType::Account, None, None, Some(PageOptions::sized(100)))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod attrs;
mod client;
mod config;
mod connector;
mod filter;
mod groups;
mod identity;
mod licensing;
mod members;
mod membership;
mod orgunits;
mod pagination;
mod projection;
mod retry;
mod schema;
mod users;

pub use client::{
    AccessTokenSource, ApiError, ApiRequest, DirectoryTransport, HttpTransport, Method,
    StaticAccessToken,
};
pub use config::{GoogleAppsConfig, GoogleAppsConfigBuilder, Projection};
pub use connector::GoogleAppsConnector;
pub use identity::{LicenseId, MemberId};
pub use membership::{GroupMember, MembershipDiff};
pub use retry::{CallOutcome, ErrorClass, RetryConfig, RetryExecutor};
pub use schema::CustomSchema;
