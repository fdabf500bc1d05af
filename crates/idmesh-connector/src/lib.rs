//! Connector framework for identity provisioning targets.
//!
//! This crate defines the pieces every concrete connector shares:
//!
//! - [`operation`] — the abstract object model: attribute sets, filters,
//!   paging options and search results
//! - [`error`] — the connector error taxonomy
//! - [`types`] — the directory object types
//! - [`traits`] — the async capability traits a connector implements
//!
//! Concrete connectors (one crate per target system) implement the
//! capability traits and translate between the abstract object model
//! and the remote API's own representation.

pub mod error;
pub mod operation;
pub mod traits;
pub mod types;

/// Commonly used items.
pub mod prelude {
    pub use crate::error::{ConnectorError, ConnectorResult};
    pub use crate::operation::{
        AttributeSet, AttributeValue, Filter, PageOptions, SearchResult, Uid,
    };
    pub use crate::traits::{Connector, CreateOp, DeleteOp, FullCrud, SearchOp, UpdateOp};
    pub use crate::types::ObjectType;
}
