//! Capability traits implemented by concrete connectors.
//!
//! A connector implements [`Connector`] plus whichever operation traits
//! the target system supports. All methods are async; implementations
//! translate between the abstract object model and the remote API.

use async_trait::async_trait;

use crate::error::ConnectorResult;
use crate::operation::{AttributeSet, Filter, PageOptions, SearchResult, Uid};
use crate::types::ObjectType;

/// Base trait every connector implements.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Human-readable name for logs and diagnostics.
    fn display_name(&self) -> &str;

    /// Verify the target system is reachable with the configured
    /// credentials.
    async fn test_connection(&self) -> ConnectorResult<()>;
}

/// Create objects on the target system.
#[async_trait]
pub trait CreateOp: Connector {
    /// Create an object and return its remote identifier.
    async fn create(
        &self,
        object_type: ObjectType,
        attributes: AttributeSet,
    ) -> ConnectorResult<Uid>;
}

/// Update objects on the target system.
///
/// Replace semantics: the attribute set carries the full desired value
/// of every attribute it names. A named multi-valued relationship
/// (group membership) replaces the remote state; attributes not named
/// are left untouched.
#[async_trait]
pub trait UpdateOp: Connector {
    /// Update an object; returns the (possibly changed) identifier.
    async fn update(
        &self,
        object_type: ObjectType,
        uid: &Uid,
        attributes: AttributeSet,
    ) -> ConnectorResult<Uid>;
}

/// Delete objects on the target system.
#[async_trait]
pub trait DeleteOp: Connector {
    /// Delete an object by identifier.
    async fn delete(&self, object_type: ObjectType, uid: &Uid) -> ConnectorResult<()>;
}

/// Search objects on the target system.
#[async_trait]
pub trait SearchOp: Connector {
    /// Execute a search.
    ///
    /// `attributes_to_get` limits the attributes populated on returned
    /// objects; `None` means everything cheap (expensive relationship
    /// attributes always require an explicit request).
    async fn search(
        &self,
        object_type: ObjectType,
        filter: Option<Filter>,
        attributes_to_get: Option<Vec<String>>,
        page: Option<PageOptions>,
    ) -> ConnectorResult<SearchResult>;

    /// Fetch a single object by identifier.
    async fn get(
        &self,
        object_type: ObjectType,
        uid: &Uid,
        attributes_to_get: Option<Vec<String>>,
    ) -> ConnectorResult<Option<AttributeSet>> {
        let filter = Filter::eq("id", uid.value());
        let result = self
            .search(object_type, Some(filter), attributes_to_get, None)
            .await?;
        Ok(result.objects.into_iter().next())
    }
}

/// Marker for connectors supporting the full CRUD surface.
pub trait FullCrud: CreateOp + UpdateOp + DeleteOp + SearchOp {}

impl<T: CreateOp + UpdateOp + DeleteOp + SearchOp> FullCrud for T {}
