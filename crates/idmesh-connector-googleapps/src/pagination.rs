//! Page-token pagination driver.
//!
//! Directory listings return items plus an optional `nextPageToken`.
//! The driver runs in two modes: bounded (one page, hand the next token
//! back as a continuation cookie) and unbounded (follow tokens until
//! the listing is exhausted).

use std::future::Future;

use idmesh_connector::error::{ConnectorError, ConnectorResult};
use idmesh_connector::operation::PageOptions;
use idmesh_connector::types::ObjectType;

use serde_json::Value;

/// One page of a remote listing.
#[derive(Debug, Default)]
pub struct ListPage {
    /// Items of this page.
    pub items: Vec<Value>,
    /// Token of the next page; absent or blank on the last page.
    pub next_page_token: Option<String>,
}

impl ListPage {
    /// Extract a page from a listing response, taking items from the
    /// named array field.
    pub fn from_response(response: &Value, items_field: &str) -> Self {
        let items = response
            .get(items_field)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let next_page_token = response
            .get("nextPageToken")
            .and_then(Value::as_str)
            .map(String::from);
        Self {
            items,
            next_page_token,
        }
    }
}

/// Validate a requested page size for the given object type.
///
/// Accounts accept 1..=500; every type rejects zero.
pub fn validate_page_size(object_type: ObjectType, options: &PageOptions) -> ConnectorResult<()> {
    let Some(size) = options.page_size else {
        return Ok(());
    };
    if size == 0 {
        return Err(ConnectorError::invalid_data("page size must be positive"));
    }
    if object_type == ObjectType::Account && size > 500 {
        return Err(ConnectorError::invalid_data(format!(
            "account page size must be between 1 and 500, got {size}"
        )));
    }
    Ok(())
}

/// Drive a listing.
///
/// `fetch` is called with the page token to resume from (`None` for the
/// first call); `each` consumes items in arrival order. Bounded mode
/// issues exactly one fetch and returns the next token as the
/// continuation cookie; unbounded mode follows tokens until they run
/// out and returns `None`. A blank token counts as absent and never
/// causes a repeated fetch.
pub async fn drive<F, Fut, H>(
    options: &PageOptions,
    mut fetch: F,
    mut each: H,
) -> ConnectorResult<Option<String>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = ConnectorResult<ListPage>>,
    H: FnMut(Value) -> ConnectorResult<()>,
{
    let bounded = options.is_bounded();
    let mut token = options.cursor.clone();
    loop {
        let page = fetch(token.take()).await?;
        for item in page.items {
            each(item)?;
        }
        let next = page.next_page_token.filter(|t| !t.is_empty());
        match next {
            Some(next) if bounded => return Ok(Some(next)),
            Some(next) => token = Some(next),
            None => return Ok(None),
        }
    }
}
