//! Org unit mapping and Directory API orgunit requests.
//!
//! Org units are addressed by path, not id. Paths keep their leading
//! slash in the abstract model; request URLs strip it and encode each
//! segment separately so slashes survive as separators.

use serde_json::{json, Map, Value};

use idmesh_connector::error::{ConnectorError, ConnectorResult};
use idmesh_connector::operation::{wellknown, AttributeSet};

use crate::attrs;
use crate::client::ApiRequest;
use crate::config::GoogleAppsConfig;
use crate::projection::{wants, AttrNames};

/// Field holding the listing items in a response.
pub(crate) const LIST_FIELD: &str = "organizationUnits";

fn orgunits_url(config: &GoogleAppsConfig) -> String {
    format!(
        "{}/customer/{}/orgunits",
        config.directory_base_url,
        urlencoding::encode(&config.customer_id)
    )
}

fn encoded_path(path: &str) -> String {
    path.trim_start_matches('/')
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn orgunit_url(config: &GoogleAppsConfig, path: &str) -> String {
    format!("{}/{}", orgunits_url(config), encoded_path(path))
}

/// List org units. The listing is unpaged; `scope` of `/` covers the
/// whole tree, any other path the children of that unit.
pub(crate) fn list_request(config: &GoogleAppsConfig, scope: Option<&str>) -> ApiRequest {
    let mut request = ApiRequest::get(orgunits_url(config));
    match scope {
        None | Some("/") => request = request.param("type", "all"),
        Some(path) => {
            request = request
                .param("orgUnitPath", path.trim_start_matches('/'))
                .param("type", "children");
        }
    }
    request
}

pub(crate) fn get_request(config: &GoogleAppsConfig, path: &str) -> ApiRequest {
    ApiRequest::get(orgunit_url(config, path))
}

pub(crate) fn insert_request(config: &GoogleAppsConfig, payload: Value) -> ApiRequest {
    ApiRequest::post(orgunits_url(config), payload)
}

pub(crate) fn patch_request(
    config: &GoogleAppsConfig,
    path: &str,
    payload: Value,
) -> ApiRequest {
    ApiRequest::patch(orgunit_url(config, path), payload)
}

pub(crate) fn delete_request(config: &GoogleAppsConfig, path: &str) -> ApiRequest {
    ApiRequest::delete(orgunit_url(config, path))
}

fn payload_from(attributes: &AttributeSet) -> Map<String, Value> {
    let mut payload = Map::new();
    if let Some(name) = attributes.get_str(attrs::NAME) {
        payload.insert(attrs::NAME.to_string(), json!(name));
    }
    if let Some(parent) = attributes.get_str(attrs::PARENT_ORG_UNIT_PATH) {
        payload.insert(attrs::PARENT_ORG_UNIT_PATH.to_string(), json!(parent));
    }
    if let Some(description) = attributes.get_str(wellknown::DESCRIPTION) {
        payload.insert(attrs::DESCRIPTION.to_string(), json!(description));
    }
    if let Some(block) = attributes.get_bool(attrs::BLOCK_INHERITANCE) {
        payload.insert(attrs::BLOCK_INHERITANCE.to_string(), json!(block));
    }
    payload
}

/// Build the insert payload. Name and parent path are mandatory.
pub(crate) fn create_payload(attributes: &AttributeSet) -> ConnectorResult<Value> {
    let payload = payload_from(attributes);
    if !payload.contains_key(attrs::NAME) {
        return Err(ConnectorError::invalid_attribute(
            attrs::NAME,
            "org unit create requires a name",
        ));
    }
    if !payload.contains_key(attrs::PARENT_ORG_UNIT_PATH) {
        return Err(ConnectorError::invalid_attribute(
            attrs::PARENT_ORG_UNIT_PATH,
            "org unit create requires a parent path",
        ));
    }
    Ok(Value::Object(payload))
}

/// Build the patch payload; `None` when no mapped field is present.
pub(crate) fn update_payload(attributes: &AttributeSet) -> Option<Value> {
    let payload = payload_from(attributes);
    (!payload.is_empty()).then(|| Value::Object(payload))
}

/// Map a remote org unit payload into the abstract model.
pub(crate) fn to_object(
    orgunit: &Value,
    requested: Option<&AttrNames>,
) -> ConnectorResult<AttributeSet> {
    let path = orgunit
        .get(attrs::ORG_UNIT_PATH)
        .and_then(Value::as_str)
        .ok_or_else(|| ConnectorError::serialization("org unit payload has no path"))?;

    let mut object = AttributeSet::new()
        .with(attrs::ORG_UNIT_PATH, path)
        .with(wellknown::NAME, path);
    if let Some(etag) = orgunit.get(attrs::ETAG).and_then(Value::as_str) {
        object.set(attrs::ETAG, etag);
    }
    if wants(requested, attrs::NAME) {
        if let Some(name) = orgunit.get(attrs::NAME).and_then(Value::as_str) {
            object.set(attrs::NAME, name);
        }
    }
    if wants(requested, wellknown::DESCRIPTION) {
        if let Some(description) = orgunit.get(attrs::DESCRIPTION).and_then(Value::as_str) {
            object.set(wellknown::DESCRIPTION, description);
        }
    }
    if wants(requested, attrs::PARENT_ORG_UNIT_PATH) {
        if let Some(parent) = orgunit
            .get(attrs::PARENT_ORG_UNIT_PATH)
            .and_then(Value::as_str)
        {
            object.set(attrs::PARENT_ORG_UNIT_PATH, parent);
        }
    }
    if wants(requested, attrs::BLOCK_INHERITANCE) {
        if let Some(block) = orgunit
            .get(attrs::BLOCK_INHERITANCE)
            .and_then(Value::as_bool)
        {
            object.set(attrs::BLOCK_INHERITANCE, block);
        }
    }
    Ok(object)
}
