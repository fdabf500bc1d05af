//! Group mapping and Directory API group requests.

use serde_json::{json, Map, Value};

use idmesh_connector::error::{ConnectorError, ConnectorResult};
use idmesh_connector::operation::{wellknown, AttributeSet, AttributeValue, PageOptions};

use crate::attrs;
use crate::client::ApiRequest;
use crate::config::GoogleAppsConfig;
use crate::projection::{wants, AttrNames};

fn groups_url(config: &GoogleAppsConfig) -> String {
    format!("{}/groups", config.directory_base_url)
}

fn group_url(config: &GoogleAppsConfig, group_key: &str) -> String {
    format!("{}/groups/{}", config.directory_base_url, urlencoding::encode(group_key))
}

/// List groups of the configured customer.
pub(crate) fn list_request(
    config: &GoogleAppsConfig,
    page: &PageOptions,
    field_mask: Option<&str>,
    page_token: Option<String>,
) -> ApiRequest {
    ApiRequest::get(groups_url(config))
        .param("customer", &config.customer_id)
        .param_opt("pageToken", page_token)
        .param_opt("maxResults", page.page_size.map(|s| s.to_string()))
        .param_opt(
            "fields",
            field_mask.map(|mask| format!("nextPageToken,groups({mask})")),
        )
}

/// List the groups a user belongs to. Unlike the customer listing this
/// keys on the member, so it feeds the account's group attribute.
pub(crate) fn list_for_member_request(
    config: &GoogleAppsConfig,
    user_key: &str,
    page_token: Option<String>,
) -> ApiRequest {
    ApiRequest::get(groups_url(config))
        .param("userKey", user_key)
        .param_opt("domain", config.domain.clone())
        .param("fields", "nextPageToken,groups(email)")
        .param_opt("pageToken", page_token)
}

pub(crate) fn get_request(
    config: &GoogleAppsConfig,
    group_key: &str,
    field_mask: Option<&str>,
) -> ApiRequest {
    ApiRequest::get(group_url(config, group_key)).param_opt("fields", field_mask.map(String::from))
}

pub(crate) fn insert_request(config: &GoogleAppsConfig, payload: Value) -> ApiRequest {
    ApiRequest::post(groups_url(config), payload)
}

pub(crate) fn patch_request(
    config: &GoogleAppsConfig,
    group_key: &str,
    payload: Value,
) -> ApiRequest {
    ApiRequest::patch(group_url(config, group_key), payload)
}

pub(crate) fn delete_request(config: &GoogleAppsConfig, group_key: &str) -> ApiRequest {
    ApiRequest::delete(group_url(config, group_key))
}

pub(crate) fn alias_insert_request(
    config: &GoogleAppsConfig,
    group_key: &str,
    alias: &str,
) -> ApiRequest {
    ApiRequest::post(
        format!("{}/aliases", group_url(config, group_key)),
        json!({ attrs::ALIAS: alias }),
    )
}

fn payload_from(attributes: &AttributeSet) -> Map<String, Value> {
    let mut payload = Map::new();
    if let Some(email) = attributes.get_str(wellknown::NAME) {
        payload.insert(attrs::EMAIL.to_string(), json!(email));
    }
    if let Some(name) = attributes.get_str(attrs::NAME) {
        payload.insert(attrs::NAME.to_string(), json!(name));
    }
    if let Some(description) = attributes.get_str(wellknown::DESCRIPTION) {
        payload.insert(attrs::DESCRIPTION.to_string(), json!(description));
    }
    payload
}

/// Build the insert payload. The group email is mandatory on create.
pub(crate) fn create_payload(attributes: &AttributeSet) -> ConnectorResult<Value> {
    let payload = payload_from(attributes);
    if !payload.contains_key(attrs::EMAIL) {
        return Err(ConnectorError::invalid_attribute(
            wellknown::NAME,
            "group create requires an email",
        ));
    }
    Ok(Value::Object(payload))
}

/// Build the patch payload; `None` when no mapped field is present.
pub(crate) fn update_payload(attributes: &AttributeSet) -> Option<Value> {
    let payload = payload_from(attributes);
    (!payload.is_empty()).then(|| Value::Object(payload))
}

/// Map a remote group payload into the abstract model.
pub(crate) fn to_object(
    group: &Value,
    requested: Option<&AttrNames>,
) -> ConnectorResult<AttributeSet> {
    let id = group
        .get(attrs::ID)
        .and_then(Value::as_str)
        .ok_or_else(|| ConnectorError::serialization("group payload has no id"))?;

    let mut object = AttributeSet::new().with(attrs::ID, id);
    if let Some(etag) = group.get(attrs::ETAG).and_then(Value::as_str) {
        object.set(attrs::ETAG, etag);
    }
    if let Some(email) = group.get(attrs::EMAIL).and_then(Value::as_str) {
        object.set(wellknown::NAME, email);
    }
    if wants(requested, attrs::NAME) {
        if let Some(name) = group.get(attrs::NAME).and_then(Value::as_str) {
            object.set(attrs::NAME, name);
        }
    }
    if wants(requested, wellknown::DESCRIPTION) {
        if let Some(description) = group.get(attrs::DESCRIPTION).and_then(Value::as_str) {
            object.set(wellknown::DESCRIPTION, description);
        }
    }
    if wants(requested, attrs::ADMIN_CREATED) {
        if let Some(flag) = group.get(attrs::ADMIN_CREATED).and_then(Value::as_bool) {
            object.set(attrs::ADMIN_CREATED, flag);
        }
    }
    if wants(requested, attrs::DIRECT_MEMBERS_COUNT) {
        // The API renders the count as a string.
        if let Some(count) = group.get(attrs::DIRECT_MEMBERS_COUNT) {
            object.set(attrs::DIRECT_MEMBERS_COUNT, AttributeValue::from(count.clone()));
        }
    }
    for field in [attrs::ALIASES, attrs::NON_EDITABLE_ALIASES] {
        if wants(requested, field) {
            if let Some(value) = group.get(field) {
                object.set(field, AttributeValue::from(value.clone()));
            }
        }
    }
    Ok(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use idmesh_connector::types::ObjectType;

    fn config() -> GoogleAppsConfig {
        GoogleAppsConfig::default()
    }

    fn sample_group() -> Value {
        json!({
            "id": "grp-1",
            "etag": "\"etag-g\"",
            "email": "eng@example.com",
            "name": "Engineering",
            "description": "All engineers",
            "adminCreated": true,
            "directMembersCount": "12",
            "aliases": ["engineering@example.com"]
        })
    }

    #[test]
    fn full_mapping() {
        let object = to_object(&sample_group(), None).unwrap();
        assert_eq!(object.get_str(attrs::ID), Some("grp-1"));
        assert_eq!(object.get_str(wellknown::NAME), Some("eng@example.com"));
        assert_eq!(object.get_str(attrs::NAME), Some("Engineering"));
        assert_eq!(object.get_str(wellknown::DESCRIPTION), Some("All engineers"));
        assert_eq!(object.get_bool(attrs::ADMIN_CREATED), Some(true));
        assert_eq!(
            object.get_strings(attrs::ALIASES),
            Some(vec!["engineering@example.com".to_string()])
        );
    }

    #[test]
    fn requested_set_gates_mapping() {
        let requested =
            AttrNames::from_requested(ObjectType::Group, &[attrs::NAME.to_string()]).unwrap();
        let object = to_object(&sample_group(), Some(&requested)).unwrap();
        assert_eq!(object.get_str(attrs::NAME), Some("Engineering"));
        assert_eq!(object.get_str(wellknown::NAME), Some("eng@example.com"));
        assert!(object.get(wellknown::DESCRIPTION).is_none());
        assert!(object.get(attrs::ALIASES).is_none());
    }

    #[test]
    fn create_requires_email() {
        let err = create_payload(&AttributeSet::new().with(attrs::NAME, "Engineering"))
            .unwrap_err();
        assert_eq!(err.error_code(), "invalid_attribute_value");

        let payload = create_payload(
            &AttributeSet::new()
                .with(wellknown::NAME, "eng@example.com")
                .with(wellknown::DESCRIPTION, "All engineers"),
        )
        .unwrap();
        assert_eq!(payload[attrs::EMAIL], json!("eng@example.com"));
        assert_eq!(payload[attrs::DESCRIPTION], json!("All engineers"));
    }

    #[test]
    fn payload_maps_back_to_the_original_attributes() {
        let attributes = AttributeSet::new()
            .with(wellknown::NAME, "eng@example.com")
            .with(attrs::NAME, "Engineering")
            .with(wellknown::DESCRIPTION, "All engineers");

        let mut remote = create_payload(&attributes).unwrap();
        remote[attrs::ID] = json!("grp-1");
        remote[attrs::ETAG] = json!("\"etag-g\"");

        let object = to_object(&remote, None).unwrap();
        assert_eq!(object.get_str(wellknown::NAME), Some("eng@example.com"));
        assert_eq!(object.get_str(attrs::NAME), Some("Engineering"));
        assert_eq!(
            object.get_str(wellknown::DESCRIPTION),
            Some("All engineers")
        );
    }

    #[test]
    fn update_payload_is_none_without_mapped_fields() {
        assert!(update_payload(&AttributeSet::new()).is_none());
        let payload =
            update_payload(&AttributeSet::new().with(attrs::NAME, "Platform")).unwrap();
        assert_eq!(payload[attrs::NAME], json!("Platform"));
    }

    #[test]
    fn member_listing_keys_on_user() {
        let request = list_for_member_request(&config(), "alice@example.com", None);
        let query: std::collections::HashMap<_, _> = request.query.into_iter().collect();
        assert_eq!(query["userKey"], "alice@example.com");
        assert_eq!(query["fields"], "nextPageToken,groups(email)");
        assert!(!query.contains_key("customer"));
        assert!(!query.contains_key("domain"));
    }

    #[test]
    fn configured_domain_scopes_member_listing() {
        let config = GoogleAppsConfig::builder().domain("example.com").build().unwrap();
        let request = list_for_member_request(&config, "alice@example.com", None);
        let query: std::collections::HashMap<_, _> = request.query.into_iter().collect();
        assert_eq!(query["domain"], "example.com");
    }

    #[test]
    fn customer_listing_wraps_field_mask() {
        let page = PageOptions::sized(50);
        let request = list_request(&config(), &page, Some("email,etag,id"), None);
        let query: std::collections::HashMap<_, _> = request.query.into_iter().collect();
        assert_eq!(query["customer"], "my_customer");
        assert_eq!(query["maxResults"], "50");
        assert_eq!(query["fields"], "nextPageToken,groups(email,etag,id)");
    }
}
