//! Account mapping and Directory API user requests.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use serde_json::{json, Map, Value};

use idmesh_connector::error::{ConnectorError, ConnectorResult};
use idmesh_connector::operation::{wellknown, AttributeSet, AttributeValue, PageOptions};

use crate::attrs;
use crate::client::ApiRequest;
use crate::config::GoogleAppsConfig;
use crate::projection::{wants, AttrNames};
use crate::schema;

/// Boolean fields copied verbatim from the remote payload.
const BOOL_FIELDS: &[&str] = &[
    attrs::IS_ADMIN,
    attrs::IS_DELEGATED_ADMIN,
    attrs::AGREED_TO_TERMS,
    attrs::CHANGE_PASSWORD_AT_NEXT_LOGIN,
    attrs::IP_WHITELISTED,
    attrs::IS_MAILBOX_SETUP,
    attrs::INCLUDE_IN_GLOBAL_ADDRESS_LIST,
];

/// String fields copied verbatim (timestamps stay strings).
const STRING_FIELDS: &[&str] = &[
    attrs::LAST_LOGIN_TIME,
    attrs::CREATION_TIME,
    attrs::DELETION_TIME,
    attrs::SUSPENSION_REASON,
    attrs::ORG_UNIT_PATH,
    attrs::THUMBNAIL_PHOTO_URL,
    attrs::CUSTOMER_ID,
];

/// Multi-valued string fields.
const LIST_FIELDS: &[&str] = &[attrs::ALIASES, attrs::NON_EDITABLE_ALIASES];

/// Structured multi-valued fields passed through unchanged.
const STRUCT_FIELDS: &[&str] = &[
    attrs::IMS,
    attrs::EMAILS,
    attrs::EXTERNAL_IDS,
    attrs::RELATIONS,
    attrs::ADDRESSES,
    attrs::ORGANIZATIONS,
    attrs::PHONES,
];

fn users_url(config: &GoogleAppsConfig) -> String {
    format!("{}/users", config.directory_base_url)
}

fn user_url(config: &GoogleAppsConfig, user_key: &str) -> String {
    format!("{}/users/{}", config.directory_base_url, urlencoding::encode(user_key))
}

/// List users of the configured customer. `show_deleted` widens the
/// listing to recently deleted accounts.
pub(crate) fn list_request(
    config: &GoogleAppsConfig,
    page: &PageOptions,
    field_mask: Option<&str>,
    page_token: Option<String>,
    show_deleted: bool,
) -> ApiRequest {
    let mut request = ApiRequest::get(users_url(config))
        .param("customer", &config.customer_id)
        .param("projection", config.projection.as_str())
        .param_opt("showDeleted", show_deleted.then(|| "true".to_string()))
        .param_opt("pageToken", page_token)
        .param_opt("maxResults", page.page_size.map(|s| s.to_string()))
        .param_opt(
            "fields",
            field_mask.map(|mask| format!("nextPageToken,users({mask})")),
        );
    if let Some(sort_by) = &page.sort_by {
        request = request
            .param("orderBy", sort_by)
            .param("sortOrder", if page.ascending { "ASCENDING" } else { "DESCENDING" });
    }
    request
}

/// Fetch one user by id, primary email or alias.
pub(crate) fn get_request(
    config: &GoogleAppsConfig,
    user_key: &str,
    field_mask: Option<&str>,
) -> ApiRequest {
    ApiRequest::get(user_url(config, user_key))
        .param("projection", config.projection.as_str())
        .param_opt("fields", field_mask.map(String::from))
}

pub(crate) fn insert_request(config: &GoogleAppsConfig, payload: Value) -> ApiRequest {
    ApiRequest::post(users_url(config), payload)
}

pub(crate) fn patch_request(
    config: &GoogleAppsConfig,
    user_key: &str,
    payload: Value,
) -> ApiRequest {
    ApiRequest::patch(user_url(config, user_key), payload)
}

pub(crate) fn delete_request(config: &GoogleAppsConfig, user_key: &str) -> ApiRequest {
    ApiRequest::delete(user_url(config, user_key))
}

pub(crate) fn alias_insert_request(
    config: &GoogleAppsConfig,
    user_key: &str,
    alias: &str,
) -> ApiRequest {
    ApiRequest::post(
        format!("{}/aliases", user_url(config, user_key)),
        json!({ attrs::ALIAS: alias }),
    )
}

pub(crate) fn photo_update_request(
    config: &GoogleAppsConfig,
    user_key: &str,
    photo: &[u8],
) -> ApiRequest {
    ApiRequest::put(
        format!("{}/photos/thumbnail", user_url(config, user_key)),
        json!({ "photoData": URL_SAFE.encode(photo) }),
    )
}

pub(crate) fn make_admin_request(config: &GoogleAppsConfig, user_key: &str) -> ApiRequest {
    ApiRequest::post(
        format!("{}/makeAdmin", user_url(config, user_key)),
        json!({ "status": true }),
    )
}

/// Side effects a create may carry beyond the primary insert.
///
/// Everything here is validated before any remote call is issued, so a
/// bad alias or photo fails the create with zero remote effects.
#[derive(Debug, Default)]
pub(crate) struct CreateSideEffects {
    pub aliases: Vec<String>,
    pub photo: Option<Vec<u8>>,
    pub make_admin: bool,
}

/// Extract and validate an alias list. Used for accounts and groups.
pub(crate) fn alias_list(attributes: &AttributeSet) -> ConnectorResult<Vec<String>> {
    let Some(value) = attributes.get(attrs::ALIASES) else {
        return Ok(Vec::new());
    };
    let entries = value.as_array().ok_or_else(|| {
        ConnectorError::invalid_attribute(attrs::ALIASES, "expected a list of strings")
    })?;
    entries
        .iter()
        .map(|entry| {
            entry.as_str().map(String::from).ok_or_else(|| {
                ConnectorError::invalid_attribute(attrs::ALIASES, "alias entries must be strings")
            })
        })
        .collect()
}

pub(crate) fn validate_side_effects(attributes: &AttributeSet) -> ConnectorResult<CreateSideEffects> {
    let mut effects = CreateSideEffects {
        aliases: alias_list(attributes)?,
        ..CreateSideEffects::default()
    };

    if let Some(value) = attributes.get(wellknown::PHOTO) {
        match value {
            AttributeValue::Binary(bytes) => effects.photo = Some(bytes.clone()),
            _ => {
                return Err(ConnectorError::invalid_attribute(
                    wellknown::PHOTO,
                    "expected a byte blob",
                ))
            }
        }
    }

    effects.make_admin = attributes.get_bool(attrs::IS_ADMIN).unwrap_or(false);
    Ok(effects)
}

fn name_payload(attributes: &AttributeSet) -> Option<Value> {
    let mut name = Map::new();
    for part in [attrs::GIVEN_NAME, attrs::FAMILY_NAME, attrs::FULL_NAME] {
        if let Some(value) = attributes.get_str(part) {
            name.insert(part.to_string(), json!(value));
        }
    }
    (!name.is_empty()).then(|| Value::Object(name))
}

fn shared_payload(
    attributes: &AttributeSet,
    config: &GoogleAppsConfig,
) -> ConnectorResult<Map<String, Value>> {
    let mut payload = Map::new();

    if let Some(email) = attributes.get_str(wellknown::NAME) {
        payload.insert(attrs::PRIMARY_EMAIL.to_string(), json!(email));
    }
    if let Some(password) = attributes.get_str(wellknown::PASSWORD) {
        payload.insert(attrs::PASSWORD.to_string(), json!(password));
    }
    if let Some(enabled) = attributes.get_bool(wellknown::ENABLE) {
        payload.insert(attrs::SUSPENDED.to_string(), json!(!enabled));
    }
    if let Some(name) = name_payload(attributes) {
        payload.insert(attrs::NAME.to_string(), name);
    }
    if let Some(path) = attributes.get_str(attrs::ORG_UNIT_PATH) {
        payload.insert(attrs::ORG_UNIT_PATH.to_string(), json!(path));
    }
    for field in [
        attrs::CHANGE_PASSWORD_AT_NEXT_LOGIN,
        attrs::IP_WHITELISTED,
        attrs::INCLUDE_IN_GLOBAL_ADDRESS_LIST,
    ] {
        if let Some(flag) = attributes.get_bool(field) {
            payload.insert(field.to_string(), json!(flag));
        }
    }
    for field in STRUCT_FIELDS {
        if let Some(value) = attributes.get(field) {
            payload.insert((*field).to_string(), value.clone().into());
        }
    }

    let schemas = config.custom_schemas()?;
    let mut custom = Map::new();
    for qualified in schema::qualified_names(&schemas) {
        let Some(value) = attributes.get(&qualified) else {
            continue;
        };
        // Qualified names always split; guarded by qualified_names().
        if let Some((schema_name, field)) = qualified.split_once('.') {
            custom
                .entry(schema_name.to_string())
                .or_insert_with(|| Value::Object(Map::new()))
                .as_object_mut()
                .map(|fields| fields.insert(field.to_string(), value.clone().into()));
        }
    }
    if !custom.is_empty() {
        payload.insert(attrs::CUSTOM_SCHEMAS.to_string(), Value::Object(custom));
    }

    Ok(payload)
}

/// Build the insert payload. The logical name and password are
/// mandatory on create.
pub(crate) fn create_payload(
    attributes: &AttributeSet,
    config: &GoogleAppsConfig,
) -> ConnectorResult<Value> {
    let payload = shared_payload(attributes, config)?;
    if !payload.contains_key(attrs::PRIMARY_EMAIL) {
        return Err(ConnectorError::invalid_attribute(
            wellknown::NAME,
            "account create requires a primary email",
        ));
    }
    if !payload.contains_key(attrs::PASSWORD) {
        return Err(ConnectorError::invalid_attribute(
            wellknown::PASSWORD,
            "account create requires a password",
        ));
    }
    Ok(Value::Object(payload))
}

/// Build the patch payload; `None` when no mapped field is present.
pub(crate) fn update_payload(
    attributes: &AttributeSet,
    config: &GoogleAppsConfig,
) -> ConnectorResult<Option<Value>> {
    let payload = shared_payload(attributes, config)?;
    Ok((!payload.is_empty()).then(|| Value::Object(payload)))
}

fn set_json_field(
    object: &mut AttributeSet,
    requested: Option<&AttrNames>,
    source: &Value,
    field: &str,
) {
    if wants(requested, field) {
        if let Some(value) = source.get(field) {
            object.set(field, AttributeValue::from(value.clone()));
        }
    }
}

/// Map a remote user payload into the abstract model.
pub(crate) fn to_object(
    user: &Value,
    requested: Option<&AttrNames>,
    config: &GoogleAppsConfig,
) -> ConnectorResult<AttributeSet> {
    let id = user
        .get(attrs::ID)
        .and_then(Value::as_str)
        .ok_or_else(|| ConnectorError::serialization("user payload has no id"))?;

    let mut object = AttributeSet::new().with(attrs::ID, id);
    if let Some(etag) = user.get(attrs::ETAG).and_then(Value::as_str) {
        object.set(attrs::ETAG, etag);
    }
    if let Some(email) = user.get(attrs::PRIMARY_EMAIL).and_then(Value::as_str) {
        object.set(wellknown::NAME, email);
    }
    if wants(requested, wellknown::ENABLE) {
        if let Some(suspended) = user.get(attrs::SUSPENDED).and_then(Value::as_bool) {
            object.set(wellknown::ENABLE, !suspended);
        }
    }

    // Composite name parts: absent parent object maps to explicit
    // nulls, so consumers can tell "no name" from "not requested".
    let name = user.get(attrs::NAME);
    for part in [attrs::GIVEN_NAME, attrs::FAMILY_NAME, attrs::FULL_NAME] {
        if wants(requested, part) {
            let value = name
                .and_then(|n| n.get(part))
                .and_then(Value::as_str)
                .map_or(AttributeValue::Null, AttributeValue::from);
            object.set(part, value);
        }
    }

    for field in BOOL_FIELDS.iter().chain(STRING_FIELDS).chain(LIST_FIELDS) {
        set_json_field(&mut object, requested, user, field);
    }
    for field in STRUCT_FIELDS {
        set_json_field(&mut object, requested, user, field);
    }

    let schemas = config.custom_schemas()?;
    for qualified in schema::qualified_names(&schemas) {
        if wants(requested, &qualified) {
            object.set(&qualified, schema::extract_value(&qualified, user));
        }
    }

    Ok(object)
}
