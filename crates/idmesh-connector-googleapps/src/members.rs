//! Group member mapping and Directory API member requests.
//!
//! Members live under their group, so every request is keyed by the
//! owning group and the object identity is the [`MemberId`] composite.

use serde_json::{json, Value};

use idmesh_connector::error::{ConnectorError, ConnectorResult};
use idmesh_connector::operation::{wellknown, AttributeSet, PageOptions};

use crate::attrs;
use crate::client::ApiRequest;
use crate::config::GoogleAppsConfig;
use crate::identity::MemberId;
use crate::projection::{wants, AttrNames};

fn members_url(config: &GoogleAppsConfig, group_key: &str) -> String {
    format!(
        "{}/groups/{}/members",
        config.directory_base_url,
        urlencoding::encode(group_key)
    )
}

fn member_url(config: &GoogleAppsConfig, id: &MemberId) -> String {
    format!(
        "{}/{}",
        members_url(config, &id.group),
        urlencoding::encode(&id.member)
    )
}

/// List the members of one group, all roles included.
pub(crate) fn list_request(
    config: &GoogleAppsConfig,
    group_key: &str,
    page: &PageOptions,
    page_token: Option<String>,
) -> ApiRequest {
    ApiRequest::get(members_url(config, group_key))
        .param("roles", attrs::LIST_ROLES)
        .param_opt("pageToken", page_token)
        .param_opt("maxResults", page.page_size.map(|s| s.to_string()))
}

pub(crate) fn get_request(config: &GoogleAppsConfig, id: &MemberId) -> ApiRequest {
    ApiRequest::get(member_url(config, id))
}

pub(crate) fn insert_request(
    config: &GoogleAppsConfig,
    group_key: &str,
    email: &str,
    role: &str,
) -> ApiRequest {
    ApiRequest::post(
        members_url(config, group_key),
        json!({ attrs::EMAIL: email, attrs::ROLE: role }),
    )
}

/// Patch a member's role. Only the role is mutable.
pub(crate) fn patch_role_request(
    config: &GoogleAppsConfig,
    id: &MemberId,
    role: &str,
) -> ApiRequest {
    ApiRequest::patch(member_url(config, id), json!({ attrs::ROLE: role }))
        .param("fields", "email,etag")
}

pub(crate) fn delete_request(config: &GoogleAppsConfig, id: &MemberId) -> ApiRequest {
    ApiRequest::delete(member_url(config, id))
}

/// Map a remote member payload into the abstract model.
///
/// The member's own email is preferred as the composite key; the
/// remote id is the fallback for members without one.
pub(crate) fn to_object(
    group_key: &str,
    member: &Value,
    requested: Option<&AttrNames>,
) -> ConnectorResult<AttributeSet> {
    let key = member
        .get(attrs::EMAIL)
        .and_then(Value::as_str)
        .or_else(|| member.get(attrs::ID).and_then(Value::as_str))
        .ok_or_else(|| ConnectorError::serialization("member payload has no email or id"))?;
    let id = MemberId::new(group_key, key)?;

    let mut object = AttributeSet::new()
        .with(attrs::ID, id.to_string())
        .with(wellknown::NAME, id.to_string())
        .with(attrs::GROUP_KEY, group_key);
    if let Some(etag) = member.get(attrs::ETAG).and_then(Value::as_str) {
        object.set(attrs::ETAG, etag);
    }
    if let Some(email) = member.get(attrs::EMAIL).and_then(Value::as_str) {
        object.set(attrs::EMAIL, email);
    }
    for field in [attrs::ROLE, attrs::TYPE, attrs::STATUS] {
        if wants(requested, field) {
            if let Some(value) = member.get(field).and_then(Value::as_str) {
                object.set(field, value);
            }
        }
    }
    Ok(object)
}

/// Member attributes for a create: group key, email, optional role.
pub(crate) fn create_parts(
    attributes: &AttributeSet,
) -> ConnectorResult<(String, String, String)> {
    let group = attributes
        .get_str(attrs::GROUP_KEY)
        .ok_or_else(|| {
            ConnectorError::invalid_attribute(attrs::GROUP_KEY, "member create requires a group")
        })?
        .to_string();
    let email = attributes
        .get_str(attrs::EMAIL)
        .or_else(|| attributes.get_str(wellknown::NAME))
        .ok_or_else(|| {
            ConnectorError::invalid_attribute(attrs::EMAIL, "member create requires an email")
        })?
        .to_string();
    let role = attributes
        .get_str(attrs::ROLE)
        .unwrap_or(attrs::DEFAULT_ROLE)
        .to_string();
    Ok((group, email, role))
}

#[cfg(test)]
mod tests {
    use super::*;
    use idmesh_connector::types::ObjectType;

    fn config() -> GoogleAppsConfig {
        GoogleAppsConfig::default()
    }

    fn sample_member() -> Value {
        json!({
            "id": "mem-1",
            "etag": "\"etag-m\"",
            "email": "alice@example.com",
            "role": "OWNER",
            "type": "USER",
            "status": "ACTIVE"
        })
    }

    #[test]
    fn mapping_builds_composite_identity() {
        let object = to_object("eng@example.com", &sample_member(), None).unwrap();
        assert_eq!(
            object.get_str(attrs::ID),
            Some("eng@example.com/alice@example.com")
        );
        assert_eq!(
            object.get_str(wellknown::NAME),
            Some("eng@example.com/alice@example.com")
        );
        assert_eq!(object.get_str(attrs::GROUP_KEY), Some("eng@example.com"));
        assert_eq!(object.get_str(attrs::ROLE), Some("OWNER"));
        assert_eq!(object.get_str(attrs::STATUS), Some("ACTIVE"));
    }

    #[test]
    fn remote_id_is_the_fallback_key() {
        let member = json!({"id": "mem-2", "role": "MEMBER"});
        let object = to_object("eng@example.com", &member, None).unwrap();
        assert_eq!(object.get_str(attrs::ID), Some("eng@example.com/mem-2"));
        assert!(object.get(attrs::EMAIL).is_none());
    }

    #[test]
    fn keyless_member_is_an_error() {
        let err = to_object("eng@example.com", &json!({"role": "MEMBER"}), None).unwrap_err();
        assert_eq!(err.error_code(), "serialization_error");
    }

    #[test]
    fn requested_set_gates_role_and_status() {
        let requested =
            AttrNames::from_requested(ObjectType::Member, &[attrs::ROLE.to_string()]).unwrap();
        let object = to_object("eng@example.com", &sample_member(), Some(&requested)).unwrap();
        assert_eq!(object.get_str(attrs::ROLE), Some("OWNER"));
        assert!(object.get(attrs::STATUS).is_none());
        assert!(object.get(attrs::TYPE).is_none());
    }

    #[test]
    fn create_parts_default_the_role() {
        let attributes = AttributeSet::new()
            .with(attrs::GROUP_KEY, "eng@example.com")
            .with(attrs::EMAIL, "alice@example.com");
        let (group, email, role) = create_parts(&attributes).unwrap();
        assert_eq!(group, "eng@example.com");
        assert_eq!(email, "alice@example.com");
        assert_eq!(role, attrs::DEFAULT_ROLE);
    }

    #[test]
    fn create_parts_require_group_and_email() {
        let err = create_parts(&AttributeSet::new().with(attrs::EMAIL, "a@example.com"))
            .unwrap_err();
        assert_eq!(err.error_code(), "invalid_attribute_value");
        let err = create_parts(&AttributeSet::new().with(attrs::GROUP_KEY, "g@example.com"))
            .unwrap_err();
        assert_eq!(err.error_code(), "invalid_attribute_value");
    }

    #[test]
    fn list_request_includes_all_roles() {
        let request = list_request(&config(), "eng@example.com", &PageOptions::sized(25), None);
        let query: std::collections::HashMap<_, _> = request.query.into_iter().collect();
        assert_eq!(query["roles"], "OWNER,MANAGER,MEMBER");
        assert_eq!(query["maxResults"], "25");
        assert!(request.url.ends_with("/groups/eng%40example.com/members"));
    }

    #[test]
    fn member_urls_encode_both_keys() {
        let id = MemberId::new("eng@example.com", "alice@example.com").unwrap();
        let request = get_request(&config(), &id);
        assert!(request
            .url
            .ends_with("/groups/eng%40example.com/members/alice%40example.com"));
    }
}
