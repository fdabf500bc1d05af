//! License assignment mapping and Licensing API requests.
//!
//! Assignments are keyed by the [`LicenseId`] composite. A SKU change
//! is a patch against the current assignment; the identity moves with
//! it.

use serde_json::{json, Value};

use idmesh_connector::error::{ConnectorError, ConnectorResult};
use idmesh_connector::operation::{wellknown, AttributeSet, PageOptions};

use crate::attrs;
use crate::client::ApiRequest;
use crate::config::GoogleAppsConfig;
use crate::identity::LicenseId;
use crate::projection::{wants, AttrNames};

fn product_url(config: &GoogleAppsConfig, product: &str) -> String {
    format!(
        "{}/product/{}",
        config.licensing_base_url,
        urlencoding::encode(product)
    )
}

fn sku_url(config: &GoogleAppsConfig, product: &str, sku: &str) -> String {
    format!("{}/sku/{}", product_url(config, product), urlencoding::encode(sku))
}

fn assignment_url(config: &GoogleAppsConfig, id: &LicenseId) -> String {
    format!(
        "{}/user/{}",
        sku_url(config, &id.product, &id.sku),
        urlencoding::encode(&id.user)
    )
}

/// List every assignment of a product across its SKUs.
pub(crate) fn list_for_product_request(
    config: &GoogleAppsConfig,
    product: &str,
    page: &PageOptions,
    page_token: Option<String>,
) -> ApiRequest {
    ApiRequest::get(format!("{}/users", product_url(config, product)))
        .param("customerId", &config.customer_id)
        .param_opt("pageToken", page_token)
        .param_opt("maxResults", page.page_size.map(|s| s.to_string()))
}

/// List the assignments of one SKU.
pub(crate) fn list_for_sku_request(
    config: &GoogleAppsConfig,
    product: &str,
    sku: &str,
    page: &PageOptions,
    page_token: Option<String>,
) -> ApiRequest {
    ApiRequest::get(format!("{}/users", sku_url(config, product, sku)))
        .param("customerId", &config.customer_id)
        .param_opt("pageToken", page_token)
        .param_opt("maxResults", page.page_size.map(|s| s.to_string()))
}

pub(crate) fn get_request(config: &GoogleAppsConfig, id: &LicenseId) -> ApiRequest {
    ApiRequest::get(assignment_url(config, id))
}

pub(crate) fn insert_request(config: &GoogleAppsConfig, id: &LicenseId) -> ApiRequest {
    ApiRequest::post(
        format!("{}/user", sku_url(config, &id.product, &id.sku)),
        json!({ attrs::USER_ID: id.user }),
    )
}

/// Move an assignment to another SKU of the same product.
pub(crate) fn move_sku_request(
    config: &GoogleAppsConfig,
    current: &LicenseId,
    new_sku: &str,
) -> ApiRequest {
    ApiRequest::patch(
        assignment_url(config, current),
        json!({ attrs::SKU_ID: new_sku }),
    )
}

pub(crate) fn delete_request(config: &GoogleAppsConfig, id: &LicenseId) -> ApiRequest {
    ApiRequest::delete(assignment_url(config, id))
}

/// Map a remote assignment payload into the abstract model.
pub(crate) fn to_object(
    assignment: &Value,
    requested: Option<&AttrNames>,
) -> ConnectorResult<AttributeSet> {
    let part = |field: &str| {
        assignment
            .get(field)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                ConnectorError::serialization(format!("license payload has no {field}"))
            })
    };
    let id = LicenseId::new(
        part(attrs::PRODUCT_ID)?,
        part(attrs::SKU_ID)?,
        part(attrs::USER_ID)?,
    )?;

    let mut object = AttributeSet::new()
        .with(attrs::ID, id.to_string())
        .with(wellknown::NAME, id.to_string())
        .with(attrs::PRODUCT_ID, id.product.as_str())
        .with(attrs::SKU_ID, id.sku.as_str())
        .with(attrs::USER_ID, id.user.as_str());
    if let Some(etag) = assignment.get(attrs::ETAG).and_then(Value::as_str) {
        object.set(attrs::ETAG, etag);
    }
    if wants(requested, attrs::SELF_LINK) {
        if let Some(link) = assignment.get(attrs::SELF_LINK).and_then(Value::as_str) {
            object.set(attrs::SELF_LINK, link);
        }
    }
    Ok(object)
}

/// Assignment identity for a create: product falls back to the
/// configured default, SKU and user are mandatory.
pub(crate) fn create_identity(
    attributes: &AttributeSet,
    config: &GoogleAppsConfig,
) -> ConnectorResult<LicenseId> {
    let product = attributes
        .get_str(attrs::PRODUCT_ID)
        .map(str::to_string)
        .or_else(|| config.product_id.clone())
        .ok_or_else(|| {
            ConnectorError::invalid_attribute(
                attrs::PRODUCT_ID,
                "license create requires a product, none configured",
            )
        })?;
    let sku = attributes.get_str(attrs::SKU_ID).ok_or_else(|| {
        ConnectorError::invalid_attribute(attrs::SKU_ID, "license create requires a sku")
    })?;
    let user = attributes
        .get_str(attrs::USER_ID)
        .or_else(|| attributes.get_str(wellknown::NAME))
        .ok_or_else(|| {
            ConnectorError::invalid_attribute(attrs::USER_ID, "license create requires a user")
        })?;
    LicenseId::new(product, sku, user)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GoogleAppsConfig {
        GoogleAppsConfig::default()
    }

    fn sample_assignment() -> Value {
        json!({
            "productId": "Google-Apps",
            "skuId": "Google-Apps-For-Business",
            "userId": "alice@example.com",
            "etag": "\"etag-l\"",
            "selfLink": "https://licensing.googleapis.com/..."
        })
    }

    #[test]
    fn mapping_builds_composite_identity() {
        let object = to_object(&sample_assignment(), None).unwrap();
        assert_eq!(
            object.get_str(attrs::ID),
            Some("Google-Apps/Google-Apps-For-Business/alice@example.com")
        );
        assert_eq!(object.get_str(attrs::PRODUCT_ID), Some("Google-Apps"));
        assert_eq!(object.get_str(attrs::USER_ID), Some("alice@example.com"));
        assert!(object.get(attrs::SELF_LINK).is_some());
    }

    #[test]
    fn partial_payload_is_an_error() {
        let err = to_object(&json!({"productId": "Google-Apps"}), None).unwrap_err();
        assert_eq!(err.error_code(), "serialization_error");
    }

    #[test]
    fn create_identity_falls_back_to_configured_product() {
        let config = GoogleAppsConfig::builder()
            .licensing("Google-Apps", vec!["sku-1".to_string()])
            .build()
            .unwrap();
        let attributes = AttributeSet::new()
            .with(attrs::SKU_ID, "sku-1")
            .with(attrs::USER_ID, "alice@example.com");
        let id = create_identity(&attributes, &config).unwrap();
        assert_eq!(id.product, "Google-Apps");

        let err = create_identity(&attributes, &GoogleAppsConfig::default()).unwrap_err();
        assert_eq!(err.error_code(), "invalid_attribute_value");
    }

    #[test]
    fn insert_posts_the_user_under_the_sku() {
        let id = LicenseId::new("Google-Apps", "sku-1", "alice@example.com").unwrap();
        let request = insert_request(&config(), &id);
        assert!(request.url.ends_with("/product/Google-Apps/sku/sku-1/user"));
        assert_eq!(
            request.body.as_ref().unwrap()[attrs::USER_ID],
            json!("alice@example.com")
        );
    }

    #[test]
    fn move_sku_patches_the_current_assignment() {
        let id = LicenseId::new("Google-Apps", "sku-1", "alice@example.com").unwrap();
        let request = move_sku_request(&config(), &id, "sku-2");
        assert!(request
            .url
            .ends_with("/product/Google-Apps/sku/sku-1/user/alice%40example.com"));
        assert_eq!(request.body.as_ref().unwrap()[attrs::SKU_ID], json!("sku-2"));
    }

    #[test]
    fn listings_scope_by_product_or_sku() {
        let page = PageOptions::sized(10);
        let request = list_for_product_request(&config(), "Google-Apps", &page, None);
        assert!(request.url.ends_with("/product/Google-Apps/users"));

        let request = list_for_sku_request(&config(), "Google-Apps", "sku-1", &page, Some("t".into()));
        assert!(request.url.ends_with("/product/Google-Apps/sku/sku-1/users"));
        let query: std::collections::HashMap<_, _> = request.query.into_iter().collect();
        assert_eq!(query["pageToken"], "t");
        assert_eq!(query["customerId"], "my_customer");
    }
}
