//! Custom user schema descriptors.
//!
//! Workspace tenants can extend the user object with custom schemas.
//! The connector is told about them through a JSON descriptor in the
//! configuration; each leaf field surfaces as a qualified attribute
//! named `Schema.field`.

use serde::Deserialize;
use serde_json::Value;

use idmesh_connector::error::{ConnectorError, ConnectorResult};
use idmesh_connector::operation::AttributeValue;

/// One custom schema (or nested field) from the descriptor JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomSchema {
    /// Schema or field name.
    pub name: String,
    /// Field type as declared in the descriptor (`object` marks a
    /// schema containing fields).
    #[serde(rename = "type")]
    pub field_type: String,
    /// Nested fields, for `object`-typed entries.
    #[serde(default, rename = "innerSchemas")]
    pub inner_schemas: Vec<CustomSchema>,
}

/// Parse the configured descriptor JSON.
pub fn parse_descriptor(json: &str) -> ConnectorResult<Vec<CustomSchema>> {
    serde_json::from_str(json).map_err(|e| ConnectorError::InvalidConfiguration {
        message: format!("custom schema descriptor does not parse: {e}"),
    })
}

/// Qualified `Schema.field` attribute names for every leaf field.
pub fn qualified_names(schemas: &[CustomSchema]) -> Vec<String> {
    let mut names = Vec::new();
    for schema in schemas {
        for field in &schema.inner_schemas {
            names.push(format!("{}.{}", schema.name, field.name));
        }
    }
    names
}

/// Extract the value of a qualified custom attribute from a raw user
/// payload. Absent schema or field yields the explicit null value.
pub fn extract_value(qualified: &str, user: &Value) -> AttributeValue {
    let Some((schema, field)) = qualified.split_once('.') else {
        return AttributeValue::Null;
    };
    user.get("customSchemas")
        .and_then(|cs| cs.get(schema))
        .and_then(|s| s.get(field))
        .cloned()
        .map_or(AttributeValue::Null, AttributeValue::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn descriptor() -> Vec<CustomSchema> {
        parse_descriptor(
            r#"[
                {
                    "name": "EmployeeData",
                    "type": "object",
                    "innerSchemas": [
                        {"name": "costCenter", "type": "string"},
                        {"name": "badgeNumber", "type": "int64"}
                    ]
                }
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn qualified_names_join_schema_and_field() {
        let names = qualified_names(&descriptor());
        assert_eq!(names, vec!["EmployeeData.costCenter", "EmployeeData.badgeNumber"]);
    }

    #[test]
    fn malformed_descriptor_is_a_config_error() {
        let err = parse_descriptor("{not json").unwrap_err();
        assert_eq!(err.error_code(), "invalid_configuration");
    }

    #[test]
    fn extract_present_value() {
        let user = json!({
            "primaryEmail": "alice@example.com",
            "customSchemas": {
                "EmployeeData": {"costCenter": "CC-7"}
            }
        });
        assert_eq!(
            extract_value("EmployeeData.costCenter", &user),
            AttributeValue::String("CC-7".into())
        );
    }

    #[test]
    fn absent_schema_or_field_is_explicit_null() {
        let user = json!({"primaryEmail": "alice@example.com"});
        assert!(extract_value("EmployeeData.costCenter", &user).is_null());

        let user = json!({"customSchemas": {"EmployeeData": {}}});
        assert!(extract_value("EmployeeData.badgeNumber", &user).is_null());
    }
}
