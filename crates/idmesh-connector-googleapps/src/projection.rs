//! Requested-attribute sets and server-side field masks.
//!
//! Two views of "which attributes does the caller want": [`AttrNames`]
//! gates which attributes the mappers populate, and [`field_mask`]
//! tells the remote API which fields to return at all. Both always
//! include the type's identifier and etag so every result can be
//! addressed and revision-checked.

use std::collections::{BTreeSet, HashSet};

use idmesh_connector::error::{ConnectorError, ConnectorResult};
use idmesh_connector::operation::wellknown;
use idmesh_connector::types::ObjectType;

use crate::attrs;
use crate::config::{GoogleAppsConfig, Projection};
use crate::schema;

/// Case-insensitive set of requested attribute names.
#[derive(Debug, Clone)]
pub struct AttrNames {
    names: HashSet<String>,
}

impl AttrNames {
    /// Normalize a requested-attribute list.
    ///
    /// Names are folded case-insensitively and trimmed to their first
    /// path segment; the identifier and etag of the object type are
    /// always included. Names starting with `/` or containing `(` are
    /// rejected.
    pub fn from_requested(
        object_type: ObjectType,
        requested: &[String],
    ) -> ConnectorResult<Self> {
        let mut names = HashSet::new();
        for name in requested {
            if name.starts_with('/') || name.contains('(') {
                return Err(ConnectorError::invalid_data(format!(
                    "malformed attribute name '{name}'"
                )));
            }
            let segment = name.split('/').next().unwrap_or(name);
            names.insert(segment.to_lowercase());
        }
        names.insert(identifier_field(object_type).to_lowercase());
        names.insert(attrs::ETAG.to_lowercase());
        Ok(Self { names })
    }

    /// Whether the attribute was requested.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name.to_lowercase())
    }
}

/// Whether an attribute should be populated given an optional
/// requested set (`None` means everything cheap).
pub fn wants(requested: Option<&AttrNames>, name: &str) -> bool {
    requested.map_or(true, |set| set.contains(name))
}

/// The field identifying objects of this type.
fn identifier_field(object_type: ObjectType) -> &'static str {
    match object_type {
        ObjectType::OrgUnit => attrs::ORG_UNIT_PATH,
        _ => attrs::ID,
    }
}

/// Fields every read of this type asks for.
fn base_fields(object_type: ObjectType) -> &'static [&'static str] {
    match object_type {
        ObjectType::Account => &[attrs::ID, attrs::ETAG, attrs::PRIMARY_EMAIL],
        ObjectType::Group => &[attrs::ID, attrs::ETAG, attrs::EMAIL],
        ObjectType::Member => &[attrs::EMAIL, attrs::ETAG],
        ObjectType::OrgUnit => &[attrs::ORG_UNIT_PATH, attrs::ETAG, attrs::NAME],
        ObjectType::LicenseAssignment => &[attrs::PRODUCT_ID, attrs::SKU_ID, attrs::USER_ID],
    }
}

/// Build the server-side field mask for a read of `object_type`.
///
/// `None` when no attributes were requested — the API then returns its
/// full default payload. Output is deduplicated and deterministically
/// ordered.
pub fn field_mask(
    object_type: ObjectType,
    requested: Option<&[String]>,
    config: &GoogleAppsConfig,
) -> ConnectorResult<Option<String>> {
    let Some(requested) = requested else {
        return Ok(None);
    };

    let custom_names: Vec<String> = if object_type == ObjectType::Account {
        let schemas = config.custom_schemas()?;
        schema::qualified_names(&schemas)
    } else {
        Vec::new()
    };

    let mut fields: BTreeSet<String> = base_fields(object_type)
        .iter()
        .map(ToString::to_string)
        .collect();

    for name in requested {
        if name.starts_with('/') || name.contains('(') {
            return Err(ConnectorError::invalid_data(format!(
                "malformed attribute name '{name}'"
            )));
        }
        // Custom schema leaves are not addressable individually; the
        // whole container is fetched under the full projection.
        if custom_names.iter().any(|c| c.eq_ignore_ascii_case(name)) {
            if config.projection == Projection::Full {
                fields.insert(attrs::CUSTOM_SCHEMAS.to_string());
            }
            continue;
        }
        // Requested names fold case-insensitively, same as AttrNames;
        // the mask keeps the API's canonical casing.
        let name_part = [attrs::GIVEN_NAME, attrs::FAMILY_NAME, attrs::FULL_NAME]
            .into_iter()
            .find(|part| part.eq_ignore_ascii_case(name));
        if let Some(part) = name_part {
            fields.insert(format!("{}/{part}", attrs::NAME));
        } else if name.eq_ignore_ascii_case(wellknown::DESCRIPTION) {
            fields.insert(attrs::DESCRIPTION.to_string());
        } else if name.eq_ignore_ascii_case(wellknown::ENABLE) {
            fields.insert(attrs::SUSPENDED.to_string());
        } else if wellknown::is_operational(name) {
            // Logical name is covered by the base fields; expensive
            // relationship attributes are not remote fields at all.
        } else {
            fields.insert(name.to_string());
        }
    }

    Ok(Some(
        fields.into_iter().collect::<Vec<_>>().join(","),
    ))
}
