//! Filter translation.
//!
//! Decides, per object type, whether a search filter resolves to a
//! direct point-read, a server-side scoped listing, or a full
//! enumeration. Unsupported shapes are rejected rather than filtered
//! client-side.

use idmesh_connector::error::{ConnectorError, ConnectorResult};
use idmesh_connector::operation::{wellknown, Filter};
use idmesh_connector::types::ObjectType;

use crate::attrs;
use crate::identity::MemberId;

/// Execution strategy for a search filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslatedFilter {
    /// Enumerate everything.
    All,
    /// Point-read by remote key.
    DirectKey(String),
    /// List the members of one group.
    MembersOf(String),
    /// List org units under a path. `/` scopes all descendants,
    /// any other path the children of that unit.
    OrgUnitScope(String),
}

/// Translate `filter` for `object_type`.
pub fn translate(
    object_type: ObjectType,
    filter: Option<&Filter>,
) -> ConnectorResult<TranslatedFilter> {
    let Some(filter) = filter else {
        return Ok(TranslatedFilter::All);
    };
    match object_type {
        ObjectType::Account | ObjectType::Group => translate_keyed(object_type, filter),
        ObjectType::OrgUnit => translate_org_unit(filter),
        ObjectType::Member => translate_member(filter),
        ObjectType::LicenseAssignment => translate_license(filter),
    }
}

fn key_value(attribute: &str, value: &str) -> ConnectorResult<String> {
    if value.trim().is_empty() {
        return Err(ConnectorError::invalid_data(format!(
            "blank filter value for attribute '{attribute}'"
        )));
    }
    Ok(value.to_string())
}

fn unsupported(object_type: ObjectType, message: impl Into<String>) -> ConnectorError {
    ConnectorError::UnsupportedFilter {
        object_type,
        message: message.into(),
    }
}

/// Accounts and groups are addressable by id, primary email or alias.
fn translate_keyed(object_type: ObjectType, filter: &Filter) -> ConnectorResult<TranslatedFilter> {
    match filter {
        Filter::Equals { attribute, value }
            if attribute == attrs::ID
                || attribute == wellknown::NAME
                || attribute == attrs::ALIASES =>
        {
            Ok(TranslatedFilter::DirectKey(key_value(attribute, value)?))
        }
        Filter::Equals { attribute, .. } => Err(unsupported(
            object_type,
            format!("equality on '{attribute}' is not addressable"),
        )),
        other => Err(unsupported(
            object_type,
            format!("filter shape {other:?} is not translatable"),
        )),
    }
}

fn translate_org_unit(filter: &Filter) -> ConnectorResult<TranslatedFilter> {
    match filter {
        Filter::Equals { attribute, value }
            if attribute == attrs::ID
                || attribute == wellknown::NAME
                || attribute == attrs::ORG_UNIT_PATH =>
        {
            Ok(TranslatedFilter::DirectKey(key_value(attribute, value)?))
        }
        Filter::StartsWith { attribute, value } if attribute == attrs::ORG_UNIT_PATH => {
            Ok(TranslatedFilter::OrgUnitScope(key_value(attribute, value)?))
        }
        other => Err(unsupported(
            ObjectType::OrgUnit,
            format!("filter shape {other:?} is not translatable"),
        )),
    }
}

/// A member key within a group: email, alias, id or the logical name.
fn is_member_key_attribute(attribute: &str) -> bool {
    attribute == attrs::EMAIL
        || attribute == attrs::ALIAS
        || attribute == attrs::ID
        || attribute == wellknown::NAME
}

fn translate_member(filter: &Filter) -> ConnectorResult<TranslatedFilter> {
    match filter {
        // A bare group key lists that group's members.
        Filter::Equals { attribute, value } if attribute == attrs::GROUP_KEY => {
            Ok(TranslatedFilter::MembersOf(key_value(attribute, value)?))
        }
        // A composite Uid is already a point-read key.
        Filter::Equals { attribute, value } if attribute == attrs::ID => {
            let id = MemberId::parse(value)?;
            Ok(TranslatedFilter::DirectKey(id.to_string()))
        }
        Filter::And { filters } => {
            let [a, b] = filters.as_slice() else {
                return Err(unsupported(
                    ObjectType::Member,
                    "member conjunction must have exactly two operands",
                ));
            };
            let mut group = None;
            let mut member = None;
            for operand in [a, b] {
                match operand {
                    Filter::Equals { attribute, value } if attribute == attrs::GROUP_KEY => {
                        group = Some(key_value(attribute, value)?);
                    }
                    Filter::Equals { attribute, value }
                        if is_member_key_attribute(attribute) =>
                    {
                        member = Some(key_value(attribute, value)?);
                    }
                    other => {
                        return Err(unsupported(
                            ObjectType::Member,
                            format!("operand {other:?} is not a member key"),
                        ))
                    }
                }
            }
            match (group, member) {
                (Some(group), Some(member)) => Ok(TranslatedFilter::DirectKey(
                    MemberId::new(group, member)?.to_string(),
                )),
                _ => Err(unsupported(
                    ObjectType::Member,
                    "member conjunction requires a group key and a member key",
                )),
            }
        }
        other => Err(unsupported(
            ObjectType::Member,
            format!("filter shape {other:?} is not translatable"),
        )),
    }
}

fn translate_license(filter: &Filter) -> ConnectorResult<TranslatedFilter> {
    match filter {
        Filter::Equals { attribute, value } if attribute == attrs::ID => {
            Ok(TranslatedFilter::DirectKey(key_value(attribute, value)?))
        }
        other => Err(unsupported(
            ObjectType::LicenseAssignment,
            format!("filter shape {other:?} is not translatable"),
        )),
    }
}
