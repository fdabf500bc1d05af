//! Group membership reconciliation.
//!
//! Pure diffing between a desired and a current membership list.
//! Members are keyed by case-insensitively folded email; role
//! comparison is exact. Application order (adds, then role patches,
//! then removes) is the connector's responsibility.

use std::collections::HashMap;

use idmesh_connector::error::{ConnectorError, ConnectorResult};
use idmesh_connector::operation::{wellknown, AttributeValue};

use crate::attrs;

/// One group member in the abstract model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMember {
    /// Member email.
    pub email: String,
    /// Member role (`OWNER`, `MANAGER` or `MEMBER`).
    pub role: String,
}

impl GroupMember {
    /// Member with an explicit role.
    pub fn new(email: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            role: role.into(),
        }
    }

    /// Member with the default role.
    pub fn member(email: impl Into<String>) -> Self {
        Self::new(email, attrs::DEFAULT_ROLE)
    }
}

fn fold(email: &str) -> String {
    email.to_lowercase()
}

/// Outcome of diffing desired against current membership.
#[derive(Debug, Default, PartialEq)]
pub struct MembershipDiff {
    /// Members to insert.
    pub to_add: Vec<GroupMember>,
    /// Emails already present with the right role.
    pub to_keep: Vec<String>,
    /// Members present but with a different role.
    pub to_patch_role: Vec<GroupMember>,
    /// Emails to remove (current-side casing).
    pub to_remove: Vec<String>,
}

/// Diff desired members against current members.
///
/// An empty desired list removes everything.
pub fn diff_members(desired: &[GroupMember], current: &[GroupMember]) -> MembershipDiff {
    let current_by_email: HashMap<String, &GroupMember> =
        current.iter().map(|m| (fold(&m.email), m)).collect();
    let desired_keys: HashMap<String, ()> =
        desired.iter().map(|m| (fold(&m.email), ())).collect();

    let mut diff = MembershipDiff::default();
    for member in desired {
        match current_by_email.get(&fold(&member.email)) {
            Some(existing) if existing.role == member.role => {
                diff.to_keep.push(member.email.clone());
            }
            Some(_) => diff.to_patch_role.push(member.clone()),
            None => diff.to_add.push(member.clone()),
        }
    }
    for member in current {
        if !desired_keys.contains_key(&fold(&member.email)) {
            diff.to_remove.push(member.email.clone());
        }
    }
    diff
}

/// Plain-value diff, used for an account's group list.
#[derive(Debug, Default, PartialEq)]
pub struct ValueDiff {
    /// Values to add.
    pub to_add: Vec<String>,
    /// Values already present.
    pub to_keep: Vec<String>,
    /// Values to remove (current-side casing).
    pub to_remove: Vec<String>,
}

/// Diff desired values against current values, case-insensitively.
pub fn diff_values(desired: &[String], current: &[String]) -> ValueDiff {
    let current_keys: HashMap<String, ()> =
        current.iter().map(|v| (fold(v), ())).collect();
    let desired_keys: HashMap<String, ()> =
        desired.iter().map(|v| (fold(v), ())).collect();

    let mut diff = ValueDiff::default();
    for value in desired {
        if current_keys.contains_key(&fold(value)) {
            diff.to_keep.push(value.clone());
        } else {
            diff.to_add.push(value.clone());
        }
    }
    for value in current {
        if !desired_keys.contains_key(&fold(value)) {
            diff.to_remove.push(value.clone());
        }
    }
    diff
}

/// Parse a desired `__MEMBERS__` attribute value.
///
/// Entries must be maps; an entry's `email` names the member and its
/// optional `role` overrides the default. Entries without an email are
/// skipped. Explicit null clears the membership.
pub fn members_from_attribute(value: &AttributeValue) -> ConnectorResult<Vec<GroupMember>> {
    let entries = match value {
        AttributeValue::Null => return Ok(Vec::new()),
        AttributeValue::Array(entries) => entries,
        _ => {
            return Err(ConnectorError::invalid_attribute(
                wellknown::MEMBERS,
                "expected a list of member entries",
            ))
        }
    };

    let mut members = Vec::new();
    for entry in entries {
        let AttributeValue::Object(map) = entry else {
            return Err(ConnectorError::invalid_attribute(
                wellknown::MEMBERS,
                "member entries must be maps",
            ));
        };
        let Some(email) = map.get(attrs::EMAIL).and_then(|v| v.as_str()) else {
            continue;
        };
        let role = map
            .get(attrs::ROLE)
            .and_then(|v| v.as_str())
            .unwrap_or(attrs::DEFAULT_ROLE);
        members.push(GroupMember::new(email, role));
    }
    Ok(members)
}

/// Parse a desired group-list attribute value.
///
/// Entries must be strings (group emails or ids). Explicit null clears
/// every membership.
pub fn groups_from_attribute(value: &AttributeValue) -> ConnectorResult<Vec<String>> {
    let entries = match value {
        AttributeValue::Null => return Ok(Vec::new()),
        AttributeValue::Array(entries) => entries,
        _ => {
            return Err(ConnectorError::invalid_attribute(
                wellknown::GROUPS,
                "expected a list of group keys",
            ))
        }
    };
    entries
        .iter()
        .map(|entry| {
            entry.as_str().map(String::from).ok_or_else(|| {
                ConnectorError::invalid_attribute(
                    wellknown::GROUPS,
                    "group entries must be strings",
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn m(email: &str, role: &str) -> GroupMember {
        GroupMember::new(email, role)
    }

    #[test]
    fn disjoint_lists_add_and_remove() {
        let diff = diff_members(
            &[m("alice@example.com", "MEMBER")],
            &[m("bob@example.com", "MEMBER")],
        );
        assert_eq!(diff.to_add, vec![m("alice@example.com", "MEMBER")]);
        assert_eq!(diff.to_remove, vec!["bob@example.com".to_string()]);
        assert!(diff.to_keep.is_empty());
        assert!(diff.to_patch_role.is_empty());
    }

    #[test]
    fn same_member_same_role_is_kept() {
        let diff = diff_members(
            &[m("alice@example.com", "MEMBER")],
            &[m("alice@example.com", "MEMBER")],
        );
        assert_eq!(diff.to_keep, vec!["alice@example.com".to_string()]);
        assert!(diff.to_add.is_empty());
        assert!(diff.to_remove.is_empty());
    }

    #[test]
    fn email_match_is_case_insensitive() {
        let diff = diff_members(
            &[m("Alice@Example.com", "MEMBER")],
            &[m("alice@example.com", "MEMBER")],
        );
        assert_eq!(diff.to_keep, vec!["Alice@Example.com".to_string()]);
        assert!(diff.to_add.is_empty());
        assert!(diff.to_remove.is_empty());
    }

    #[test]
    fn role_change_patches_instead_of_readding() {
        let diff = diff_members(
            &[m("alice@example.com", "OWNER")],
            &[m("alice@example.com", "MEMBER")],
        );
        assert_eq!(diff.to_patch_role, vec![m("alice@example.com", "OWNER")]);
        assert!(diff.to_add.is_empty());
        assert!(diff.to_remove.is_empty());
    }

    #[test]
    fn empty_desired_clears_the_group() {
        let diff = diff_members(
            &[],
            &[m("alice@example.com", "OWNER"), m("bob@example.com", "MEMBER")],
        );
        assert_eq!(
            diff.to_remove,
            vec!["alice@example.com".to_string(), "bob@example.com".to_string()]
        );
        assert!(diff.to_add.is_empty());
    }

    #[test]
    fn value_diff_folds_case() {
        let diff = diff_values(
            &["Eng@example.com".to_string(), "new@example.com".to_string()],
            &["eng@example.com".to_string(), "old@example.com".to_string()],
        );
        assert_eq!(diff.to_keep, vec!["Eng@example.com".to_string()]);
        assert_eq!(diff.to_add, vec!["new@example.com".to_string()]);
        assert_eq!(diff.to_remove, vec!["old@example.com".to_string()]);
    }

    #[test]
    fn members_attribute_parses_roles_and_defaults() {
        let value = AttributeValue::from(json!([
            {"email": "alice@example.com", "role": "OWNER"},
            {"email": "bob@example.com"}
        ]));
        let members = members_from_attribute(&value).unwrap();
        assert_eq!(
            members,
            vec![m("alice@example.com", "OWNER"), m("bob@example.com", "MEMBER")]
        );
    }

    #[test]
    fn members_attribute_skips_entries_without_email() {
        let value = AttributeValue::from(json!([{"role": "OWNER"}]));
        assert!(members_from_attribute(&value).unwrap().is_empty());
    }

    #[test]
    fn members_attribute_rejects_non_map_entries() {
        let value = AttributeValue::from(json!(["alice@example.com"]));
        let err = members_from_attribute(&value).unwrap_err();
        assert_eq!(err.error_code(), "invalid_attribute_value");
    }

    #[test]
    fn null_members_attribute_clears() {
        assert!(members_from_attribute(&AttributeValue::Null).unwrap().is_empty());
    }

    #[test]
    fn groups_attribute_parses_strings_only() {
        let value = AttributeValue::from(json!(["eng@example.com", "ops@example.com"]));
        assert_eq!(
            groups_from_attribute(&value).unwrap(),
            vec!["eng@example.com".to_string(), "ops@example.com".to_string()]
        );

        let bad = AttributeValue::from(json!([{"email": "eng@example.com"}]));
        assert_eq!(
            groups_from_attribute(&bad).unwrap_err().error_code(),
            "invalid_attribute_value"
        );

        assert!(groups_from_attribute(&AttributeValue::Null).unwrap().is_empty());
    }
}
