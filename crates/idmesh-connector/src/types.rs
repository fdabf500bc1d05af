//! Directory object types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The object types a directory connector operates on.
///
/// Every operation dispatches on this enum; there is no fallback path
/// for unrecognized object classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    /// A user account.
    Account,
    /// A group.
    Group,
    /// A group membership entry.
    Member,
    /// An organizational unit.
    OrgUnit,
    /// A product license assigned to an account.
    LicenseAssignment,
}

impl ObjectType {
    /// All object types, in dispatch order.
    pub const ALL: [ObjectType; 5] = [
        ObjectType::Account,
        ObjectType::Group,
        ObjectType::Member,
        ObjectType::OrgUnit,
        ObjectType::LicenseAssignment,
    ];

    /// Stable name for logs and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Group => "group",
            Self::Member => "member",
            Self::OrgUnit => "org_unit",
            Self::LicenseAssignment => "license_assignment",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "account" => Ok(Self::Account),
            "group" => Ok(Self::Group),
            "member" => Ok(Self::Member),
            "org_unit" => Ok(Self::OrgUnit),
            "license_assignment" => Ok(Self::LicenseAssignment),
            other => Err(format!("unknown object type: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_round_trips_through_from_str() {
        for ty in ObjectType::ALL {
            let parsed: ObjectType = ty.to_string().parse().unwrap();
            assert_eq!(parsed, ty);
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert!("role".parse::<ObjectType>().is_err());
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&ObjectType::OrgUnit).unwrap();
        assert_eq!(json, "\"org_unit\"");
    }
}
