//! Composite remote identities.
//!
//! Group members and license assignments have no single remote
//! identifier; their Uids are slash-delimited composites. These types
//! make construction validated and rendering canonical.

use std::fmt;
use std::str::FromStr;

use idmesh_connector::error::{ConnectorError, ConnectorResult};
use idmesh_connector::operation::Uid;

/// Identity of a group membership: `group/member`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberId {
    /// Group key (id or email).
    pub group: String,
    /// Member key (id or email).
    pub member: String,
}

impl MemberId {
    /// Build from validated parts.
    pub fn new(group: impl Into<String>, member: impl Into<String>) -> ConnectorResult<Self> {
        let id = Self {
            group: group.into(),
            member: member.into(),
        };
        if id.group.is_empty() || id.member.is_empty() {
            return Err(ConnectorError::invalid_data(
                "member identity requires a group and a member key",
            ));
        }
        Ok(id)
    }

    /// Parse a `group/member` composite.
    pub fn parse(value: &str) -> ConnectorResult<Self> {
        let mut parts = value.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(group), Some(member), None) if !group.is_empty() && !member.is_empty() => {
                Ok(Self {
                    group: group.to_string(),
                    member: member.to_string(),
                })
            }
            _ => Err(ConnectorError::invalid_data(format!(
                "malformed member identity '{value}', expected group/member"
            ))),
        }
    }

    /// Render as a Uid.
    pub fn to_uid(&self) -> Uid {
        Uid::new(self.to_string())
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.group, self.member)
    }
}

impl FromStr for MemberId {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Identity of a license assignment: `product/sku/user`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LicenseId {
    /// Licensed product.
    pub product: String,
    /// Product SKU.
    pub sku: String,
    /// Assigned user (id or primary email).
    pub user: String,
}

impl LicenseId {
    /// Build from validated parts.
    pub fn new(
        product: impl Into<String>,
        sku: impl Into<String>,
        user: impl Into<String>,
    ) -> ConnectorResult<Self> {
        let id = Self {
            product: product.into(),
            sku: sku.into(),
            user: user.into(),
        };
        if id.product.is_empty() || id.sku.is_empty() || id.user.is_empty() {
            return Err(ConnectorError::invalid_data(
                "license identity requires product, sku and user",
            ));
        }
        Ok(id)
    }

    /// Parse a `product/sku/user` composite.
    pub fn parse(value: &str) -> ConnectorResult<Self> {
        let mut parts = value.split('/');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(product), Some(sku), Some(user), None)
                if !product.is_empty() && !sku.is_empty() && !user.is_empty() =>
            {
                Ok(Self {
                    product: product.to_string(),
                    sku: sku.to_string(),
                    user: user.to_string(),
                })
            }
            _ => Err(ConnectorError::invalid_data(format!(
                "malformed license identity '{value}', expected product/sku/user"
            ))),
        }
    }

    /// Render as a Uid.
    pub fn to_uid(&self) -> Uid {
        Uid::new(self.to_string())
    }
}

impl fmt::Display for LicenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.product, self.sku, self.user)
    }
}

impl FromStr for LicenseId {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_id_round_trip() {
        let id = MemberId::parse("eng@example.com/alice@example.com").unwrap();
        assert_eq!(id.group, "eng@example.com");
        assert_eq!(id.member, "alice@example.com");
        assert_eq!(id.to_string(), "eng@example.com/alice@example.com");
        assert_eq!(id.to_uid().value(), "eng@example.com/alice@example.com");
    }

    #[test]
    fn member_id_rejects_wrong_arity() {
        assert!(MemberId::parse("just-a-group").is_err());
        assert!(MemberId::parse("a/b/c").is_err());
        assert!(MemberId::parse("/member").is_err());
        assert!(MemberId::parse("group/").is_err());
        assert!(MemberId::new("", "m").is_err());
    }

    #[test]
    fn license_id_round_trip() {
        let id = LicenseId::parse("Google-Apps/Google-Apps-For-Business/alice@example.com")
            .unwrap();
        assert_eq!(id.product, "Google-Apps");
        assert_eq!(id.sku, "Google-Apps-For-Business");
        assert_eq!(id.user, "alice@example.com");
        assert_eq!(
            id.to_string(),
            "Google-Apps/Google-Apps-For-Business/alice@example.com"
        );
    }

    #[test]
    fn license_id_rejects_wrong_arity() {
        assert!(LicenseId::parse("product/sku").is_err());
        assert!(LicenseId::parse("p/s/u/extra").is_err());
        assert!(LicenseId::parse("p//u").is_err());
        assert!(LicenseId::new("p", "s", "").is_err());
    }
}
