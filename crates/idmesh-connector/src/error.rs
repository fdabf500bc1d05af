//! Connector error taxonomy.
//!
//! Every fallible connector operation returns [`ConnectorResult`]. The
//! variants distinguish the conditions callers react to differently:
//! missing objects, duplicates, invalid input, unavailable targets and
//! exhausted retry budgets.

use thiserror::Error;

use crate::types::ObjectType;

/// Result alias for connector operations.
pub type ConnectorResult<T> = Result<T, ConnectorError>;

/// Errors returned by connector operations.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// The referenced remote object does not exist.
    #[error("object not found: {identifier}")]
    ObjectNotFound {
        /// Identifier of the missing object.
        identifier: String,
    },

    /// A create (or membership add) collided with an existing object.
    #[error("object already exists: {identifier}")]
    ObjectAlreadyExists {
        /// Identifier of the conflicting object.
        identifier: String,
    },

    /// An attribute value failed type or shape validation.
    #[error("invalid value for attribute '{attribute}': {message}")]
    InvalidAttributeValue {
        /// Name of the offending attribute.
        attribute: String,
        /// What was wrong with it.
        message: String,
    },

    /// Malformed input: bad filter value, page size, composite identity.
    #[error("invalid data: {message}")]
    InvalidData {
        /// Description of the problem.
        message: String,
    },

    /// The filter shape cannot be translated for this object type.
    #[error("unsupported filter for {object_type}: {message}")]
    UnsupportedFilter {
        /// Object type the search targeted.
        object_type: ObjectType,
        /// Why the filter is not translatable.
        message: String,
    },

    /// The target system declared itself unavailable.
    #[error("target unavailable: {message}")]
    TargetUnavailable {
        /// Message from the target.
        message: String,
    },

    /// Network-level failure that survived the retry budget.
    #[error("connection failed: {message}")]
    ConnectionFailed {
        /// Description of the failure.
        message: String,
    },

    /// The retry budget was consumed without a conclusive response.
    #[error("retries exhausted after {attempts} attempts")]
    RetryExhausted {
        /// Number of retry attempts made.
        attempts: u32,
    },

    /// Connector configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        /// What failed validation.
        message: String,
    },

    /// Unclassified remote failure.
    #[error("operation failed: {message}")]
    OperationFailed {
        /// Description of the failure.
        message: String,
    },

    /// Payload could not be serialized or deserialized.
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of the failure.
        message: String,
    },
}

impl ConnectorError {
    /// Whether the condition may clear if the whole operation is re-driven.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::TargetUnavailable { .. } | Self::ConnectionFailed { .. }
        )
    }

    /// Stable machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ObjectNotFound { .. } => "object_not_found",
            Self::ObjectAlreadyExists { .. } => "object_already_exists",
            Self::InvalidAttributeValue { .. } => "invalid_attribute_value",
            Self::InvalidData { .. } => "invalid_data",
            Self::UnsupportedFilter { .. } => "unsupported_filter",
            Self::TargetUnavailable { .. } => "target_unavailable",
            Self::ConnectionFailed { .. } => "connection_failed",
            Self::RetryExhausted { .. } => "retry_exhausted",
            Self::InvalidConfiguration { .. } => "invalid_configuration",
            Self::OperationFailed { .. } => "operation_failed",
            Self::Serialization { .. } => "serialization_error",
        }
    }

    /// Build an [`ObjectNotFound`](Self::ObjectNotFound).
    pub fn not_found(identifier: impl Into<String>) -> Self {
        Self::ObjectNotFound {
            identifier: identifier.into(),
        }
    }

    /// Build an [`ObjectAlreadyExists`](Self::ObjectAlreadyExists).
    pub fn already_exists(identifier: impl Into<String>) -> Self {
        Self::ObjectAlreadyExists {
            identifier: identifier.into(),
        }
    }

    /// Build an [`InvalidAttributeValue`](Self::InvalidAttributeValue).
    pub fn invalid_attribute(
        attribute: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidAttributeValue {
            attribute: attribute.into(),
            message: message.into(),
        }
    }

    /// Build an [`InvalidData`](Self::InvalidData).
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Build an [`OperationFailed`](Self::OperationFailed).
    pub fn operation_failed(message: impl Into<String>) -> Self {
        Self::OperationFailed {
            message: message.into(),
        }
    }

    /// Build a [`Serialization`](Self::Serialization) from a source error.
    pub fn serialization(source: impl std::fmt::Display) -> Self {
        Self::Serialization {
            message: source.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors() {
        assert!(ConnectorError::TargetUnavailable {
            message: "backend down".into()
        }
        .is_transient());
        assert!(ConnectorError::ConnectionFailed {
            message: "reset".into()
        }
        .is_transient());
    }

    #[test]
    fn terminal_errors() {
        assert!(!ConnectorError::not_found("user-1").is_transient());
        assert!(!ConnectorError::already_exists("user-1").is_transient());
        assert!(!ConnectorError::RetryExhausted { attempts: 5 }.is_transient());
        assert!(!ConnectorError::invalid_data("bad page size").is_transient());
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(
            ConnectorError::not_found("x").error_code(),
            "object_not_found"
        );
        assert_eq!(
            ConnectorError::RetryExhausted { attempts: 5 }.error_code(),
            "retry_exhausted"
        );
        assert_eq!(
            ConnectorError::UnsupportedFilter {
                object_type: ObjectType::Member,
                message: "nested And".into()
            }
            .error_code(),
            "unsupported_filter"
        );
    }

    #[test]
    fn display_includes_context() {
        let err = ConnectorError::invalid_attribute("aliases", "entry must be a string");
        assert_eq!(
            err.to_string(),
            "invalid value for attribute 'aliases': entry must be a string"
        );

        let err = ConnectorError::RetryExhausted { attempts: 5 };
        assert_eq!(err.to_string(), "retries exhausted after 5 attempts");
    }
}
