//! Contract error types for the listings service
//!
//! These errors are transport-agnostic; the REST layer maps them to status codes.

use super::model::EntityKind;

/// Listings service domain errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListingsError {
    /// A referenced record (or, for unlink, the association itself) does not exist
    #[error("{resource} not found: {id}")]
    NotFound {
        /// Resource type name
        resource: String,
        /// Resource identifier
        id: String,
    },

    /// Request body is not a JSON object
    #[error("Not a JSON")]
    MalformedRequest,

    /// A required field is absent from the request body
    #[error("Missing {field}")]
    MissingField {
        /// Name of the missing field
        field: String,
    },

    /// A field is present but unusable
    #[error("{message}")]
    Validation {
        /// Validation error message
        message: String,
    },

    /// Storage failure; details are logged where it happened
    #[error("Internal error")]
    Internal,
}

impl ListingsError {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: kind.as_str().to_string(),
            id: id.into(),
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_match_wire_format() {
        assert_eq!(ListingsError::MalformedRequest.to_string(), "Not a JSON");
        assert_eq!(ListingsError::missing("name").to_string(), "Missing name");
        assert_eq!(
            ListingsError::not_found(EntityKind::Place, "42").to_string(),
            "Place not found: 42"
        );
    }
}
