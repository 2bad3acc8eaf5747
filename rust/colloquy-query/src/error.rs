//! Error types for schema loading.

use thiserror::Error;

/// Errors that can occur while loading or validating a [`crate::Schema`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// The schema document could not be deserialized
    #[error("Malformed schema: {message}")]
    Malformed { message: String },

    /// Two entities were declared under the same name
    #[error("Entity {entity:?} is declared more than once")]
    DuplicateEntity { entity: String },

    /// Two attributes of one entity share a name
    #[error("Attribute {attribute:?} is declared more than once on {entity:?}")]
    DuplicateAttribute { entity: String, attribute: String },

    /// A link attribute points at an entity the schema does not declare
    #[error("Link {entity}.{attribute} targets unknown entity {target:?}")]
    UnknownLinkTarget {
        entity: String,
        attribute: String,
        target: String,
    },

    /// A primary key or present attribute names a missing attribute
    #[error("Entity {entity:?} refers to missing attribute {attribute:?}")]
    UnknownKeyAttribute { entity: String, attribute: String },
}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed {
            message: err.to_string(),
        }
    }
}
