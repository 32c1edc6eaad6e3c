//! Error types for schema loading and transformation.

/// Errors raised while decoding or rewriting a schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The introspection result could not be decoded.
    #[error("Invalid introspection result: {0}")]
    Introspection(String),

    /// More than one field of a payload type qualifies as the wrapped field.
    #[error("Payload type {type_name} wraps more than one field: {}", fields.join(", "))]
    AmbiguousWrapper {
        type_name: String,
        fields: Vec<String>,
    },

    /// The schema already defines a subscription type that would be replaced.
    #[error("Schema already defines subscription type {0}")]
    SubscriptionConflict(String),

    /// The schema cache artifact could not be read or written.
    #[error("Schema cache error at {path}: {message}")]
    Cache { path: String, message: String },
}

impl SchemaError {
    #[must_use]
    pub fn cache(path: impl AsRef<std::path::Path>, message: impl ToString) -> Self {
        Self::Cache {
            path: path.as_ref().display().to_string(),
            message: message.to_string(),
        }
    }
}

/// Result type alias for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SchemaError::AmbiguousWrapper {
            type_name: "UpdatePostPayload".into(),
            fields: vec!["post".into(), "Post".into()],
        };
        assert_eq!(
            err.to_string(),
            "Payload type UpdatePostPayload wraps more than one field: post, Post"
        );

        let err = SchemaError::cache("/opt/lib/schema.json", "missing");
        assert!(err.to_string().contains("/opt/lib/schema.json"));
    }
}
