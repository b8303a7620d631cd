#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    /// A mutation was rejected because it would break a structural
    /// invariant of the edited tree. The tree is left unchanged.
    #[error("Structural error: {0}")]
    Structural(String),

    /// One or more validation failures, in evaluation order.
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a validation failure carrying a single message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(vec![message.into()])
    }

    /// Shorthand for a rejected structural mutation.
    pub fn structural(message: impl Into<String>) -> Self {
        Self::Structural(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_display_joins_messages() {
        let err = CoreError::Validation(vec!["first".into(), "second".into()]);
        assert_eq!(err.to_string(), "Validation failed: first; second");
    }

    #[test]
    fn structural_display() {
        let err = CoreError::structural("Assessment must have at least one stage");
        assert_eq!(
            err.to_string(),
            "Structural error: Assessment must have at least one stage"
        );
    }
}
