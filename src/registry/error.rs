//! Error types for the function registry.

use thiserror::Error;

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A function with the same name is already registered.
    #[error("Function '{0}' already registered")]
    Conflict(String),

    /// The function name is empty or contains whitespace.
    #[error("Invalid function name '{0}': must be non-empty and contain no whitespace")]
    InvalidName(String),

    /// The requested function was not found.
    #[error("Function '{0}' not found")]
    NotFound(String),
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RegistryError::Conflict("greet".to_string());
        assert!(err.to_string().contains("greet"));
        assert!(err.to_string().contains("already registered"));

        let err = RegistryError::InvalidName("bad name".to_string());
        assert!(err.to_string().contains("bad name"));

        let err = RegistryError::NotFound("missing".to_string());
        assert!(err.to_string().contains("missing"));
    }
}
