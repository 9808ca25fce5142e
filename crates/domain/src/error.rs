//! Unified error types for the domain layer

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),
}

impl DomainError {
    /// Creates a validation error for violated segment invariants.
    ///
    /// # Example
    /// ```
    /// use sleighbound_domain::DomainError;
    ///
    /// let err = DomainError::validation("story text cannot be empty");
    /// assert_eq!(err.to_string(), "Validation failed: story text cannot be empty");
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
