use thiserror::Error;

/// A result type for seeding operations
pub type Result<T> = std::result::Result<T, DoeError>;

/// An error raised while building a search space or generating a design.
///
/// Errors are always raised before any generation work starts,
/// no partial [`Population`](crate::Population) is ever returned alongside an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DoeError {
    /// When a search space, a count or an option value is malformed
    #[error("Validation error: {0}")]
    ValidationError(String),
    /// When the strategy name is unknown or options do not fit the selected strategy
    #[error("Invalid configuration: {0}")]
    ConfigurationError(String),
}

impl DoeError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        DoeError::ValidationError(msg.into())
    }

    pub(crate) fn configuration(msg: impl Into<String>) -> Self {
        DoeError::ConfigurationError(msg.into())
    }
}
