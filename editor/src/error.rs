use thiserror::Error;

use crate::form::FieldName;

// Error message prefixes
const MSG_FAILED_TO_PREFIX: &str = "Failed to";
const MSG_INVALID_PREFIX: &str = "Invalid";

/// Result type for the `assignment_editor` library
pub type Result<T> = std::result::Result<T, error_stack::Report<Error>>;

/// Error categories surfaced by the editor core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Bad or unparsable configuration value
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A field value or argument did not fit its slot
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Update requested for a record that has no identifier
    #[error("Cannot update assignment: missing identifier")]
    MissingIdentifier,

    /// Converting form values to or from JSON failed
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Reading input for the command line front end failed
    #[error("Input error: {0}")]
    Input(String),
}

impl Error {
    /// Create a "Failed to X" serialization error
    #[must_use]
    pub fn failed_to(action: &str, details: impl std::fmt::Display) -> Self {
        Self::Serialization(format!("{MSG_FAILED_TO_PREFIX} {action}: {details}"))
    }

    /// Create an "Invalid X" error
    #[must_use]
    pub fn invalid(what: &str, details: impl std::fmt::Display) -> Self {
        Self::InvalidArgument(format!("{MSG_INVALID_PREFIX} {what}: {details}"))
    }

    /// Create an error for a field value that does not match the field's type
    #[must_use]
    pub fn invalid_field(field: FieldName, details: impl std::fmt::Display) -> Self {
        Self::invalid(&format!("value for '{field}'"), details)
    }

    /// Create an error for an environment variable that could not be parsed
    #[must_use]
    pub fn invalid_env(var: &str, value: &str, details: impl std::fmt::Display) -> Self {
        Self::Configuration(format!("{MSG_INVALID_PREFIX} {var}='{value}': {details}"))
    }
}
