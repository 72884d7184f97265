//! Defines the errors raised while interpreting repository events and
//! settings.

use thiserror::Error;

/// Domain errors. These are all fatal: they reach the invoking
/// platform unhandled.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HookError {
    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    #[error("Expected reference {reference:?} to start with {prefix:?}")]
    InvalidReference { reference: String, prefix: String },

    #[error("Branch {branch} was created and deleted simultaneously")]
    ConflictingChange { branch: String },

    #[error("Environment variable {0} cannot be empty")]
    InvalidSetting(&'static str),

    #[error("Environment variable {0} is required")]
    MissingSetting(&'static str),
}
