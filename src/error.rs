//! Error types for the class map registry

use thiserror::Error;

/// Result type for mapping operations
pub type Result<T> = std::result::Result<T, MappingError>;

/// Class map registry errors
#[derive(Error, Debug)]
pub enum MappingError {
    #[error("Argument must not be empty: {0}")]
    NullArgument(&'static str),

    #[error("Invalid selector expression: {0}")]
    InvalidSelector(String),

    #[error("Cannot resolve {interface}.{member} on {class}: {reason}")]
    ResolutionFailure {
        class: String,
        interface: String,
        member: String,
        reason: String,
    },

    #[error("The member must be for class {expected}, but was for class {actual}")]
    WrongClass { expected: String, actual: String },

    #[error("The class '{class}' does not have a field named '{field}'")]
    NotFound { class: String, field: String },

    #[error("The interface {interface} is not assignable from {class}")]
    NotAssignable { interface: String, class: String },

    #[error("Class map not registered: {0}")]
    NotRegistered(String),

    #[error("Class map already registered: {0}")]
    DuplicateRegistration(String),

    #[error("Registration of {0} waits on itself")]
    RegistrationCycle(String),

    #[error("Only fields and properties are supported, {member} is a {kind}")]
    UnsupportedMemberKind { member: String, kind: String },

    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] config_crate::ConfigError),
}
