//! Error types for profile intake.

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Outbound notification errors.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("Transport failed: {0}")]
    Transport(String),
}

/// Errors raised by the wizard session when a request cannot be applied.
///
/// The store itself never fails; these only come from the session gate.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("Update for step {got} does not belong to the current step {expected}")]
    StepMismatch { expected: String, got: String },

    #[error("Step {step} has invalid fields")]
    StepInvalid {
        step: String,
        errors: crate::profile::FieldErrors,
    },

    #[error("Submission is only available from the final step")]
    NotAtFinalStep,
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
