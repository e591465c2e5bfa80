//! Error types for the CCR usage subsystem.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, UsageError>;

/// Errors raised around usage computation.
///
/// The aggregation itself is total; these come from resolving the project,
/// loading configuration and reading input files.
#[derive(Debug, Error)]
pub enum UsageError {
    /// The requested project is not part of the cluster state.
    #[error("project not found: {project_id}")]
    ProjectNotFound {
        /// The project identifier that was looked up.
        project_id: String,
    },

    /// Configuration is invalid or cannot be interpreted.
    #[error("config error: {msg}")]
    Config {
        /// Error message describing the issue.
        msg: String,
    },

    /// License operation mode string is not recognised.
    #[error("unknown license mode: {mode}")]
    UnknownLicenseMode {
        /// The mode string that failed to parse.
        mode: String,
    },

    /// I/O error.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error.
    #[error("TOML error")]
    Toml(#[from] toml::de::Error),
}
