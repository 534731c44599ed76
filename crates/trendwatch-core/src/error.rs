use thiserror::Error;

/// Errors raised while loading or validating configuration.
///
/// Configuration problems are fatal at load time; nothing in the poll
/// pipeline attempts to recover from a malformed roster or env var.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read roster file {path}: {source}")]
    RosterFileIo {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse roster file: {0}")]
    RosterFileParse(#[from] serde_yaml::Error),

    #[error("roster validation failed: {0}")]
    Validation(String),
}
