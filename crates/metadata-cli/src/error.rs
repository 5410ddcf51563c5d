use std::path::PathBuf;

use metadata_backend::BackendError;
use metadata_schema::SchemaError;
use metadata_service::ServiceError;
use metadata_watcher::WatcherError;
use miette::Diagnostic;

/// Exit codes for the `metadata-service` process (spec §6 "Exit codes": 0
/// on clean shutdown, non-zero on unrecoverable startup failure).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    InvalidConfig = 2,
    SchemaLoadError = 3,
    ConnectionError = 10,
}

/// Errors that can abort startup or the run loop.
///
/// Carries `miette::Diagnostic` so `main` can render a fancy, actionable
/// report on stderr in addition to the structured `tracing::error!` line.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum CliError {
    #[error("IO error for {path}: {source}")]
    #[diagnostic(code(metadata_cli::io), help("check that the path exists and is readable"))]
    Io { path: PathBuf, source: std::io::Error },

    #[error("configuration error: {message}")]
    #[diagnostic(code(metadata_cli::config), help("check the config file and CLI flags"))]
    Config { message: String },

    #[error("schema load error: {0}")]
    #[diagnostic(code(metadata_cli::schema), help("check the schema directory for malformed JSON"))]
    Schema(#[from] SchemaError),

    #[error("backing store error: {0}")]
    #[diagnostic(code(metadata_cli::backend))]
    Backend(#[from] BackendError),

    #[error("service error: {0}")]
    #[diagnostic(code(metadata_cli::service))]
    Service(#[from] ServiceError),

    #[error("watcher error: {0}")]
    #[diagnostic(code(metadata_cli::watcher))]
    Watcher(#[from] WatcherError),

    #[error("{0}")]
    #[diagnostic(code(metadata_cli::other))]
    Other(String),
}

impl CliError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Config { .. } => ExitCode::InvalidConfig,
            Self::Schema(_) => ExitCode::SchemaLoadError,
            Self::Backend(_) => ExitCode::ConnectionError,
            Self::Io { .. } | Self::Service(_) | Self::Watcher(_) | Self::Other(_) => {
                ExitCode::GeneralError
            }
        }
    }
}
