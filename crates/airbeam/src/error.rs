//! CLI error types with miette diagnostics.

use miette::Diagnostic;
use thiserror::Error;

use airbeam_config::ConfigError;
use airbeam_core::CoreError;

/// Exit codes of the `airbeam` process.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────
    #[error("Could not load the config file")]
    #[diagnostic(
        code(airbeam::config),
        help("Check the file passed with --config (-c).\nValidate it with: airbeam -c <FILE> --check")
    )]
    Config {
        #[source]
        source: ConfigError,
    },

    // ── Logging ──────────────────────────────────────────────────────
    #[error("Could not open log file {path}")]
    #[diagnostic(
        code(airbeam::log_file),
        help("Make sure the directory of log.file exists and is writable.")
    )]
    LogFile {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Logging was already initialized")]
    #[diagnostic(code(airbeam::logging))]
    LoggingInit,

    // ── Supervisor ───────────────────────────────────────────────────
    #[error("Could not set up device clients")]
    #[diagnostic(code(airbeam::setup))]
    Setup {
        #[source]
        source: CoreError,
    },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<ConfigError> for CliError {
    fn from(source: ConfigError) -> Self {
        Self::Config { source }
    }
}

impl From<CoreError> for CliError {
    fn from(source: CoreError) -> Self {
        Self::Setup { source }
    }
}
