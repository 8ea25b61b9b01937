//! Error types emitted by the rota CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use rota_core::{RosterConfigError, SolveError};
use thiserror::Error;

/// Errors emitted by the rota CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Option name.
        field: &'static str,
        /// Environment variable that could supply it.
        env: &'static str,
    },
    /// A referenced input path does not exist.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Option naming the path.
        field: &'static str,
        /// Path that was looked up.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Option naming the path.
        field: &'static str,
        /// Path that was looked up.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Option naming the path.
        field: &'static str,
        /// Path that was looked up.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// Opening the roster file failed.
    #[error("failed to open roster at {path:?}: {source}")]
    OpenRoster {
        /// Roster file.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// Roster JSON could not be decoded.
    #[error("failed to parse roster JSON at {path:?}: {source}")]
    ParseRoster {
        /// Roster file.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: serde_json::Error,
    },
    /// The roster decoded but its tables are inconsistent.
    #[error("roster in {path:?} failed validation: {source}")]
    InvalidRoster {
        /// Roster file.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: RosterConfigError,
    },
    /// The template dimensions do not describe a usable roster.
    #[error("template is not a valid roster: {0}")]
    InvalidTemplate(#[source] RosterConfigError),
    /// The solver rejected the model or request.
    #[error("solver failed: {source}")]
    Solve {
        /// Underlying failure.
        #[source]
        source: SolveError,
    },
    /// Serialising the command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing the command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
