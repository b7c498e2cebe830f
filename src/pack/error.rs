//! Error types for pipeline processing.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use super::filter::FilterConflict;

/// A pipeline definition that cannot run.
///
/// Raised before any process is spawned for the affected pipeline and halts
/// the whole run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// A required field is unset or empty
    #[error("pipeline '{pipeline}': {field} property must be defined")]
    MissingField {
        /// Pipeline name
        pipeline: String,
        /// Field name (`src`, `dst`, `sheet`, `data`)
        field: &'static str,
    },
    /// Mutually exclusive include/exclude fields are both set
    #[error("pipeline '{pipeline}': {conflict}")]
    ConflictingFilters {
        /// Pipeline name
        pipeline: String,
        /// Which fields collide
        conflict: FilterConflict,
    },
}

impl ConfigurationError {
    /// Name of the pipeline the error belongs to.
    pub fn pipeline(&self) -> &str {
        match self {
            ConfigurationError::MissingField { pipeline, .. } => pipeline,
            ConfigurationError::ConflictingFilters { pipeline, .. } => pipeline,
        }
    }
}

/// Failure while launching the external tool or draining its output.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The executable was not found or could not be started
    #[error("failed to launch '{executable}': {source}")]
    Launch {
        /// Executable name as passed to the runner
        executable: String,
        /// Underlying OS error
        #[source]
        source: io::Error,
    },
    /// I/O failure while reading stdout/stderr or waiting for exit
    #[error("failed to capture output of '{executable}': {source}")]
    StreamCapture {
        /// Executable name as passed to the runner
        executable: String,
        /// Underlying OS error
        #[source]
        source: io::Error,
    },
}

/// Why a single directory invocation failed.
#[derive(Debug, Error)]
pub enum InvocationError {
    /// The runner could not execute the tool
    #[error(transparent)]
    Runner(#[from] RunnerError),
    /// The tool exited with a non-zero code and the exit-code policy is `fail`
    #[error("packer exited with status {0}")]
    NonZeroExit(i32),
    /// The tool was terminated without an exit code and the policy is `fail`
    #[error("packer terminated by signal")]
    Terminated,
}

/// Fatal error that stops an engine run.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Pre-flight configuration check failed
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// Destination directory could not be created
    #[error("failed to create directory {}: {source}", path.display())]
    Io {
        /// Directory being created
        path: PathBuf,
        /// Underlying OS error
        #[source]
        source: io::Error,
    },
}
