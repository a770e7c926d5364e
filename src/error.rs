#![allow(non_shorthand_field_patterns)]
// The derive emitted by `masterror::Error` expands pattern matches that trip
// `non_shorthand_field_patterns`, so we disable the lint for this module.

use std::path::{Path, PathBuf};

/// Unified error type returned by the configuration loader, the repository
/// collector, and the CLI.
///
/// Each variant captures sufficient context for diagnostics while avoiding
/// accidental exposure of sensitive data: connection errors carry the
/// repository name, never the credentials used to reach it.
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// Wraps I/O errors that occur while reading input files.
    #[error("failed to read configuration from {path:?}: {source}")]
    Io {
        /// Location of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Wraps YAML decoding errors raised by the configuration loader.
    #[error("failed to parse configuration: {source}")]
    Parse {
        /// Source decoding error from serde_yaml.
        source: serde_yaml::Error,
    },
    /// Wraps JSON decoding errors raised by the static variables loader.
    #[error("failed to parse static variables from {path:?}: {source}")]
    StaticVars {
        /// Location of the static variables document.
        path: PathBuf,
        /// Source decoding error from serde_json.
        source: serde_json::Error,
    },
    /// Returned when the configuration violates invariants.
    #[error("invalid configuration: {message}")]
    Validation {
        /// Human readable message describing the validation problem.
        message: String,
    },
    /// Raised when a repository connection cannot be established or queried.
    #[error("failed to query repository '{repository}': {source}")]
    Connection {
        /// Configured name of the repository that failed.
        repository: String,
        /// Underlying database error.
        source: sqlx::Error,
    },
    /// Wraps serialization errors when writing the inventory document.
    #[error("failed to serialize inventory: {source}")]
    Serialize {
        /// Underlying serialization error.
        source: serde_json::Error,
    },
    /// Wraps I/O errors that occur while writing the inventory document.
    #[error("failed to write inventory: {source}")]
    Output {
        /// Underlying I/O error reported by the output stream.
        source: std::io::Error,
    },
}

impl Error {
    /// Constructs a validation error from the provided displayable value.
    pub fn validation<M>(message: M) -> Self
    where
        M: Into<String>,
    {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Formats the error for diagnostics without the variant name to ease CLI
    /// reporting. The returned string matches the [`std::fmt::Display`]
    /// implementation.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(source: serde_yaml::Error) -> Self {
        Self::Parse { source }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Serialize { source }
    }
}

/// Creates an [`Error::Io`] variant capturing the failing path and source.
pub fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Creates an [`Error::StaticVars`] variant capturing the failing path and
/// decoding source.
pub fn static_vars_error(path: &Path, source: serde_json::Error) -> Error {
    Error::StaticVars {
        path: path.to_path_buf(),
        source,
    }
}

/// Creates an [`Error::Connection`] variant tagged with the repository name.
pub fn connection_error(repository: &str, source: sqlx::Error) -> Error {
    Error::Connection {
        repository: repository.to_owned(),
        source,
    }
}
