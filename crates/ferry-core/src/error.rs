//! Error types for ferry-core

use thiserror::Error;

/// Core error types for the ferry library
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Archive type could not be derived from the resource name
    #[error("Unsupported archive type for {resource}, supported types are {supported:?}")]
    UnsupportedArchiveType {
        resource: String,
        supported: Vec<&'static str>,
    },

    /// A manager was asked to handle an archive outside of its family
    #[error(
        "Can't {operation} {resource} with {manager}: unsupported archive type {archive_type}. \
         Supported types: {supported:?}"
    )]
    UnsupportedArchiveFamily {
        operation: &'static str,
        manager: &'static str,
        resource: String,
        archive_type: String,
        supported: Vec<&'static str>,
    },

    /// External command exited with a non-zero status
    #[error("{tool} {args:?} failed with {status}: {stderr}")]
    ExternalTool {
        tool: String,
        args: Vec<String>,
        status: String,
        stderr: String,
    },

    /// Transfer options or endpoints are malformed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Endpoint scheme is not handled by any copier
    #[error("Unsupported {role}: {url}")]
    UnsupportedUrl { role: &'static str, url: String },

    /// Configuration-related error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::Io(err.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
