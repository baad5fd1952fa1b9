//! Error types for robotrepo

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for robotrepo operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for robotrepo
#[derive(Error, Debug)]
pub enum Error {
    /// Repository was not found at the specified path.
    #[error("Repository not found at {0}")]
    RepositoryNotFound(PathBuf),

    /// Repository already exists at the specified path.
    #[error("Repository already exists at {0}")]
    RepositoryExists(PathBuf),

    /// Repository has an invalid format or version.
    #[error("Invalid repository format: {0}")]
    InvalidFormat(String),

    /// The requested build was not found.
    #[error("Build not found: {0}")]
    BuildNotFound(u32),

    /// The repository contains no builds.
    #[error("No builds in repository")]
    NoBuilds,

    /// No report file matched the configured file mask.
    #[error("No files found in path {} with configured filemask: {mask}", base.display())]
    NoReportsFound { base: PathBuf, mask: String },

    /// A report file is not well-formed XML.
    #[error("Parsing of {} failed: {message}", path.display())]
    Xml { path: PathBuf, message: String },

    /// A report declares entities, which are never expanded.
    #[error("Entity declarations are not allowed in {}", .0.display())]
    ExternalEntity(PathBuf),

    /// Configuration file error or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid report file mask.
    #[error("Invalid file mask: {0}")]
    Glob(#[from] globset::Error),

    /// Persisted result could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Other error with custom message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn xml(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Error::Xml {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}
