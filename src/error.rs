//! Error types for state interpretation
//!
//! Every failure surfaces as an [`IggyError`] value. Nothing in the library
//! terminates the process; the CLI decides how to report and which exit
//! status to use.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for library operations
pub type Result<T> = std::result::Result<T, IggyError>;

/// Errors raised while loading or interpreting a Terraform state document
#[derive(Error, Debug)]
pub enum IggyError {
    /// Input path does not reference a regular file
    #[error("{path} is an invalid file, please check your path")]
    NotFound { path: PathBuf },

    /// Input exists but could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Content is not valid JSON
    #[error("Parsing error in {path}: {message}")]
    MalformedDocument { path: PathBuf, message: String },

    /// A required structural field is missing or has the wrong shape
    #[error("Invalid state document {path}: missing or malformed `{field}` ({context})")]
    InvalidSchema {
        path: PathBuf,
        field: String,
        context: String,
    },

    /// A profile tag was found on a resource type that cannot carry one
    #[error("{path} {resource_id} has an InSpec-tagged resource but {resource_type} is currently unsupported")]
    UnsupportedResource {
        path: PathBuf,
        resource_id: String,
        resource_type: String,
    },

    /// Resource catalog could not be loaded
    #[error("Resource catalog error: {message}")]
    Catalog { message: String },
}

/// Coarse classification of [`IggyError`] for callers that only need to branch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    MalformedDocument,
    InvalidSchema,
    UnsupportedResource,
    Catalog,
}

impl IggyError {
    /// Create a schema error for a missing or malformed field
    pub fn schema(path: &Path, field: impl Into<String>, context: impl Into<String>) -> Self {
        Self::InvalidSchema {
            path: path.to_path_buf(),
            field: field.into(),
            context: context.into(),
        }
    }

    /// Create a catalog error
    pub fn catalog(message: impl Into<String>) -> Self {
        Self::Catalog {
            message: message.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } | Self::Read { .. } => ErrorKind::NotFound,
            Self::MalformedDocument { .. } => ErrorKind::MalformedDocument,
            Self::InvalidSchema { .. } => ErrorKind::InvalidSchema,
            Self::UnsupportedResource { .. } => ErrorKind::UnsupportedResource,
            Self::Catalog { .. } => ErrorKind::Catalog,
        }
    }
}
