// Error types for endpoint loading, rotation and transaction assembly

use std::path::PathBuf;

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, EndpointError>;

/// Endpoint manager errors
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    /// Caller passed an unusable input (empty source path, missing nonce)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Providers file does not exist
    #[error("Providers file not found: {}", .path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Providers content is not valid JSON
    #[error("Invalid JSON format in providers source: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Rotation requested with no endpoints loaded
    #[error("No HTTP providers available")]
    OutOfRange,

    /// Any other read failure (permissions, not a file, ...)
    #[error("Failed to read providers file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EndpointError {
    /// Map an I/O error from reading `path`, splitting out the not-found case
    pub(crate) fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            EndpointError::NotFound { path, source }
        } else {
            EndpointError::Io { path, source }
        }
    }
}
