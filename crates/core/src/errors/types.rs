//! Core error type definitions

use std::path::PathBuf;

/// Result type alias for stamp operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for stamp operations using thiserror
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed configuration or remote source reference
    Configuration { message: String },

    /// Network or subprocess failure while cloning, fetching or resetting a remote source
    Fetch {
        url: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A file disappeared between listing and reading it
    FileNotFound { path: PathBuf },

    /// File system operations
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// Command execution errors
    CommandExecution {
        command: String,
        args: Vec<String>,
        message: String,
        exit_code: Option<i32>,
    },

    /// Key-value store failures
    Store { key: String, message: String },

    /// JSON serialization/deserialization errors
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Operation timeout errors
    Timeout {
        operation: String,
        duration: std::time::Duration,
    },
}

impl Error {
    /// Whether this error only says that a file vanished mid-read
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::FileNotFound { .. })
    }

    /// Whether this error is a configuration error
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration { .. })
    }

    /// Whether this error came from a remote fetch
    #[must_use]
    pub fn is_fetch(&self) -> bool {
        matches!(self, Error::Fetch { .. })
    }
}
