//! Failure taxonomy shared by every component boundary.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// Timeout, refused connection, loopback resolution failure, or a body
    /// that does not speak the service's JSON contract.
    #[error("service unreachable ({endpoint}): {message}")]
    Transport { endpoint: String, message: String },

    /// The service answered and reported failure.
    #[error("{message}")]
    Application { endpoint: String, message: String },

    #[error("cannot determine tracked file: {0}")]
    IdentityAmbiguity(String),

    #[error("{action} {}: {source}", .path.display())]
    LocalIo {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no file is open; save the document to disk first")]
    NoDocument,

    #[error("no project found for {}; initialize version control first", .0.display())]
    NoProjectRoot(PathBuf),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("internal error: {0}")]
    Invariant(String),
}

impl SyncError {
    pub fn transport(endpoint: &str, message: impl Into<String>) -> Self {
        Self::Transport {
            endpoint: endpoint.to_string(),
            message: message.into(),
        }
    }

    pub fn application(endpoint: &str, message: impl Into<String>) -> Self {
        Self::Application {
            endpoint: endpoint.to_string(),
            message: message.into(),
        }
    }

    pub fn local_io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::LocalIo {
            action,
            path: path.into(),
            source,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    pub fn is_application(&self) -> bool {
        matches!(self, Self::Application { .. })
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
