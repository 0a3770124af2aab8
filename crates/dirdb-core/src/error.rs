use thiserror::Error;

/// Errors from storage backend operations.
#[derive(Debug, Error)]
pub enum BackendError {
    /// I/O error from the underlying storage medium.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A stored value could not be encoded or decoded as JSON.
    #[error("JSON codec error at {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The cursor path does not resolve to a directory.
    #[error("no directory at {path:?}")]
    NoSuchDirectory { path: String },

    /// The named child does not exist under the cursor path.
    #[error("{name:?} not found at {path:?}")]
    NotFound { path: String, name: String },

    /// A path segment is not usable by this backend.
    #[error(transparent)]
    InvalidName(#[from] dirdb_types::TypeError),
}

/// Result alias for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Failure surfaced by a listener reaction or a hook registration.
///
/// Listener failures are logged by the broadcast and never reach the caller
/// of the mutation that triggered them.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct HookError(pub String);

impl HookError {
    /// Create a hook error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<std::io::Error> for HookError {
    fn from(err: std::io::Error) -> Self {
        Self(err.to_string())
    }
}

impl From<serde_json::Error> for HookError {
    fn from(err: serde_json::Error) -> Self {
        Self(err.to_string())
    }
}

/// A failed assertion in the scripted self-test harness.
///
/// The harness is the one component that reports failure as an error value
/// instead of a falsy return.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("self-test assertion failed: {0}")]
pub struct SelfTestError(pub String);
