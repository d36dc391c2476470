//! Error types for the sync layer.

use mirrorkit_storage::StorageError;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur in sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The remote collaborator failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The local store failed.
    #[error("persistence error: {0}")]
    Persistence(#[from] StorageError),

    /// A subscriber faulted or a request could not be routed.
    #[error(transparent)]
    Dispatch(#[from] DispatchFault),

    /// Channel closed.
    #[error("channel closed")]
    ChannelClosed,

    /// No tokio runtime to run remote calls on.
    #[error("no tokio runtime available")]
    NoRuntime,

    /// Requests were still running when the shutdown deadline passed.
    #[error("shutdown timed out with {0} request(s) in flight")]
    ShutdownTimeout(usize),

    /// Invalid configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Error codes reported by the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemoteErrorCode {
    InvalidParam,
    InvalidReviewId,
    InvalidImageId,
    DuplicateSku,
    Network,
    Unauthorized,
    Generic,
}

impl RemoteErrorCode {
    const ALL: [RemoteErrorCode; 7] = [
        RemoteErrorCode::InvalidParam,
        RemoteErrorCode::InvalidReviewId,
        RemoteErrorCode::InvalidImageId,
        RemoteErrorCode::DuplicateSku,
        RemoteErrorCode::Network,
        RemoteErrorCode::Unauthorized,
        RemoteErrorCode::Generic,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            RemoteErrorCode::InvalidParam => "INVALID_PARAM",
            RemoteErrorCode::InvalidReviewId => "INVALID_REVIEW_ID",
            RemoteErrorCode::InvalidImageId => "INVALID_IMAGE_ID",
            RemoteErrorCode::DuplicateSku => "DUPLICATE_SKU",
            RemoteErrorCode::Network => "NETWORK",
            RemoteErrorCode::Unauthorized => "UNAUTHORIZED",
            RemoteErrorCode::Generic => "GENERIC",
        }
    }
}

impl fmt::Display for RemoteErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown codes map to [`RemoteErrorCode::Generic`].
impl FromStr for RemoteErrorCode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(Self::ALL
            .into_iter()
            .find(|code| code.as_str().eq_ignore_ascii_case(s))
            .unwrap_or(RemoteErrorCode::Generic))
    }
}

/// Failure reported by the remote collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("remote error {code}: {message}")]
pub struct RemoteError {
    pub code: RemoteErrorCode,
    pub message: String,
}

impl RemoteError {
    pub fn new(code: RemoteErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn generic(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorCode::Generic, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorCode::Network, message)
    }
}

/// A subscriber handler failed, or a request had nowhere to go.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("dispatch fault: {message}")]
pub struct DispatchFault {
    pub message: String,
}

impl DispatchFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Builds a fault from a caught panic payload.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self::new(format!("handler panicked: {detail}"))
    }
}

/// Category of the error carried by a result action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "code", rename_all = "snake_case")]
pub enum ErrorKind {
    Remote(RemoteErrorCode),
    /// The remote call succeeded but the local mirror was not updated.
    Persistence,
    DispatchFault,
}

/// Error payload of a result action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDescriptor {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorDescriptor {
    pub fn persistence(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Persistence,
            message: message.into(),
        }
    }

    /// The remote error code, if the remote side failed.
    pub fn remote_code(&self) -> Option<RemoteErrorCode> {
        match self.kind {
            ErrorKind::Remote(code) => Some(code),
            _ => None,
        }
    }

    pub fn is_persistence(&self) -> bool {
        self.kind == ErrorKind::Persistence
    }
}

impl fmt::Display for ErrorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ErrorKind::Remote(code) => write!(f, "remote ({code}): {}", self.message),
            ErrorKind::Persistence => write!(f, "persistence: {}", self.message),
            ErrorKind::DispatchFault => write!(f, "dispatch fault: {}", self.message),
        }
    }
}

impl From<&RemoteError> for ErrorDescriptor {
    fn from(e: &RemoteError) -> Self {
        Self {
            kind: ErrorKind::Remote(e.code),
            message: e.message.clone(),
        }
    }
}

impl From<RemoteError> for ErrorDescriptor {
    fn from(e: RemoteError) -> Self {
        Self {
            kind: ErrorKind::Remote(e.code),
            message: e.message,
        }
    }
}

impl From<&StorageError> for ErrorDescriptor {
    fn from(e: &StorageError) -> Self {
        Self::persistence(e.to_string())
    }
}

impl From<DispatchFault> for ErrorDescriptor {
    fn from(f: DispatchFault) -> Self {
        Self {
            kind: ErrorKind::DispatchFault,
            message: f.message,
        }
    }
}
