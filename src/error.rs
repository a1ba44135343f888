//! Central error types for the capture controller.
//!
//! Every error implements `Serialize` so it can be carried back over the
//! message protocol as a plain string.

use serde::Serialize;
use thiserror::Error;

/// Main error type for controller operations.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// An operation that requires capture mode ran while it was off
    #[error("Capture mode is not active")]
    Inactive,

    /// The element a capture was built from is gone or was never a valid target
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    /// Another capture is still in flight
    #[error("A capture is already in progress")]
    Busy,

    /// The boundary did not answer within the bounded wait
    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },

    /// The boundary answered but reported failure
    #[error("Service rejected {0}")]
    Rejected(String),

    /// The message transport itself failed
    #[error("Transport error: {0}")]
    Transport(String),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl CaptureError {
    /// Whether this failure came from the service boundary rather than from
    /// local state. Boundary failures never block the user.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Rejected(_) | Self::Transport(_)
        )
    }
}

impl Serialize for CaptureError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<String> for CaptureError {
    fn from(msg: String) -> Self {
        CaptureError::Other(msg)
    }
}

impl From<&str> for CaptureError {
    fn from(msg: &str) -> Self {
        CaptureError::Other(msg.to_string())
    }
}

/// Extension trait for adding context to Results.
///
/// # Example
/// ```ignore
/// use crate::error::{CaptureResult, ResultExt};
///
/// fn decode(raw: &str) -> CaptureResult<Reply> {
///     serde_json::from_str(raw).context("malformed reply")
/// }
/// ```
pub trait ResultExt<T> {
    /// Add context to an error, converting it to CaptureError::Other.
    fn context(self, msg: &str) -> CaptureResult<T>;

    /// Add context lazily (only evaluated on error).
    fn with_context<F: FnOnce() -> String>(self, f: F) -> CaptureResult<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn context(self, msg: &str) -> CaptureResult<T> {
        self.map_err(|e| CaptureError::Other(format!("{}: {}", msg, e)))
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> CaptureResult<T> {
        self.map_err(|e| CaptureError::Other(format!("{}: {}", f(), e)))
    }
}

/// Extension trait for turning a missing value into an invalid-target error.
pub trait OptionExt<T> {
    /// Convert None to CaptureError::InvalidTarget with the given message.
    fn or_invalid(self, msg: &str) -> CaptureResult<T>;

    /// Convert None to CaptureError::Other with a lazily evaluated message.
    fn with_context<F: FnOnce() -> String>(self, f: F) -> CaptureResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_invalid(self, msg: &str) -> CaptureResult<T> {
        self.ok_or_else(|| CaptureError::InvalidTarget(msg.to_string()))
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> CaptureResult<T> {
        self.ok_or_else(|| CaptureError::Other(f()))
    }
}

/// Type alias for Results using CaptureError.
pub type CaptureResult<T> = Result<T, CaptureError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CaptureError::Timeout {
            operation: "capture",
            timeout_ms: 1200,
        };
        assert_eq!(err.to_string(), "capture timed out after 1200ms");
    }

    #[test]
    fn test_error_serialization() {
        let err = CaptureError::Inactive;
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, "\"Capture mode is not active\"");
    }

    #[test]
    fn test_transient_classification() {
        assert!(CaptureError::Transport("closed port".into()).is_transient());
        assert!(CaptureError::Rejected("capture".into()).is_transient());
        assert!(!CaptureError::Busy.is_transient());
        assert!(!CaptureError::InvalidTarget("detached".into()).is_transient());
    }

    #[test]
    fn test_from_string() {
        let err: CaptureError = "test error".into();
        assert!(matches!(err, CaptureError::Other(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<u32>("not a number").unwrap_err();
        let err: CaptureError = json_err.into();
        assert!(matches!(err, CaptureError::JsonError(_)));
    }

    #[test]
    fn test_result_ext_context() {
        let result: Result<(), &str> = Err("original error");
        let msg = result.context("operation failed").unwrap_err().to_string();
        assert!(msg.contains("operation failed"));
        assert!(msg.contains("original error"));
    }

    #[test]
    fn test_result_ext_with_context() {
        let result: Result<(), &str> = Err("inner");
        let msg = result
            .with_context(|| format!("ctx-{}", 42))
            .unwrap_err()
            .to_string();
        assert!(msg.contains("ctx-42"));
        assert!(msg.contains("inner"));
    }

    #[test]
    fn test_option_ext_or_invalid() {
        let opt: Option<i32> = None;
        let result = opt.or_invalid("no bounding box");
        assert!(matches!(result, Err(CaptureError::InvalidTarget(_))));

        let some: Option<i32> = Some(42);
        assert_eq!(some.or_invalid("unused").unwrap(), 42);
    }

    #[test]
    fn test_option_ext_with_context() {
        let opt: Option<i32> = None;
        let msg = opt
            .with_context(|| format!("missing value at index {}", 5))
            .unwrap_err()
            .to_string();
        assert!(msg.contains("missing value at index 5"));
    }
}
