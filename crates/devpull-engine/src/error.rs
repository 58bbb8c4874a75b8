//! # Design
//!
//! - Structured, constant-message errors for the transfer/deletion engine.
//! - Carry the failing stage, path, and offending value as fields so callers
//!   can report failures without string parsing.
//! - `describe` renders the operator-facing "label plus cause" line; the
//!   `Display` impls stay constant.

use std::io;
use std::path::PathBuf;

use devpull_device::DeviceError;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors produced by the object-tree resolution and transfer engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A device session call failed.
    #[error("engine device failure")]
    Device {
        /// Stage that issued the device call.
        operation: &'static str,
        /// Underlying session error.
        source: DeviceError,
    },
    /// Local or stream IO failed during a transfer.
    #[error("engine io failure")]
    Io {
        /// Stage that triggered the IO failure.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The destination accepted fewer bytes than one chunk read produced.
    #[error("engine short write")]
    ShortWrite {
        /// Destination path being written.
        path: PathBuf,
        /// Bytes read from the source for this chunk.
        expected: usize,
        /// Bytes the destination actually accepted.
        written: usize,
    },
    /// A path component had no matching child.
    #[error("engine path component not found")]
    PathNotFound {
        /// Component that failed to resolve.
        component: String,
        /// Full path being resolved.
        path: String,
    },
    /// The deletion reply cannot be correlated with the submission.
    #[error("engine unexpected deletion reply")]
    UnexpectedReply {
        /// Operation that produced the reply.
        operation: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
    /// Input validation failures.
    #[error("engine invalid input")]
    InvalidInput {
        /// Field that failed validation.
        field: &'static str,
        /// Static reason for the failure.
        reason: &'static str,
    },
}

impl EngineError {
    pub(crate) const fn device(operation: &'static str, source: DeviceError) -> Self {
        Self::Device { operation, source }
    }

    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn short_write(path: impl Into<PathBuf>, expected: usize, written: usize) -> Self {
        Self::ShortWrite {
            path: path.into(),
            expected,
            written,
        }
    }

    pub(crate) fn path_not_found(component: impl Into<String>, path: impl Into<String>) -> Self {
        Self::PathNotFound {
            component: component.into(),
            path: path.into(),
        }
    }

    pub(crate) fn unexpected_reply(operation: &'static str, value: Option<String>) -> Self {
        Self::UnexpectedReply { operation, value }
    }

    /// Render the operator-facing failure line: stage label plus the
    /// underlying cause.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Device { operation, source } => {
                format!("{operation}: {}", describe_device(source))
            }
            Self::Io {
                operation,
                path,
                source,
            } => format!("{operation} '{}': {source}", path.display()),
            Self::ShortWrite {
                path,
                expected,
                written,
            } => format!(
                "writing destination '{}': wrote {written} of {expected} bytes",
                path.display()
            ),
            Self::PathNotFound { component, path } => {
                format!("path component '{component}' not found while resolving '{path}'")
            }
            Self::UnexpectedReply { operation, value } => value.as_ref().map_or_else(
                || format!("{operation}: reply did not match the submission"),
                |value| format!("{operation}: unexpected reply ({value})"),
            ),
            Self::InvalidInput { field, reason } => format!("invalid {field}: {reason}"),
        }
    }
}

fn describe_device(error: &DeviceError) -> String {
    match error {
        DeviceError::NotFound { kind, value } => format!("{kind} '{value}' not found"),
        DeviceError::Io { operation, source } => format!("{operation}: {source}"),
        DeviceError::SessionClosed { operation } => {
            format!("{operation}: session already closed")
        }
        DeviceError::Unsupported { operation, value } => value.as_ref().map_or_else(
            || format!("{operation}: unsupported device response"),
            |value| format!("{operation}: unsupported device response ({value})"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn helpers_build_variants_with_sources() {
        let err = EngineError::device(
            "enumerating children",
            DeviceError::io("next_batch", io::Error::other("io")),
        );
        assert!(matches!(err, EngineError::Device { .. }));
        assert!(err.source().is_some());

        let err = EngineError::io("creating destination", "/tmp/out", io::Error::other("io"));
        assert!(matches!(err, EngineError::Io { .. }));
        assert!(err.source().is_some());

        let err = EngineError::path_not_found("DCIM", "/DCIM/Camera");
        assert!(matches!(err, EngineError::PathNotFound { .. }));
        assert!(err.source().is_none());
    }

    #[test]
    fn describe_carries_stage_and_cause() {
        let err = EngineError::io(
            "writing destination",
            "/tmp/out/a.jpg",
            io::Error::other("disk full"),
        );
        let line = err.describe();
        assert!(line.starts_with("writing destination"));
        assert!(line.contains("disk full"));

        let err = EngineError::short_write("/tmp/out/a.jpg", 512, 100);
        assert!(err.describe().contains("wrote 100 of 512 bytes"));
    }

    #[test]
    fn describe_renders_device_not_found() {
        let err = EngineError::device(
            "resolving object name",
            DeviceError::not_found("property", "o1/name"),
        );
        assert_eq!(
            err.describe(),
            "resolving object name: property 'o1/name' not found"
        );
    }
}
