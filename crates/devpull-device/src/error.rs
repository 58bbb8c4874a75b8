//! # Design
//!
//! - Provide structured, constant-message errors for the device session seam.
//! - Capture the failing operation and offending value so callers can report
//!   failures without re-deriving context.
//! - Preserve source errors instead of interpolating them into messages.

use std::io;

use thiserror::Error;

/// Result type for device session operations.
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Errors produced by device providers and sessions.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// A device, object, or property could not be found.
    #[error("device entity not found")]
    NotFound {
        /// Entity kind that was missing ("device", "object", "property").
        kind: &'static str,
        /// Identifier or selector that failed to resolve.
        value: String,
    },
    /// IO failures while talking to the device or its backing store.
    #[error("device io failure")]
    Io {
        /// Operation that triggered the IO failure.
        operation: &'static str,
        /// Underlying IO error.
        source: io::Error,
    },
    /// A call was issued against a session that has been closed.
    #[error("device session closed")]
    SessionClosed {
        /// Operation that was attempted after close.
        operation: &'static str,
    },
    /// The device returned a result the session cannot interpret.
    #[error("unsupported device response")]
    Unsupported {
        /// Operation that produced the response.
        operation: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
}

impl DeviceError {
    /// Build a [`DeviceError::NotFound`] for the given entity kind.
    #[must_use]
    pub fn not_found(kind: &'static str, value: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            value: value.into(),
        }
    }

    /// Build a [`DeviceError::Io`] tagged with the failing operation.
    #[must_use]
    pub const fn io(operation: &'static str, source: io::Error) -> Self {
        Self::Io { operation, source }
    }

    /// Build a [`DeviceError::SessionClosed`] for the attempted operation.
    #[must_use]
    pub const fn closed(operation: &'static str) -> Self {
        Self::SessionClosed { operation }
    }

    /// Build a [`DeviceError::Unsupported`] with an optional offending value.
    #[must_use]
    pub fn unsupported(operation: &'static str, value: Option<String>) -> Self {
        Self::Unsupported { operation, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io;

    #[test]
    fn helpers_build_expected_variants() {
        let err = DeviceError::not_found("object", "oA1");
        assert!(matches!(err, DeviceError::NotFound { kind: "object", .. }));
        assert!(err.source().is_none());

        let err = DeviceError::io("enumerate", io::Error::other("io"));
        assert!(matches!(err, DeviceError::Io { .. }));
        assert!(err.source().is_some());

        let err = DeviceError::closed("read_property");
        assert!(matches!(
            err,
            DeviceError::SessionClosed {
                operation: "read_property"
            }
        ));

        let err = DeviceError::unsupported("delete_batch", Some("VT_UI4".into()));
        assert!(matches!(err, DeviceError::Unsupported { .. }));
    }
}
