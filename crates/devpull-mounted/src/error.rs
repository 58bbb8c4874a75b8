//! Errors for mount declaration parsing.

use thiserror::Error;

/// Result type for mount configuration.
pub type MountResult<T> = Result<T, MountError>;

/// Errors produced while parsing mount declarations.
#[derive(Debug, Error)]
pub enum MountError {
    /// A `NAME=PATH[:DESCRIPTION]` declaration could not be parsed.
    #[error("invalid mount declaration")]
    InvalidSpec {
        /// The declaration as supplied.
        spec: String,
        /// Static reason for the rejection.
        reason: &'static str,
    },
}

impl MountError {
    pub(crate) fn invalid_spec(spec: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidSpec {
            spec: spec.into(),
            reason,
        }
    }

    /// Render the operator-facing rejection line.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::InvalidSpec { spec, reason } => format!("mount '{spec}': {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_names_the_spec_and_reason() {
        let err = MountError::invalid_spec("phone", "missing '=' between name and path");
        assert_eq!(
            err.describe(),
            "mount 'phone': missing '=' between name and path"
        );
    }
}
