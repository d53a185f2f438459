#![forbid(unsafe_code)]

//! Errors owned by the core.
//!
//! Observable sequences carry their own, caller-chosen error type `E`; the
//! types here only cover failures the core itself detects: bad factory
//! arguments and bad configuration values.

use std::fmt;

/// Errors raised by the core while building sequences.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RxError {
    /// A factory argument was outside its valid domain.
    InvalidArgument {
        argument: &'static str,
        reason: String,
    },
}

impl RxError {
    pub(crate) fn invalid_argument(argument: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument,
            reason: reason.into(),
        }
    }

    /// Short stable label (snake_case) for logs.
    #[must_use]
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::InvalidArgument { .. } => "invalid_argument",
        }
    }
}

impl fmt::Display for RxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument { argument, reason } => {
                write!(f, "invalid argument `{argument}`: {reason}")
            }
        }
    }
}

impl std::error::Error for RxError {}

/// Configuration error with field context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RxConfigError {
    pub field: &'static str,
    pub value: String,
    pub message: String,
}

impl RxConfigError {
    pub(crate) fn new(
        field: &'static str,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field,
            value: value.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for RxConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={} ({})", self.field, self.value, self.message)
    }
}

impl std::error::Error for RxConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_display_and_label() {
        let err = RxError::invalid_argument("count", "must be >= 0, got -1");
        assert_eq!(err.as_label(), "invalid_argument");
        assert_eq!(
            err.to_string(),
            "invalid argument `count`: must be >= 0, got -1"
        );
    }

    #[test]
    fn config_error_display() {
        let err = RxConfigError::new("debug_value_limit", "0", "must be > 0");
        assert_eq!(err.to_string(), "debug_value_limit=0 (must be > 0)");
    }
}
