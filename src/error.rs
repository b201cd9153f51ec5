//! Error types for the vericode crate.
//!
//! Two different things can go "wrong" in this crate and they are kept apart:
//!
//! - [`Error`] covers real faults: a user-supplied pattern that does not compile,
//!   settings JSON that does not deserialize, a raw message that does not parse.
//!   Pattern faults never escape the rule resolver; they are logged and the
//!   offending entry is dropped.
//! - [`FailureReason`] covers deliberate suppression during extraction (excluded
//!   sender, not enough keyword context, no candidate). These are not errors and
//!   collapse to `None` at the public extraction boundary.

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building rules or reading input.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // Configuration errors (recovered by dropping the entry)
    // ─────────────────────────────────────────────────────────────────────────
    /// A code pattern failed to compile.
    #[error("invalid code pattern '{pattern}'")]
    InvalidPattern {
        /// The pattern source as configured.
        pattern: String,
        /// The underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// A content exclusion pattern failed to compile.
    #[error("invalid exclude pattern '{pattern}'")]
    InvalidExcludePattern {
        /// The pattern source as configured.
        pattern: String,
        /// The underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// A code pattern was configured with a priority below 1.
    #[error("code pattern '{pattern}' has priority {priority}, priorities start at 1")]
    InvalidPriority {
        /// The pattern source as configured.
        pattern: String,
        /// The rejected priority.
        priority: i64,
    },

    /// Persisted settings could not be read.
    #[error("invalid settings")]
    InvalidSettings {
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Input errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to parse a raw email message.
    #[error("failed to parse email")]
    ParseMessage {
        /// The underlying parse error.
        #[source]
        source: mailparse::MailParseError,
    },
}

impl Error {
    /// Returns the error category for logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidPattern { .. }
            | Error::InvalidExcludePattern { .. }
            | Error::InvalidPriority { .. }
            | Error::InvalidSettings { .. } => ErrorCategory::Configuration,

            Error::ParseMessage { .. } => ErrorCategory::Parse,
        }
    }
}

/// Error categories for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Rule or settings errors.
    Configuration,
    /// Email parsing errors.
    Parse,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::Parse => write!(f, "parse"),
        }
    }
}

/// Why an extraction produced no code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    /// The text was empty or whitespace only.
    Empty,
    /// The sender or the content matched an exclusion rule.
    Excluded,
    /// Fewer than two distinct keywords occur in the text.
    InsufficientKeywords,
    /// Enough context, but no code pattern matched.
    NoCodeFound,
}

impl FailureReason {
    /// Returns the stable machine-readable name of this reason.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FailureReason::Empty => "empty",
            FailureReason::Excluded => "excluded",
            FailureReason::InsufficientKeywords => "insufficient_keywords",
            FailureReason::NoCodeFound => "no_code_found",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let err = Error::InvalidPriority {
            pattern: r"\d{6}".into(),
            priority: 0,
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.to_string().contains("priority 0"));

        let source = regex::Regex::new("[0-9").unwrap_err();
        let err = Error::InvalidPattern {
            pattern: "[0-9".into(),
            source,
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.to_string(), "invalid code pattern '[0-9'");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_settings_error_category() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = Error::InvalidSettings { source };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(ErrorCategory::Parse.to_string(), "parse");
    }

    #[test]
    fn test_failure_reason_names() {
        assert_eq!(FailureReason::Empty.as_str(), "empty");
        assert_eq!(FailureReason::Excluded.as_str(), "excluded");
        assert_eq!(
            FailureReason::InsufficientKeywords.to_string(),
            "insufficient_keywords"
        );
        assert_eq!(FailureReason::NoCodeFound.to_string(), "no_code_found");
    }
}
