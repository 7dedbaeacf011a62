use std::fmt;

/// Errors that can occur while building rules, paths or requests.
///
/// Validation failures are never reported through this type. They are
/// data, collected in a [`ViolationList`](crate::ViolationList).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A property path could not be parsed
    InvalidPropertyPath {
        /// The offending path
        path: String,
        /// Why parsing stopped
        reason: &'static str,
    },
    /// A regular expression used by a `Pattern` constraint did not compile
    InvalidPattern {
        /// The pattern source
        pattern: String,
        /// Compiler message
        reason: String,
    },
    /// An HTTP method token that is not supported
    UnknownMethod(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidPropertyPath { path, reason } => {
                write!(f, "invalid property path '{}': {}", path, reason)
            }
            Error::InvalidPattern { pattern, reason } => {
                write!(f, "invalid pattern '{}': {}", pattern, reason)
            }
            Error::UnknownMethod(method) => write!(f, "unknown HTTP method '{}'", method),
        }
    }
}

impl std::error::Error for Error {}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
