//! Error types for the public API.
//!
//! Internally everything returns `Res<T>`, which is an `anyhow::Result`. At the public boundary
//! the error is tagged with an `ErrorType` using `IntoResult::pub_result` so that callers can tell
//! a bad configuration apart from a bug in the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// The internal result type.
pub(crate) type Res<T> = anyhow::Result<T>;

/// The public result type.
pub type Result<T> = std::result::Result<T, Error>;

/// The category of a failure. Every category is fatal to the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// Missing or invalid configuration values.
    Config,
    /// A computed value broke an invariant of the ledger. This indicates a bug, not bad input.
    Invariant,
    /// The 401(k) optimizer could not find a schedule that reaches the cap.
    Optimizer,
    /// The security price could not be obtained.
    Price,
    /// Reading or writing files, or formatting output, failed.
    Io,
}

serde_plain::derive_display_from_serialize!(ErrorType);

/// An error returned from the public API.
pub struct Error {
    error_type: ErrorType,
    inner: anyhow::Error,
}

impl Error {
    pub(crate) fn new(error_type: ErrorType, inner: anyhow::Error) -> Self {
        Self { error_type, inner }
    }

    /// The category of this error.
    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:?}", self.error_type, self.inner)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:#}", self.error_type, self.inner)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.source()
    }
}

/// Converts an internal result into a public `Result` tagged with an `ErrorType`.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| Error::new(error_type, e.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_pub_result_tags_error() {
        let res: Res<()> = Err(anyhow!("medicare tax percent required"));
        let err = res.pub_result(ErrorType::Config).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
        assert_eq!(
            err.to_string(),
            "config error: medicare tax percent required"
        );
    }

    #[test]
    fn test_display_includes_context_chain() {
        use anyhow::Context;
        let res: Res<()> = Err(anyhow!("inner")).context("outer");
        let err = res.pub_result(ErrorType::Io).unwrap_err();
        assert_eq!(err.to_string(), "io error: outer: inner");
    }
}
