//! Fixed error catalog
//!
//! The service reports failures through a closed set of error kinds. Each
//! kind carries an immutable numeric code and message, fixed at compile
//! time and shared read-only by every request.

use serde::Serialize;
use thiserror::Error;

/// Closed set of error conditions reportable to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("error(0): success")]
    Ok,
    #[error("error(1): invalid file path")]
    InvalidPath,
    #[error("error(2): unsupported response type")]
    UnsupportedResponseType,
    #[error("error(3): internal server error")]
    InternalError,
}

impl ErrorKind {
    /// Numeric code embedded in the error envelope.
    pub const fn code(self) -> u32 {
        match self {
            Self::Ok => 0,
            Self::InvalidPath => 1,
            Self::UnsupportedResponseType => 2,
            Self::InternalError => 3,
        }
    }

    /// Client-facing message embedded in the error envelope.
    pub const fn message(self) -> &'static str {
        match self {
            Self::Ok => "success",
            Self::InvalidPath => "invalid file path",
            Self::UnsupportedResponseType => "unsupported response type",
            Self::InternalError => "internal server error",
        }
    }
}

/// The `{msg, code}` body serialized for every failed request.
///
/// Transient: built per response and discarded once written.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub msg: &'static str,
    pub code: u32,
}

impl From<ErrorKind> for ErrorEnvelope {
    fn from(kind: ErrorKind) -> Self {
        Self {
            msg: kind.message(),
            code: kind.code(),
        }
    }
}
