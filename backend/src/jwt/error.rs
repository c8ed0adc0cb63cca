//! JWT-related error types

use jsonwebtoken::errors::ErrorKind;
use thiserror::Error;

/// Errors that can occur while verifying or issuing access tokens
#[derive(Error, Debug, PartialEq, Eq)]
pub enum JwtError {
    /// Token is not a well-formed JWT
    #[error("Malformed token")]
    InvalidToken,

    /// Header names an algorithm other than HS256
    #[error("Unsupported algorithm")]
    UnsupportedAlgorithm,

    /// Signature does not match the shared secret
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Token is past its `exp`
    #[error("Token expired")]
    Expired,

    /// Token is before its `nbf`
    #[error("Token not yet valid")]
    NotYetValid,

    /// Token was issued for another audience
    #[error("Invalid token audience")]
    InvalidAudience,

    /// Subject cannot be used as a user id
    #[error("Invalid token subject")]
    InvalidSubject,

    /// Token could not be serialized
    #[error("Failed to encode JWT token: {0}")]
    EncodingError(String),
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidAlgorithm => Self::UnsupportedAlgorithm,
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::ImmatureSignature => Self::NotYetValid,
            ErrorKind::InvalidAudience => Self::InvalidAudience,
            _ => Self::InvalidToken,
        }
    }
}
