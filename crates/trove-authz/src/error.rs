//! Gateway error type.

use thiserror::Error;

use trove_core::error::{AppError, ErrorKind};

/// Errors surfaced by the relation tuple gateway.
///
/// The gateway performs no retries; callers decide how to recover.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The authorization service is unreachable, timed out, or failed
    /// internally.
    #[error("authorization service unavailable: {0}")]
    Unavailable(String),
    /// The service rejected the request as malformed.
    #[error("invalid authorization request: {0}")]
    InvalidRequest(String),
    /// The referenced tuple does not exist. Recoverable: un-sharing
    /// something already un-shared must not fail the request.
    #[error("tuple not found")]
    NotFound,
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Unavailable(msg) => AppError::new(
                ErrorKind::ServiceUnavailable,
                format!("Authorization service unavailable: {msg}"),
            ),
            GatewayError::InvalidRequest(msg) => AppError::new(
                ErrorKind::Validation,
                format!("Invalid authorization request: {msg}"),
            ),
            GatewayError::NotFound => AppError::not_found("Relation tuple not found"),
        }
    }
}
