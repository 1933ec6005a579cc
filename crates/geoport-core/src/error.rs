//! Error types for the GeoPort location override core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for every GeoPort crate.
///
/// The variants form a closed taxonomy: every failure surfaced to a caller
/// maps onto exactly one of them and carries a human-readable message.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum GeoportError {
    /// Latitude/longitude out of range or not finite
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// No device identifier in the request
    #[error("Missing device identity: {0}")]
    MissingIdentity(String),

    /// Missing or malformed bearer credential
    #[error("Missing or invalid token: {0}")]
    MissingToken(String),

    /// Remote service refused the credential
    #[error("Authentication rejected: {0}")]
    AuthRejected(String),

    /// Remote service throttled the request
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Remote service failed, was unreachable, or timed out
    #[error("Remote service unavailable: {0}")]
    RemoteUnavailable(String),

    /// No override mechanism could be selected
    #[error("No override mechanism available: {0}")]
    MechanismUnavailable(String),

    /// History store read/write failure
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    /// Anything else
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl GeoportError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    pub fn invalid_coordinate(message: impl Into<String>) -> Self {
        Self::InvalidCoordinate(message.into())
    }

    pub fn missing_identity(message: impl Into<String>) -> Self {
        Self::MissingIdentity(message.into())
    }

    pub fn missing_token(message: impl Into<String>) -> Self {
        Self::MissingToken(message.into())
    }

    pub fn auth_rejected(message: impl Into<String>) -> Self {
        Self::AuthRejected(message.into())
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited(message.into())
    }

    pub fn remote_unavailable(message: impl Into<String>) -> Self {
        Self::RemoteUnavailable(message.into())
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::PersistenceFailure(message.into())
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Validation and identity errors are raised before any mechanism runs.
    pub fn is_rejected_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidCoordinate(_) | Self::MissingIdentity(_) | Self::MissingToken(_)
        )
    }

    /// Errors produced by a remote override service call.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::AuthRejected(_) | Self::RateLimited(_) | Self::RemoteUnavailable(_)
        )
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::PersistenceFailure(_))
    }

    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidCoordinate(_) => "invalid_coordinate",
            Self::MissingIdentity(_) => "missing_identity",
            Self::MissingToken(_) => "missing_token",
            Self::AuthRejected(_) => "auth_rejected",
            Self::RateLimited(_) => "rate_limited",
            Self::RemoteUnavailable(_) => "remote_unavailable",
            Self::MechanismUnavailable(_) => "mechanism_unavailable",
            Self::PersistenceFailure(_) => "persistence_failure",
            Self::Unknown(_) => "unknown",
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for GeoportError {
    fn from(err: std::io::Error) -> Self {
        Self::PersistenceFailure(format!("{} (kind: {:?})", err, err.kind()))
    }
}

impl From<serde_json::Error> for GeoportError {
    fn from(err: serde_json::Error) -> Self {
        Self::PersistenceFailure(format!("JSON: {}", err))
    }
}

/// A type alias for `Result<T, GeoportError>`.
pub type Result<T> = std::result::Result<T, GeoportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_message() {
        let err = GeoportError::missing_token("authorization header absent");
        assert_eq!(
            err.to_string(),
            "Missing or invalid token: authorization header absent"
        );
    }

    #[test]
    fn test_rejected_input_classification() {
        assert!(GeoportError::invalid_coordinate("x").is_rejected_input());
        assert!(GeoportError::missing_identity("x").is_rejected_input());
        assert!(!GeoportError::rate_limited("x").is_rejected_input());
        assert!(GeoportError::rate_limited("x").is_remote());
        assert!(!GeoportError::persistence("x").is_remote());
    }

    #[test]
    fn test_serializes_with_kind_tag() {
        let json = serde_json::to_value(GeoportError::remote_unavailable("timeout")).unwrap();
        assert_eq!(json["kind"], "remote_unavailable");
        assert_eq!(json["message"], "timeout");
    }

    #[test]
    fn test_io_error_maps_to_persistence() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: GeoportError = io.into();
        assert!(err.is_persistence());
        assert_eq!(err.code(), "persistence_failure");
    }
}
