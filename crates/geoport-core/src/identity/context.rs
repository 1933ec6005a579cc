use crate::error::{GeoportError, Result};
use std::collections::HashMap;

/// Header carrying the device identifier when no explicit field is given.
pub const DEVICE_ID_HEADER: &str = "x-device-id";
/// Header carrying the bearer credential.
pub const AUTHORIZATION_HEADER: &str = "authorization";
/// Recognized credential prefix.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Caller context as seen by the core: an optional explicit device id
/// plus header-like key/value pairs.
///
/// Header names are stored lowercased.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    device_id: Option<String>,
    headers: HashMap<String, String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context with an explicit device id and an `authorization` value.
    pub fn explicit(device_id: impl Into<String>, authorization: impl Into<String>) -> Self {
        Self::new()
            .with_device_id(device_id)
            .with_header(AUTHORIZATION_HEADER, authorization)
    }

    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// A resolved caller: device id plus the bearer token with its prefix stripped.
#[derive(Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub device_id: String,
    pub token: String,
}

// Tokens stay out of logs and panics.
impl std::fmt::Debug for DeviceIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceIdentity")
            .field("device_id", &self.device_id)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl DeviceIdentity {
    /// Resolves the caller from `context`.
    ///
    /// The explicit device id wins over the `x-device-id` header; blank
    /// values count as absent. The `authorization` value must start with
    /// `Bearer ` and carry a non-blank token.
    ///
    /// # Errors
    ///
    /// - `MissingIdentity` when neither device id source is present
    /// - `MissingToken` when the credential is absent or malformed
    pub fn resolve(context: &RequestContext) -> Result<Self> {
        let device_id = context
            .device_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .or_else(|| {
                context
                    .header(DEVICE_ID_HEADER)
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
            })
            .ok_or_else(|| GeoportError::missing_identity("device identifier is required"))?;

        let authorization = context
            .header(AUTHORIZATION_HEADER)
            .ok_or_else(|| GeoportError::missing_token("authorization is required"))?;

        let token = authorization
            .strip_prefix(BEARER_PREFIX)
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                GeoportError::missing_token("authorization must be a non-empty Bearer token")
            })?;

        Ok(Self {
            device_id: device_id.to_string(),
            token: token.to_string(),
        })
    }

    /// Shorthand for resolving an explicit device id and authorization value.
    pub fn from_parts(device_id: &str, authorization: &str) -> Result<Self> {
        Self::resolve(&RequestContext::explicit(device_id, authorization))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_explicit_fields() {
        let identity = DeviceIdentity::from_parts("dev1", "Bearer tok").unwrap();
        assert_eq!(identity.device_id, "dev1");
        assert_eq!(identity.token, "tok");
    }

    #[test]
    fn test_falls_back_to_header() {
        let context = RequestContext::new()
            .with_header("X-Device-Id", "dev-header")
            .with_header("Authorization", "Bearer abc");
        let identity = DeviceIdentity::resolve(&context).unwrap();
        assert_eq!(identity.device_id, "dev-header");
    }

    #[test]
    fn test_explicit_wins_over_header() {
        let context = RequestContext::new()
            .with_device_id("explicit")
            .with_header(DEVICE_ID_HEADER, "header")
            .with_header(AUTHORIZATION_HEADER, "Bearer abc");
        assert_eq!(DeviceIdentity::resolve(&context).unwrap().device_id, "explicit");
    }

    #[test]
    fn test_missing_identity_checked_first() {
        let context = RequestContext::new();
        assert!(matches!(
            DeviceIdentity::resolve(&context),
            Err(GeoportError::MissingIdentity(_))
        ));
        assert!(matches!(
            DeviceIdentity::from_parts("  ", ""),
            Err(GeoportError::MissingIdentity(_))
        ));
    }

    #[test]
    fn test_missing_or_malformed_token() {
        for authorization in ["", "tok", "Basic abc", "Bearer ", "bearer tok"] {
            assert!(
                matches!(
                    DeviceIdentity::from_parts("dev1", authorization),
                    Err(GeoportError::MissingToken(_))
                ),
                "expected MissingToken for {:?}",
                authorization
            );
        }
    }

    #[test]
    fn test_debug_redacts_token() {
        let identity = DeviceIdentity::from_parts("dev1", "Bearer secret-value").unwrap();
        assert!(!format!("{:?}", identity).contains("secret-value"));
    }
}
