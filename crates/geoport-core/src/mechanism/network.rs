use crate::coordinate::Coordinate;
use crate::error::{GeoportError, Result};
use crate::identity::DeviceIdentity;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Body of the remote "set location" call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetLocationRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub device_id: String,
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
    pub app_version: String,
}

/// Body of the remote "stop location" call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopLocationRequest {
    pub device_id: String,
    pub timestamp: f64,
}

/// Transport to the external override service.
///
/// Implementations authenticate with `Bearer <token>` and return errors
/// already mapped onto the taxonomy, typically through [`map_status`];
/// transport failures map to `RemoteUnavailable`.
#[async_trait]
pub trait OverrideServiceClient: Send + Sync {
    async fn set_location(&self, token: &str, request: &SetLocationRequest) -> Result<()>;

    async fn stop_location(&self, token: &str, request: &StopLocationRequest) -> Result<()>;
}

/// Maps a remote HTTP status onto the error taxonomy.
///
/// - 2xx → `Ok`
/// - 401, 403 → `AuthRejected`
/// - 429 → `RateLimited`
/// - 5xx → `RemoteUnavailable`
/// - anything else → `Unknown`
pub fn map_status(status: u16) -> Result<()> {
    match status {
        200..=299 => Ok(()),
        401 | 403 => Err(GeoportError::auth_rejected(
            "device authorization was rejected by the override service",
        )),
        429 => Err(GeoportError::rate_limited(
            "too many requests, try again later",
        )),
        500..=599 => Err(GeoportError::remote_unavailable(format!(
            "override service error (status {})",
            status
        ))),
        other => Err(GeoportError::unknown(format!(
            "unexpected override service status {}",
            other
        ))),
    }
}

fn unix_timestamp() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}

/// Applies overrides by asking the external override service.
#[derive(Clone)]
pub struct NetworkServiceMechanism {
    client: Arc<dyn OverrideServiceClient>,
    timeout: Duration,
    app_version: String,
}

impl NetworkServiceMechanism {
    pub fn new(
        client: Arc<dyn OverrideServiceClient>,
        timeout: Duration,
        app_version: impl Into<String>,
    ) -> Self {
        Self {
            client,
            timeout,
            app_version: app_version.into(),
        }
    }

    async fn with_timeout<F>(&self, call: F) -> Result<()>
    where
        F: std::future::Future<Output = Result<()>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(GeoportError::remote_unavailable(format!(
                "override service did not answer within {:?}",
                self.timeout
            ))),
        }
    }

    pub async fn apply(&self, identity: &DeviceIdentity, coordinate: Coordinate) -> Result<()> {
        let request = SetLocationRequest {
            latitude: coordinate.latitude(),
            longitude: coordinate.longitude(),
            device_id: identity.device_id.clone(),
            timestamp: unix_timestamp(),
            app_version: self.app_version.clone(),
        };
        self.with_timeout(self.client.set_location(&identity.token, &request))
            .await
    }

    pub async fn revert(&self, identity: &DeviceIdentity) -> Result<()> {
        let request = StopLocationRequest {
            device_id: identity.device_id.clone(),
            timestamp: unix_timestamp(),
        };
        self.with_timeout(self.client.stop_location(&identity.token, &request))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::validate;
    use std::sync::Mutex;

    // Mock client recording requests and answering with a fixed status
    struct MockServiceClient {
        status: u16,
        delay: Duration,
        seen: Mutex<Vec<(String, SetLocationRequest)>>,
    }

    impl MockServiceClient {
        fn new(status: u16) -> Self {
            Self {
                status,
                delay: Duration::ZERO,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl OverrideServiceClient for MockServiceClient {
        async fn set_location(&self, token: &str, request: &SetLocationRequest) -> Result<()> {
            tokio::time::sleep(self.delay).await;
            self.seen
                .lock()
                .unwrap()
                .push((token.to_string(), request.clone()));
            map_status(self.status)
        }

        async fn stop_location(&self, _token: &str, _request: &StopLocationRequest) -> Result<()> {
            tokio::time::sleep(self.delay).await;
            map_status(self.status)
        }
    }

    fn identity() -> DeviceIdentity {
        DeviceIdentity::from_parts("dev1", "Bearer tok").unwrap()
    }

    #[test]
    fn test_status_mapping() {
        assert!(map_status(200).is_ok());
        assert!(map_status(204).is_ok());
        assert!(matches!(map_status(401), Err(GeoportError::AuthRejected(_))));
        assert!(matches!(map_status(429), Err(GeoportError::RateLimited(_))));
        assert!(matches!(
            map_status(503),
            Err(GeoportError::RemoteUnavailable(_))
        ));
        assert!(matches!(map_status(404), Err(GeoportError::Unknown(_))));
    }

    #[tokio::test]
    async fn test_apply_sends_request_fields() {
        let client = Arc::new(MockServiceClient::new(200));
        let mechanism =
            NetworkServiceMechanism::new(client.clone(), Duration::from_secs(10), "1.2.3");

        mechanism
            .apply(&identity(), validate(39.9042, 116.4074).unwrap())
            .await
            .unwrap();

        let seen = client.seen.lock().unwrap();
        let (token, request) = &seen[0];
        assert_eq!(token, "tok");
        assert_eq!(request.device_id, "dev1");
        assert_eq!(request.latitude, 39.9042);
        assert_eq!(request.longitude, 116.4074);
        assert_eq!(request.app_version, "1.2.3");
        assert!(request.timestamp > 0.0);
    }

    #[tokio::test]
    async fn test_remote_errors_surface() {
        let mechanism = NetworkServiceMechanism::new(
            Arc::new(MockServiceClient::new(429)),
            Duration::from_secs(10),
            "1.0",
        );
        let err = mechanism
            .apply(&identity(), validate(1.0, 1.0).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, GeoportError::RateLimited(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_remote_unavailable() {
        let client = MockServiceClient {
            delay: Duration::from_secs(60),
            ..MockServiceClient::new(200)
        };
        let mechanism =
            NetworkServiceMechanism::new(Arc::new(client), Duration::from_secs(10), "1.0");

        let err = mechanism.revert(&identity()).await.unwrap_err();
        assert!(matches!(err, GeoportError::RemoteUnavailable(_)));
    }
}
