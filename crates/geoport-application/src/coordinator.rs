//! Location override coordinator.
//!
//! Per device the coordinator drives a two-state machine:
//!
//! ```text
//! Idle ──set──▶ Overriding ──set──▶ Overriding
//!   ▲                │
//!   └──────stop──────┘
//! ```
//!
//! Validation and identity checks run before anything else and never mutate
//! state. Mechanism calls are the only suspending steps; no registry or
//! history lock is held across them. Registry and history are updated only
//! after the mechanism call resolves.

use crate::outcome::{HealthSnapshot, OverrideReceipt, StopOutcome};
use chrono::{DateTime, Utc};
use geoport_core::config::HistoryConfig;
use geoport_core::coordinate::{Coordinate, describe, validate};
use geoport_core::error::Result;
use geoport_core::event::{EventBus, OverrideEvent};
use geoport_core::history::{HistoryEntry, OverrideHistoryStore};
use geoport_core::identity::DeviceIdentity;
use geoport_core::mechanism::MechanismSelector;
use geoport_core::session::{OverrideSession, OverrideStatus, SessionRegistry};
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Source recorded when the caller gives none.
pub const DEFAULT_SOURCE: &str = "api";

/// Orchestrates location overrides for many devices.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
pub struct LocationOverrideCoordinator {
    registry: SessionRegistry,
    history: Arc<OverrideHistoryStore>,
    selector: Arc<MechanismSelector>,
    events: EventBus,
    history_config: HistoryConfig,
    started_at: DateTime<Utc>,
}

impl LocationOverrideCoordinator {
    /// Creates a coordinator over already-constructed collaborators.
    ///
    /// Mechanism availability is probed once here for logging; selection
    /// itself re-probes on every call.
    pub fn new(
        registry: SessionRegistry,
        history: Arc<OverrideHistoryStore>,
        selector: Arc<MechanismSelector>,
        events: EventBus,
        history_config: HistoryConfig,
    ) -> Self {
        let available = selector.available_kinds();
        tracing::info!(
            target: "geoport::coordinator",
            ?available,
            "Location override coordinator initialized"
        );

        Self {
            registry,
            history,
            selector,
            events,
            history_config,
            started_at: Utc::now(),
        }
    }

    /// Subscribes to change/stop notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<OverrideEvent> {
        self.events.subscribe()
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Applies an override for the device.
    ///
    /// A blank or missing `source` is recorded as `"api"`.
    ///
    /// # Errors
    ///
    /// - `MissingIdentity` / `MissingToken` from the identity check
    /// - `InvalidCoordinate` from validation
    /// - The mechanism's error (`AuthRejected`, `RateLimited`,
    ///   `RemoteUnavailable`, `Unknown`); the previous session, if any, is
    ///   left untouched
    ///
    /// History persistence failures do not fail the call; they are returned
    /// as `OverrideReceipt::warning`.
    pub async fn set_override(
        &self,
        device_id: &str,
        authorization: &str,
        latitude: f64,
        longitude: f64,
        source: Option<&str>,
    ) -> Result<OverrideReceipt> {
        let identity = DeviceIdentity::from_parts(device_id, authorization)?;
        let coordinate = validate(latitude, longitude)?;
        self.apply_override(&identity, coordinate, source, None).await
    }

    async fn apply_override(
        &self,
        identity: &DeviceIdentity,
        coordinate: Coordinate,
        source: Option<&str>,
        name: Option<&str>,
    ) -> Result<OverrideReceipt> {
        let source = source
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SOURCE);
        let name = name
            .map(str::to_string)
            .unwrap_or_else(|| describe(&coordinate).to_string());

        let mechanism = self.selector.select();
        let kind = mechanism.kind();

        if let Err(e) = mechanism.apply(identity, coordinate).await {
            tracing::warn!(
                target: "geoport::coordinator",
                device_id = %identity.device_id,
                mechanism = %kind,
                error = %e,
                "Override apply failed, session left unchanged"
            );
            return Err(e);
        }

        let session = OverrideSession::start(&identity.device_id, coordinate, kind, source);
        let timestamp = session.created_at;
        let previous = self.registry.upsert(&identity.device_id, session);

        if let Some(previous) = previous.filter(|p| p.mechanism != kind) {
            self.release_previous_mechanism(identity, &previous).await;
        }

        let warning = match self
            .history
            .append(&identity.device_id, coordinate, &name, source)
            .await
        {
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(
                    target: "geoport::coordinator",
                    device_id = %identity.device_id,
                    error = %e,
                    "Override applied but history could not be recorded"
                );
                Some(e)
            }
        };

        self.events.publish(OverrideEvent::Changed {
            device_id: identity.device_id.clone(),
            coordinate,
        });

        tracing::info!(
            target: "geoport::coordinator",
            device_id = %identity.device_id,
            %coordinate,
            mechanism = %kind,
            source,
            "Location override set"
        );

        Ok(OverrideReceipt {
            latitude: coordinate.latitude(),
            longitude: coordinate.longitude(),
            timestamp,
            mechanism: kind,
            name,
            warning,
        })
    }

    /// Best-effort revert of a replaced session's mechanism when a re-set
    /// switched to a different one, so the old mechanism does not keep
    /// reporting the stale coordinate.
    async fn release_previous_mechanism(
        &self,
        identity: &DeviceIdentity,
        previous: &OverrideSession,
    ) {
        let mechanism = self.selector.mechanism_for(previous.mechanism);
        if let Err(e) = mechanism.revert(identity).await {
            tracing::warn!(
                target: "geoport::coordinator",
                device_id = %identity.device_id,
                mechanism = %previous.mechanism,
                error = %e,
                "Could not release previous mechanism after switching"
            );
        }
    }

    /// Stops the device's override.
    ///
    /// With no active session this succeeds with
    /// [`StopOutcome::nothing_to_stop`]. Otherwise the mechanism that applied
    /// the session is reverted and the session is removed from the registry.
    ///
    /// When a concurrent call changed the session while the revert was in
    /// flight, the registry is left to that call:
    /// - another stop already removed it: [`StopOutcome::nothing_to_stop`]
    /// - a newer set replaced it: [`StopOutcome::superseded`], after the newer
    ///   coordinate is re-applied if the revert hit the same mechanism
    ///
    /// # Errors
    ///
    /// - `MissingIdentity` / `MissingToken` from the identity check
    /// - The revert error. Revert is best-effort: the session is removed and
    ///   the stop notification emitted before the error is returned.
    pub async fn stop_override(&self, device_id: &str, authorization: &str) -> Result<StopOutcome> {
        let identity = DeviceIdentity::from_parts(device_id, authorization)?;

        let Some(mut session) = self.registry.get(&identity.device_id) else {
            tracing::debug!(
                target: "geoport::coordinator",
                device_id = %identity.device_id,
                "Stop requested with no active override"
            );
            return Ok(StopOutcome::nothing_to_stop());
        };

        let mechanism = self.selector.mechanism_for(session.mechanism);
        let revert_result = mechanism.revert(&identity).await;

        session.mark_stopped(Utc::now());
        if self
            .registry
            .remove_if(&identity.device_id, session.id)
            .is_none()
        {
            return self
                .settle_lost_stop(&identity, &session, revert_result)
                .await;
        }

        self.events.publish(OverrideEvent::Stopped {
            device_id: identity.device_id.clone(),
        });

        match revert_result {
            Ok(()) => {
                tracing::info!(
                    target: "geoport::coordinator",
                    device_id = %identity.device_id,
                    mechanism = %session.mechanism,
                    "Location override stopped"
                );
                Ok(StopOutcome::stopped(session))
            }
            Err(e) => {
                tracing::warn!(
                    target: "geoport::coordinator",
                    device_id = %identity.device_id,
                    mechanism = %session.mechanism,
                    error = %e,
                    "Revert failed; override marked inactive locally"
                );
                Err(e)
            }
        }
    }

    /// Resolves a stop whose session was no longer in the registry after
    /// its revert completed.
    async fn settle_lost_stop(
        &self,
        identity: &DeviceIdentity,
        reverted: &OverrideSession,
        revert_result: Result<()>,
    ) -> Result<StopOutcome> {
        let Some(current) = self.registry.get(&identity.device_id) else {
            tracing::debug!(
                target: "geoport::coordinator",
                device_id = %identity.device_id,
                "Override already stopped by a concurrent call"
            );
            return Ok(StopOutcome::nothing_to_stop());
        };

        // The revert may have landed after the newer apply on the same
        // mechanism, wiping the coordinate the registry now reports.
        if current.mechanism == reverted.mechanism {
            let mechanism = self.selector.mechanism_for(current.mechanism);
            if let Err(e) = mechanism.apply(identity, current.coordinate).await {
                tracing::warn!(
                    target: "geoport::coordinator",
                    device_id = %identity.device_id,
                    mechanism = %current.mechanism,
                    error = %e,
                    "Could not restore the newer override after a superseded stop"
                );
                return Err(e);
            }
        }

        tracing::info!(
            target: "geoport::coordinator",
            device_id = %identity.device_id,
            "Stop superseded by a newer override"
        );
        revert_result.map(|_| StopOutcome::superseded())
    }

    /// Current override state of the device.
    pub async fn get_status(&self, device_id: &str, authorization: &str) -> Result<OverrideStatus> {
        let identity = DeviceIdentity::from_parts(device_id, authorization)?;
        Ok(self
            .registry
            .get(&identity.device_id)
            .map(|session| session.status())
            .unwrap_or_else(OverrideStatus::inactive))
    }

    /// History, newest first, at most `limit` entries (default from config, ceiling 50).
    pub async fn get_history(
        &self,
        device_id: &str,
        authorization: &str,
        limit: Option<usize>,
    ) -> Result<Vec<HistoryEntry>> {
        let identity = DeviceIdentity::from_parts(device_id, authorization)?;
        let limit = limit.unwrap_or_else(|| self.history_config.effective_limit());
        self.history.list(&identity.device_id, Some(limit)).await
    }

    /// Removes one history entry. Returns whether it existed.
    pub async fn remove_history_entry(
        &self,
        device_id: &str,
        authorization: &str,
        entry_id: Uuid,
    ) -> Result<bool> {
        let identity = DeviceIdentity::from_parts(device_id, authorization)?;
        self.history.remove(&identity.device_id, entry_id).await
    }

    pub async fn clear_history(&self, device_id: &str, authorization: &str) -> Result<()> {
        let identity = DeviceIdentity::from_parts(device_id, authorization)?;
        self.history.clear(&identity.device_id).await
    }

    /// Re-applies a history entry's coordinate and name.
    ///
    /// Returns `Ok(None)` when the entry does not exist.
    pub async fn reapply_history_entry(
        &self,
        device_id: &str,
        authorization: &str,
        entry_id: Uuid,
        source: Option<&str>,
    ) -> Result<Option<OverrideReceipt>> {
        let identity = DeviceIdentity::from_parts(device_id, authorization)?;
        let Some(entry) = self.history.find(&identity.device_id, entry_id).await? else {
            return Ok(None);
        };

        self.apply_override(&identity, entry.coordinate, source, Some(&entry.name))
            .await
            .map(Some)
    }

    /// Position held by the local simulation mechanism for the device.
    pub async fn simulated_position(&self, device_id: &str) -> Option<Coordinate> {
        self.selector.simulation().simulated_position(device_id).await
    }

    pub async fn health(&self) -> HealthSnapshot {
        let now = Utc::now();
        HealthSnapshot {
            status: "ok".to_string(),
            active_sessions: self.registry.len(),
            uptime_secs: (now - self.started_at).num_seconds(),
            timestamp: now,
            available_mechanisms: self.selector.available_kinds(),
        }
    }
}
