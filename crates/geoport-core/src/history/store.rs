use super::model::{HistoryEntry, MAX_HISTORY_ENTRIES};
use crate::coordinate::Coordinate;
use crate::error::{GeoportError, Result};
use crate::kv::KeyValueStore;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

type DeviceLocks = Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>;

const HISTORY_KEY_PREFIX: &str = "override_history/";

/// Bounded, spatially de-duplicated log of past overrides, one sequence per device.
///
/// Each mutation is a read-modify-write of the device's whole sequence
/// through the injected [`KeyValueStore`]. Mutations for the same device
/// are serialized by a per-device async lock; different devices never
/// share a lock. A device's lock lives only while some operation holds or
/// waits on it.
pub struct OverrideHistoryStore {
    store: Arc<dyn KeyValueStore>,
    device_locks: DeviceLocks,
}

/// Exclusive access to one device's history; prunes the lock entry on drop
/// when no other operation is holding or waiting on it.
struct DeviceGuard<'a> {
    locks: &'a DeviceLocks,
    device_id: String,
    lock: Arc<tokio::sync::Mutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for DeviceGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // One reference in the map, one here: nobody else is queued.
        if Arc::strong_count(&self.lock) == 2 {
            locks.remove(&self.device_id);
        }
    }
}

impl OverrideHistoryStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            device_locks: Mutex::new(HashMap::new()),
        }
    }

    fn key(device_id: &str) -> String {
        format!("{}{}", HISTORY_KEY_PREFIX, device_id)
    }

    async fn lock_device(&self, device_id: &str) -> DeviceGuard<'_> {
        let lock = {
            let mut locks = self
                .device_locks
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            locks
                .entry(device_id.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };
        let guard = lock.clone().lock_owned().await;
        DeviceGuard {
            locks: &self.device_locks,
            device_id: device_id.to_string(),
            lock,
            guard: Some(guard),
        }
    }

    async fn load(&self, device_id: &str) -> Result<Vec<HistoryEntry>> {
        match self.store.get(&Self::key(device_id)).await? {
            Some(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                GeoportError::persistence(format!(
                    "history for device '{}' is unreadable: {}",
                    device_id, e
                ))
            }),
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, device_id: &str, entries: &[HistoryEntry]) -> Result<()> {
        let bytes = serde_json::to_vec(entries)?;
        self.store.set(&Self::key(device_id), bytes).await
    }

    /// Records an override for `device_id`.
    ///
    /// If an entry within 0.0001° (both axes) already exists, that entry is
    /// refreshed in place of appending: its timestamp, source and name are
    /// updated and it moves to the front. Otherwise a new entry is inserted
    /// at the front. The sequence is then trimmed to 50 entries and persisted.
    ///
    /// Returns the recorded entry.
    pub async fn append(
        &self,
        device_id: &str,
        coordinate: Coordinate,
        name: &str,
        source: &str,
    ) -> Result<HistoryEntry> {
        let _guard = self.lock_device(device_id).await;

        let mut entries = self.load(device_id).await?;

        let entry = match entries.iter().position(|e| e.is_near(&coordinate)) {
            Some(index) => {
                let mut existing = entries.remove(index);
                existing.timestamp = Utc::now();
                existing.source = source.to_string();
                existing.name = name.to_string();
                existing
            }
            None => HistoryEntry::new(coordinate, name, source),
        };
        entries.insert(0, entry.clone());
        entries.truncate(MAX_HISTORY_ENTRIES);

        self.save(device_id, &entries).await?;

        tracing::debug!(
            target: "geoport::history",
            device_id,
            entries = entries.len(),
            "History entry recorded"
        );

        Ok(entry)
    }

    /// Lists entries newest first, at most `limit` (default and ceiling 50).
    pub async fn list(&self, device_id: &str, limit: Option<usize>) -> Result<Vec<HistoryEntry>> {
        let limit = limit
            .unwrap_or(MAX_HISTORY_ENTRIES)
            .min(MAX_HISTORY_ENTRIES);
        let mut entries = self.load(device_id).await?;
        entries.truncate(limit);
        Ok(entries)
    }

    /// Looks up one entry by id.
    pub async fn find(&self, device_id: &str, entry_id: Uuid) -> Result<Option<HistoryEntry>> {
        let entries = self.load(device_id).await?;
        Ok(entries.into_iter().find(|e| e.id == entry_id))
    }

    /// Removes one entry. Returns whether it existed.
    pub async fn remove(&self, device_id: &str, entry_id: Uuid) -> Result<bool> {
        let _guard = self.lock_device(device_id).await;

        let mut entries = self.load(device_id).await?;
        let before = entries.len();
        entries.retain(|e| e.id != entry_id);
        if entries.len() == before {
            return Ok(false);
        }

        self.save(device_id, &entries).await?;
        Ok(true)
    }

    /// Drops the whole sequence for `device_id`.
    pub async fn clear(&self, device_id: &str) -> Result<()> {
        let _guard = self.lock_device(device_id).await;

        self.store.remove(&Self::key(device_id)).await
    }
}
