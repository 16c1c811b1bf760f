//! In-process room store used by tests and by embedders that run both seats in one process.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use dashmap::DashMap;
use futures::future::BoxFuture;
use thiserror::Error;
use tokio::time::Instant;

use crate::dao::{
    models::{RoomField, RoomKey},
    room_store::RoomStore,
    storage::{StorageError, StorageResult},
};

/// Failure injected when the store is switched offline.
#[derive(Debug, Error)]
#[error("in-memory room store is offline")]
pub struct MemoryStoreOffline;

#[derive(Debug, Default)]
struct StoredRoom {
    fields: HashMap<RoomField, String>,
    expires_at: Option<Instant>,
}

impl StoredRoom {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= now)
    }
}

/// Room store backed by a concurrent map, with lazy TTL eviction on access.
#[derive(Clone, Default)]
pub struct MemoryRoomStore {
    rooms: Arc<DashMap<RoomKey, StoredRoom>>,
    offline: Arc<AtomicBool>,
}

impl MemoryRoomStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail (or succeed again) as if the connection dropped.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of live (non-expired) rooms.
    pub fn room_count(&self) -> usize {
        let now = Instant::now();
        self.rooms.iter().filter(|room| !room.is_expired(now)).count()
    }

    fn check_online(&self, operation: &str) -> StorageResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StorageError::unavailable(
                format!("{operation} failed"),
                MemoryStoreOffline,
            ));
        }
        Ok(())
    }

    fn evict_if_expired(&self, key: &RoomKey) {
        let now = Instant::now();
        self.rooms.remove_if(key, |_, room| room.is_expired(now));
    }

    fn set(&self, key: RoomKey, field: RoomField, value: String) -> StorageResult<()> {
        self.check_online("set_field")?;
        self.evict_if_expired(&key);
        self.rooms.entry(key).or_default().fields.insert(field, value);
        Ok(())
    }

    fn set_if_empty(&self, key: RoomKey, field: RoomField, value: String) -> StorageResult<bool> {
        self.check_online("set_field_if_empty")?;
        self.evict_if_expired(&key);
        let Some(mut room) = self.rooms.get_mut(&key) else {
            return Ok(false);
        };
        match room.fields.get_mut(&field) {
            Some(current) if current.is_empty() => {
                *current = value;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn get(&self, key: RoomKey, field: RoomField) -> StorageResult<Option<String>> {
        self.check_online("get_field")?;
        self.evict_if_expired(&key);
        Ok(self
            .rooms
            .get(&key)
            .and_then(|room| room.fields.get(&field).cloned()))
    }

    fn contains(&self, key: RoomKey) -> StorageResult<bool> {
        self.check_online("exists")?;
        self.evict_if_expired(&key);
        Ok(self.rooms.contains_key(&key))
    }

    fn set_expiry(&self, key: RoomKey, ttl: Duration) -> StorageResult<()> {
        self.check_online("expire")?;
        self.evict_if_expired(&key);
        if let Some(mut room) = self.rooms.get_mut(&key) {
            room.expires_at = Some(Instant::now() + ttl);
        }
        Ok(())
    }

    fn remove(&self, key: RoomKey) -> StorageResult<()> {
        self.check_online("delete")?;
        self.rooms.remove(&key);
        Ok(())
    }
}

impl RoomStore for MemoryRoomStore {
    fn set_field(
        &self,
        key: RoomKey,
        field: RoomField,
        value: String,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let result = self.set(key, field, value);
        Box::pin(async move { result })
    }

    fn set_field_if_empty(
        &self,
        key: RoomKey,
        field: RoomField,
        value: String,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let result = self.set_if_empty(key, field, value);
        Box::pin(async move { result })
    }

    fn get_field(
        &self,
        key: RoomKey,
        field: RoomField,
    ) -> BoxFuture<'static, StorageResult<Option<String>>> {
        let result = self.get(key, field);
        Box::pin(async move { result })
    }

    fn exists(&self, key: RoomKey) -> BoxFuture<'static, StorageResult<bool>> {
        let result = self.contains(key);
        Box::pin(async move { result })
    }

    fn expire(&self, key: RoomKey, ttl: Duration) -> BoxFuture<'static, StorageResult<()>> {
        let result = self.set_expiry(key, ttl);
        Box::pin(async move { result })
    }

    fn delete(&self, key: RoomKey) -> BoxFuture<'static, StorageResult<()>> {
        let result = self.remove(key);
        Box::pin(async move { result })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let result = self.check_online("ping");
        Box::pin(async move { result })
    }
}
