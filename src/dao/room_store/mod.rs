/// In-process backend.
pub mod memory;
/// Redis backend shared between processes.
#[cfg(feature = "redis-store")]
pub mod redis;

use std::time::Duration;

use futures::future::BoxFuture;

use crate::dao::{
    models::{RoomField, RoomKey},
    storage::StorageResult,
};

/// Abstraction over the shared key-value store holding room records.
///
/// Every call is a single round-trip and every write is visible to readers in other
/// processes as soon as it returns. Reading a field of a missing room yields `None`.
pub trait RoomStore: Send + Sync {
    /// Create the record if needed and write `value` into `field`.
    fn set_field(
        &self,
        key: RoomKey,
        field: RoomField,
        value: String,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Atomically write `value` only when `field` is present and holds an empty string.
    ///
    /// Returns `false` without writing when the field is missing or already set.
    fn set_field_if_empty(
        &self,
        key: RoomKey,
        field: RoomField,
        value: String,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Current value of `field`, `None` when the room or the field is missing.
    fn get_field(
        &self,
        key: RoomKey,
        field: RoomField,
    ) -> BoxFuture<'static, StorageResult<Option<String>>>;
    /// Whether a record is stored under `key`.
    fn exists(&self, key: RoomKey) -> BoxFuture<'static, StorageResult<bool>>;
    /// Let the store drop the record once `ttl` elapses.
    fn expire(&self, key: RoomKey, ttl: Duration) -> BoxFuture<'static, StorageResult<()>>;
    /// Drop the record. Deleting a missing record succeeds.
    fn delete(&self, key: RoomKey) -> BoxFuture<'static, StorageResult<()>>;
    /// Cheap round-trip proving the store answers.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
