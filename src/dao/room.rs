use std::{sync::Arc, time::Duration};

use crate::dao::{
    models::{FLAG_UP, RoomField, RoomKey},
    room_store::RoomStore,
    storage::StorageResult,
};

/// Data Access Object wrapping a [`RoomStore`] with room-shaped operations.
#[derive(Clone)]
pub struct RoomRepository {
    store: Arc<dyn RoomStore>,
}

impl RoomRepository {
    /// Wrap a store backend.
    pub fn new(store: Arc<dyn RoomStore>) -> Self {
        Self { store }
    }

    /// Write the four default fields and arm the expiry.
    pub async fn create(&self, key: &RoomKey, ttl: Duration) -> StorageResult<()> {
        for field in RoomField::ALL {
            self.store
                .set_field(key.clone(), field, field.default_value().to_owned())
                .await?;
        }
        self.store.expire(key.clone(), ttl).await
    }

    /// Whether the room record is still there.
    pub async fn exists(&self, key: &RoomKey) -> StorageResult<bool> {
        self.store.exists(key.clone()).await
    }

    /// Raw value of a field; `None` when the room (or the field) is gone.
    pub async fn field(&self, key: &RoomKey, field: RoomField) -> StorageResult<Option<String>> {
        self.store.get_field(key.clone(), field).await
    }

    /// Whether a readiness flag is raised; `None` when the room is gone.
    pub async fn flag(&self, key: &RoomKey, field: RoomField) -> StorageResult<Option<bool>> {
        let value = self.field(key, field).await?;
        Ok(value.map(|value| value == FLAG_UP))
    }

    /// Set a readiness flag to up.
    pub async fn raise_flag(&self, key: &RoomKey, field: RoomField) -> StorageResult<()> {
        self.store
            .set_field(key.clone(), field, FLAG_UP.to_owned())
            .await
    }

    /// Write a move into its field unless someone already did. Returns whether it was written.
    pub async fn claim_move(
        &self,
        key: &RoomKey,
        field: RoomField,
        value: String,
    ) -> StorageResult<bool> {
        self.store.set_field_if_empty(key.clone(), field, value).await
    }

    /// Replace the remaining lifetime of the room.
    pub async fn expire(&self, key: &RoomKey, ttl: Duration) -> StorageResult<()> {
        self.store.expire(key.clone(), ttl).await
    }

    /// Remove the room record; missing rooms are fine.
    pub async fn delete(&self, key: &RoomKey) -> StorageResult<()> {
        self.store.delete(key.clone()).await
    }

    /// Round-trip to the backend.
    pub async fn health_check(&self) -> StorageResult<()> {
        self.store.health_check().await
    }
}
