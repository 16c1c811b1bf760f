mod config;
mod error;
mod store;

pub use config::RedisConfig;
pub use error::RedisDaoError;
pub use store::RedisRoomStore;

use crate::dao::storage::StorageError;

impl From<RedisDaoError> for StorageError {
    fn from(err: RedisDaoError) -> Self {
        StorageError::unavailable(err.to_string(), err)
    }
}
