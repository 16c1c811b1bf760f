use std::time::Duration;

use futures::future::BoxFuture;
use redis::{AsyncCommands, Client, Script, aio::MultiplexedConnection};
use tokio::time::sleep;
use tracing::{debug, warn};

use super::{
    config::RedisConfig,
    error::{RedisDaoError, RedisResult},
};
use crate::dao::{
    models::{RoomField, RoomKey},
    room_store::RoomStore,
    storage::StorageResult,
};

/// Writes ARGV[2] into field ARGV[1] only when it currently holds an empty string.
const SET_IF_EMPTY_SCRIPT: &str = r#"
if redis.call('HGET', KEYS[1], ARGV[1]) == '' then
    redis.call('HSET', KEYS[1], ARGV[1], ARGV[2])
    return 1
end
return 0
"#;

struct RetryPolicy;

impl RetryPolicy {
    const MAX_ATTEMPTS: u32 = 3;
    const INITIAL_DELAY_MS: u64 = 250;

    fn initial_delay() -> Duration {
        Duration::from_millis(Self::INITIAL_DELAY_MS)
    }

    fn next_delay(current: Duration) -> Duration {
        (current * 2).min(Duration::from_secs(2))
    }
}

/// Room store talking to a Redis server over one multiplexed connection.
#[derive(Clone)]
pub struct RedisRoomStore {
    connection: MultiplexedConnection,
    set_if_empty: Script,
}

impl RedisRoomStore {
    /// Open a connection and make sure the server answers before handing it out.
    pub async fn connect(config: RedisConfig) -> RedisResult<Self> {
        let client =
            Client::open(config.url.as_str()).map_err(|source| RedisDaoError::InvalidUrl {
                url: config.url.clone(),
                source,
            })?;

        let mut attempts = 0;
        let mut delay = RetryPolicy::initial_delay();

        let connection = loop {
            let attempt = async {
                let mut connection = client.get_multiplexed_async_connection().await?;
                let _: () = redis::cmd("PING").query_async(&mut connection).await?;
                Ok::<_, redis::RedisError>(connection)
            };
            match attempt.await {
                Ok(connection) => break connection,
                Err(err) => {
                    attempts += 1;
                    if attempts >= RetryPolicy::MAX_ATTEMPTS {
                        return Err(RedisDaoError::InitialPing {
                            attempts,
                            source: err,
                        });
                    }
                    warn!(attempts, error = %err, "Redis connection attempt failed; retrying");
                    sleep(delay).await;
                    delay = RetryPolicy::next_delay(delay);
                }
            }
        };

        debug!(url = %config.url, "connected to Redis");
        Ok(Self {
            connection,
            set_if_empty: Script::new(SET_IF_EMPTY_SCRIPT),
        })
    }
}

fn command_error(
    command: &'static str,
    key: &RoomKey,
) -> impl FnOnce(redis::RedisError) -> RedisDaoError {
    let key = key.to_string();
    move |source| RedisDaoError::Command {
        command,
        key,
        source,
    }
}

impl RoomStore for RedisRoomStore {
    fn set_field(
        &self,
        key: RoomKey,
        field: RoomField,
        value: String,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let mut connection = self.connection.clone();
        Box::pin(async move {
            let _: () = connection
                .hset(key.as_str(), field.as_str(), value)
                .await
                .map_err(command_error("HSET", &key))?;
            Ok(())
        })
    }

    fn set_field_if_empty(
        &self,
        key: RoomKey,
        field: RoomField,
        value: String,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let mut connection = self.connection.clone();
        let script = self.set_if_empty.clone();
        Box::pin(async move {
            let written: i64 = script
                .key(key.as_str())
                .arg(field.as_str())
                .arg(value)
                .invoke_async(&mut connection)
                .await
                .map_err(command_error("EVALSHA", &key))?;
            Ok(written == 1)
        })
    }

    fn get_field(
        &self,
        key: RoomKey,
        field: RoomField,
    ) -> BoxFuture<'static, StorageResult<Option<String>>> {
        let mut connection = self.connection.clone();
        Box::pin(async move {
            let value: Option<String> = connection
                .hget(key.as_str(), field.as_str())
                .await
                .map_err(command_error("HGET", &key))?;
            Ok(value)
        })
    }

    fn exists(&self, key: RoomKey) -> BoxFuture<'static, StorageResult<bool>> {
        let mut connection = self.connection.clone();
        Box::pin(async move {
            let exists: bool = connection
                .exists(key.as_str())
                .await
                .map_err(command_error("EXISTS", &key))?;
            Ok(exists)
        })
    }

    fn expire(&self, key: RoomKey, ttl: Duration) -> BoxFuture<'static, StorageResult<()>> {
        let mut connection = self.connection.clone();
        let seconds = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX).max(1);
        Box::pin(async move {
            let _: () = connection
                .expire(key.as_str(), seconds)
                .await
                .map_err(command_error("EXPIRE", &key))?;
            Ok(())
        })
    }

    fn delete(&self, key: RoomKey) -> BoxFuture<'static, StorageResult<()>> {
        let mut connection = self.connection.clone();
        Box::pin(async move {
            let _: () = connection
                .del(key.as_str())
                .await
                .map_err(command_error("DEL", &key))?;
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let mut connection = self.connection.clone();
        Box::pin(async move {
            let _: () = redis::cmd("PING")
                .query_async(&mut connection)
                .await
                .map_err(|source| RedisDaoError::HealthPing { source })?;
            Ok(())
        })
    }
}
