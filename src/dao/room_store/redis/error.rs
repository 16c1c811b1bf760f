//! Error types shared by the Redis room store implementation.

use redis::RedisError;
use thiserror::Error;

/// Convenient result alias returning [`RedisDaoError`] failures.
pub type RedisResult<T> = Result<T, RedisDaoError>;

/// Failures that can occur while interacting with Redis.
#[derive(Debug, Error)]
pub enum RedisDaoError {
    /// The connection URL could not be parsed.
    #[error("invalid Redis URL `{url}`")]
    InvalidUrl {
        url: String,
        #[source]
        source: RedisError,
    },
    /// The server never answered the initial ping.
    #[error("Redis ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        attempts: u32,
        #[source]
        source: RedisError,
    },
    /// A later ping failed.
    #[error("Redis ping health check failed")]
    HealthPing {
        #[source]
        source: RedisError,
    },
    /// A command against a room key failed.
    #[error("Redis `{command}` failed for `{key}`")]
    Command {
        command: &'static str,
        key: String,
        #[source]
        source: RedisError,
    },
}
