use std::env;

/// Environment variable holding the Redis connection URL.
pub const REDIS_URL_ENV: &str = "REDIS_URL";
/// URL used when [`REDIS_URL_ENV`] is not set.
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379/0";

/// Runtime configuration describing how to reach the Redis server.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Connection URL, e.g. `redis://host:port/db`.
    pub url: String,
}

impl RedisConfig {
    /// Construct a configuration from an explicit URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Build a configuration from [`REDIS_URL_ENV`], falling back to [`DEFAULT_REDIS_URL`].
    pub fn from_env() -> Self {
        let url = env::var(REDIS_URL_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REDIS_URL.into());
        Self::new(url)
    }
}
