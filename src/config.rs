//! Application-level configuration loading, including the match timing settings.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the client looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/jokenpo.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "JOKENPO_CONFIG_PATH";

const DEFAULT_ROOM_TTL: Duration = Duration::from_secs(300);
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(300);
const DEFAULT_MOVE_TIMEOUT: Duration = Duration::from_secs(120);
const DEFAULT_ROOM_ID_LENGTH: usize = 6;
const DEFAULT_MAX_ROOM_ID_ATTEMPTS: u32 = 5;
/// Upper bound for every `*_secs` setting.
const MAX_SETTING_SECS: u64 = 86_400;

/// Timing and sizing knobs for a single match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSettings {
    /// Store-enforced lifetime of a freshly created room.
    pub room_ttl: Duration,
    /// Pause between two reads of the room while waiting.
    pub poll_interval: Duration,
    /// Budget for the readiness barrier.
    pub ready_timeout: Duration,
    /// Budget for the move exchange.
    pub move_timeout: Duration,
    /// Number of characters in a generated room token.
    pub room_id_length: usize,
    /// How many tokens to try before giving up on a free room id.
    pub max_room_id_attempts: u32,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            room_ttl: DEFAULT_ROOM_TTL,
            poll_interval: DEFAULT_POLL_INTERVAL,
            ready_timeout: DEFAULT_READY_TIMEOUT,
            move_timeout: DEFAULT_MOVE_TIMEOUT,
            room_id_length: DEFAULT_ROOM_ID_LENGTH,
            max_room_id_attempts: DEFAULT_MAX_ROOM_ID_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, Default)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Settings applied to every match started by this process.
    pub settings: MatchSettings,
}

impl AppConfig {
    /// Load the configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(app_config) => {
                    info!(path = %path.display(), "loaded match settings from config");
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a JSON document; absent or zero values keep their defaults.
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    room_ttl_secs: Option<u64>,
    poll_interval_secs: Option<u64>,
    ready_timeout_secs: Option<u64>,
    move_timeout_secs: Option<u64>,
    room_id_length: Option<usize>,
    max_room_id_attempts: Option<u32>,
}

impl From<RawConfig> for AppConfig {
    fn from(raw: RawConfig) -> Self {
        let defaults = MatchSettings::default();
        let settings = MatchSettings {
            room_ttl: seconds_or("room_ttl_secs", raw.room_ttl_secs, defaults.room_ttl),
            poll_interval: seconds_or(
                "poll_interval_secs",
                raw.poll_interval_secs,
                defaults.poll_interval,
            ),
            ready_timeout: seconds_or(
                "ready_timeout_secs",
                raw.ready_timeout_secs,
                defaults.ready_timeout,
            ),
            move_timeout: seconds_or(
                "move_timeout_secs",
                raw.move_timeout_secs,
                defaults.move_timeout,
            ),
            room_id_length: positive_or(
                "room_id_length",
                raw.room_id_length,
                defaults.room_id_length,
            ),
            max_room_id_attempts: positive_or(
                "max_room_id_attempts",
                raw.max_room_id_attempts,
                defaults.max_room_id_attempts,
            ),
        };
        Self { settings }
    }
}

fn seconds_or(name: &str, value: Option<u64>, default: Duration) -> Duration {
    let secs = positive_or(name, value, default.as_secs());
    if secs > MAX_SETTING_SECS {
        warn!(setting = name, secs, max = MAX_SETTING_SECS, "value too large; clamping");
        return Duration::from_secs(MAX_SETTING_SECS);
    }
    Duration::from_secs(secs)
}

fn positive_or<T>(name: &str, value: Option<T>, default: T) -> T
where
    T: PartialEq + Default,
{
    match value {
        Some(value) if value == T::default() => {
            warn!(setting = name, "zero is not allowed; using default");
            default
        }
        Some(value) => value,
        None => default,
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
