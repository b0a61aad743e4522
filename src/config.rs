use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

// ============================================================================
// Configuration
// ============================================================================
//
// Settings are resolved in three layers, later layers winning:
//
//   1. built-in defaults
//   2. optional JSON file (`--config`), keys nested under "coffee-house"
//   3. `-Dcoffee-house.<path>=<value>` overrides from the command line
//
// Components receive their part of the settings through their constructor.
//
// ============================================================================

const PREFIX: &str = "coffee-house.";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("unknown setting `{0}`")]
    UnknownKey(String),

    #[error("invalid value `{value}` for `{key}`: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("invalid duration `{0}` (expected e.g. `250ms`, `2s` or plain milliseconds)")]
    InvalidDuration(String),

    #[error("barista accuracy must be within 0..=100, got {0}")]
    AccuracyOutOfRange(u8),

    #[error("barista pool size must be at least 1")]
    EmptyBaristaPool,
}

/// How an order travels from the waiter to a barista
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topology {
    /// The house approves every drink against the caffeine limit first
    #[default]
    AdmissionControlled,
    /// The waiter hands orders straight to the baristas
    Direct,
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topology::AdmissionControlled => f.write_str("admission-controlled"),
            Topology::Direct => f.write_str("direct"),
        }
    }
}

impl FromStr for Topology {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admission-controlled" => Ok(Topology::AdmissionControlled),
            "direct" => Ok(Topology::Direct),
            other => Err(format!(
                "expected `admission-controlled` or `direct`, got `{}`",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Settings {
    /// Drinks the house serves a single guest before refusing
    pub caffeine_limit: u32,
    #[serde(deserialize_with = "duration_format::deserialize")]
    pub status_timeout: Duration,
    pub topology: Topology,
    pub guest: GuestSettings,
    pub barista: BaristaSettings,
    pub waiter: WaiterSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct GuestSettings {
    #[serde(deserialize_with = "duration_format::deserialize")]
    pub finish_coffee_duration: Duration,
    pub complain_on_wrong_coffee: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BaristaSettings {
    #[serde(deserialize_with = "duration_format::deserialize")]
    pub prepare_coffee_duration: Duration,
    /// Percentage of orders prepared as requested
    pub accuracy: u8,
    pub pool_size: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct WaiterSettings {
    pub max_complaint_count: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            caffeine_limit: 1000,
            status_timeout: Duration::from_secs(3),
            topology: Topology::default(),
            guest: GuestSettings::default(),
            barista: BaristaSettings::default(),
            waiter: WaiterSettings::default(),
        }
    }
}

impl Default for GuestSettings {
    fn default() -> Self {
        Self {
            finish_coffee_duration: Duration::from_secs(2),
            complain_on_wrong_coffee: true,
        }
    }
}

impl Default for BaristaSettings {
    fn default() -> Self {
        Self {
            prepare_coffee_duration: Duration::from_secs(2),
            accuracy: 100,
            pool_size: 1,
        }
    }
}

impl Default for WaiterSettings {
    fn default() -> Self {
        Self {
            max_complaint_count: 2,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(rename = "coffee-house", default)]
    coffee_house: Settings,
}

impl Settings {
    /// Resolve defaults, the optional config file and command line overrides
    pub fn load(path: Option<&Path>, overrides: &[(String, String)]) -> Result<Self, ConfigError> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        for (key, value) in overrides {
            settings.apply_override(key, value)?;
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let file: ConfigFile = serde_json::from_str(raw)?;
        Ok(file.coffee_house)
    }

    /// Apply one `coffee-house.<path>=<value>` override. The prefix is optional.
    pub fn apply_override(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let path = key.strip_prefix(PREFIX).unwrap_or(key);
        let value = value.trim();

        match path {
            "caffeine-limit" => self.caffeine_limit = parse_value(key, value)?,
            "status-timeout" => self.status_timeout = parse_duration(value)?,
            "topology" => {
                self.topology = value.parse().map_err(|reason| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                    reason,
                })?
            }
            "guest.finish-coffee-duration" => {
                self.guest.finish_coffee_duration = parse_duration(value)?
            }
            "guest.complain-on-wrong-coffee" => {
                self.guest.complain_on_wrong_coffee = parse_value(key, value)?
            }
            "barista.prepare-coffee-duration" => {
                self.barista.prepare_coffee_duration = parse_duration(value)?
            }
            "barista.accuracy" => self.barista.accuracy = parse_value(key, value)?,
            "barista.pool-size" => self.barista.pool_size = parse_value(key, value)?,
            "waiter.max-complaint-count" => {
                self.waiter.max_complaint_count = parse_value(key, value)?
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }

        tracing::debug!(key = %key, value = %value, "Setting overridden");
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.barista.accuracy > 100 {
            return Err(ConfigError::AccuracyOutOfRange(self.barista.accuracy));
        }
        if self.barista.pool_size == 0 {
            return Err(ConfigError::EmptyBaristaPool);
        }
        Ok(())
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Parse `250ms`, `2s` or a bare number of milliseconds
pub fn parse_duration(raw: &str) -> Result<Duration, ConfigError> {
    let raw = raw.trim();
    let invalid = || ConfigError::InvalidDuration(raw.to_string());

    let (digits, unit) = if let Some(ms) = raw.strip_suffix("ms") {
        (ms, 1)
    } else if let Some(s) = raw.strip_suffix('s') {
        (s, 1000)
    } else {
        (raw, 1)
    };

    let amount: u64 = digits.trim().parse().map_err(|_| invalid())?;
    amount
        .checked_mul(unit)
        .map(Duration::from_millis)
        .ok_or_else(invalid)
}

mod duration_format {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDuration {
        Millis(u64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        match RawDuration::deserialize(deserializer)? {
            RawDuration::Millis(ms) => Ok(Duration::from_millis(ms)),
            RawDuration::Text(text) => {
                super::parse_duration(&text).map_err(serde::de::Error::custom)
            }
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
