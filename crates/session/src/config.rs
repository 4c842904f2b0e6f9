use std::time::Duration;

use layers::MapView;
use serde::{Deserialize, Serialize};

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3000;

/// Everything a host needs to set up a tracking session.
///
/// Every field has a default, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub map: MapView,
    pub poll_interval_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            map: MapView::default(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Json(String),
    InvalidPollInterval(String),
    InvalidCenter,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Json(msg) => write!(f, "config JSON error: {msg}"),
            ConfigError::InvalidPollInterval(value) => {
                write!(f, "poll interval must be a positive number of milliseconds, got {value}")
            }
            ConfigError::InvalidCenter => write!(f, "map center must be a valid [lat, lng]"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl SessionConfig {
    pub fn from_json_str(payload: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig =
            serde_json::from_str(payload).map_err(|e| ConfigError::Json(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidPollInterval("0".to_string()));
        }
        if !self.map.center_point().is_valid() {
            return Err(ConfigError::InvalidCenter);
        }
        Ok(())
    }

    /// Applies a poll interval given as text (e.g. from the environment).
    pub fn override_poll_interval(&mut self, raw: &str) -> Result<(), ConfigError> {
        let ms = raw
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|ms| *ms > 0)
            .ok_or_else(|| ConfigError::InvalidPollInterval(raw.to_string()))?;
        self.poll_interval_ms = ms;
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Json(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, SessionConfig};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[test]
    fn empty_object_is_default() {
        let config = SessionConfig::from_json_str("{}").unwrap();
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.poll_interval(), Duration::from_millis(3000));
    }

    #[test]
    fn rejects_zero_interval() {
        let err = SessionConfig::from_json_str(r#"{"poll_interval_ms": 0}"#).unwrap_err();
        assert_eq!(err, ConfigError::InvalidPollInterval("0".to_string()));
    }

    #[test]
    fn rejects_bad_center() {
        let err = SessionConfig::from_json_str(r#"{"map": {"center": [120.0, 0.0]}}"#).unwrap_err();
        assert_eq!(err, ConfigError::InvalidCenter);
    }

    #[test]
    fn override_parses_milliseconds() {
        let mut config = SessionConfig::default();
        config.override_poll_interval(" 1500 ").unwrap();
        assert_eq!(config.poll_interval_ms, 1500);
        assert!(config.override_poll_interval("fast").is_err());
        assert_eq!(config.poll_interval_ms, 1500);
    }

    #[test]
    fn pretty_json_round_trips() {
        let config = SessionConfig::default();
        let text = config.to_json_pretty().unwrap();
        assert_eq!(SessionConfig::from_json_str(&text).unwrap(), config);
    }
}
