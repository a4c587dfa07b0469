use std::collections::HashSet;
use std::path::Path;

use chrono_tz::Tz;
use serde::Deserialize;

use crate::model::{HOUR_MS, MINUTE_MS, Ms};

/// Engine configuration: the equipment pool and the time policy.
///
/// The equipment list doubles as the canonical display casing and the
/// stable display order. Lookups are case-insensitive end to end.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct EngineConfig {
    pub equipment: Vec<String>,
    pub timezone: Tz,
    /// How far into the future a reservation may start (12 or 24 in practice).
    pub horizon_hours: i64,
    /// Duration granted when the waitlist head is auto-started.
    pub auto_start_minutes: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            equipment: [
                "PelotonMast",
                "Treadmill",
                "FanBike",
                "CableMachine",
                "PelotonTank",
                "Rower",
            ]
            .map(String::from)
            .to_vec(),
            timezone: chrono_tz::America::New_York,
            horizon_hours: 24,
            auto_start_minutes: 30,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Read(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Read(e) => write!(f, "failed to read config file: {e}"),
            ConfigError::Parse(e) => write!(f, "failed to parse TOML: {e}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Read(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl EngineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.equipment.is_empty() {
            return Err(ConfigError::Invalid("equipment pool is empty".into()));
        }
        let mut seen = HashSet::new();
        for name in &self.equipment {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid("blank equipment name".into()));
            }
            if !seen.insert(name.to_lowercase()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate equipment name: {name}"
                )));
            }
        }
        if self.horizon_hours <= 0 {
            return Err(ConfigError::Invalid("horizon_hours must be positive".into()));
        }
        if self.auto_start_minutes <= 0 {
            return Err(ConfigError::Invalid(
                "auto_start_minutes must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn horizon_ms(&self) -> Ms {
        self.horizon_hours * HOUR_MS
    }

    pub fn auto_start_ms(&self) -> Ms {
        self.auto_start_minutes * MINUTE_MS
    }
}
