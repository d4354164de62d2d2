//! Supervisor configuration.
//!
//! Sources, in order of precedence:
//! - Environment variables prefixed with `BMS_`
//! - A TOML file
//! - Built-in defaults
//!
//! ```toml
//! [limits.voltage]
//! min = 2.5
//! max = 4.2
//!
//! [soc]
//! sample_interval_secs = 100.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::limits::Limits;

pub const SECONDS_PER_HOUR: f64 = 3600.0;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BmsConfig {
    pub limits: Limits,
    pub soc: SocConfig,
    pub logging: LoggingConfig,
}

/// State-of-charge integration parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocConfig {
    /// SOC at the start of a session, as a fraction of rated capacity.
    pub initial: f64,

    /// Discharging never drives SOC below this value.
    pub floor: f64,

    /// Time represented by one sample. 100 s gives `delta = I / (36 * C)`.
    pub sample_interval_secs: f64,
}

impl Default for SocConfig {
    fn default() -> Self {
        Self {
            initial: 0.0,
            floor: 0.0,
            sample_interval_secs: 100.0,
        }
    }
}

impl SocConfig {
    /// SOC change for `current` amps drawn from `capacity` amp-hours over one sample.
    pub fn delta(&self, current: f64, capacity: f64) -> f64 {
        current * self.sample_interval_secs / (SECONDS_PER_HOUR * capacity)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl BmsConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file, apply `BMS_*` overrides and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&raw)?;
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus `BMS_*` overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Looks for:
    /// - `BMS_SAMPLE_INTERVAL_SECS`
    /// - `BMS_INITIAL_SOC`
    /// - `BMS_LOG_LEVEL`
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(v) = std::env::var("BMS_SAMPLE_INTERVAL_SECS") {
            self.soc.sample_interval_secs = v.parse().map_err(|e| {
                ConfigError::Invalid(format!("Invalid BMS_SAMPLE_INTERVAL_SECS: {}", e))
            })?;
        }

        if let Ok(v) = std::env::var("BMS_INITIAL_SOC") {
            self.soc.initial = v
                .parse()
                .map_err(|e| ConfigError::Invalid(format!("Invalid BMS_INITIAL_SOC: {}", e)))?;
        }

        if let Ok(level) = std::env::var("BMS_LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let l = &self.limits;
        let ranges = [
            ("limits.voltage", l.voltage),
            ("limits.charging.current", l.charging.current),
            ("limits.charging.temperature", l.charging.temperature),
            ("limits.discharging.current", l.discharging.current),
            ("limits.discharging.temperature", l.discharging.temperature),
            ("limits.soc", l.soc),
        ];
        for (name, range) in ranges {
            if !range.is_valid() {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be finite with min <= max"
                )));
            }
        }

        if l.soc.min < 0.0 || l.soc.max > 1.0 {
            return Err(ConfigError::Invalid(
                "limits.soc must lie within [0, 1]".into(),
            ));
        }

        let soc = &self.soc;
        if !(soc.sample_interval_secs.is_finite() && soc.sample_interval_secs > 0.0) {
            return Err(ConfigError::Invalid(
                "soc.sample_interval_secs must be positive".into(),
            ));
        }
        if !soc.floor.is_finite() || !soc.initial.is_finite() {
            return Err(ConfigError::Invalid("soc values must be finite".into()));
        }
        if soc.initial < soc.floor {
            return Err(ConfigError::Invalid(
                "soc.initial must not be below soc.floor".into(),
            ));
        }

        Ok(())
    }
}
