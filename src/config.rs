//! TOML-based system configuration.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// First hour (inclusive) of the peak tariff window.
pub const PEAK_START_HOUR: u8 = 6;
/// Last hour (inclusive) of the peak tariff window.
pub const PEAK_END_HOUR: u8 = 22;

/// Returns whether the given hour falls in the peak tariff window.
pub fn is_peak_hour(hour: u8) -> bool {
    (PEAK_START_HOUR..=PEAK_END_HOUR).contains(&hour)
}

/// System configuration parsed from TOML.
///
/// All fields have defaults; load from TOML with
/// [`SystemConfig::from_toml_file`] or use [`SystemConfig::default`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SystemConfig {
    /// Maximum simultaneous load the system admits (watts, must be > 0).
    pub max_load_capacity_w: f32,
    /// Scheduling tariff applied inside the peak window (per kWh).
    pub peak_tariff: f32,
    /// Scheduling tariff applied outside the peak window (per kWh).
    pub offpeak_tariff: f32,
    /// Per-unit rate used for historical cost estimates (per kWh).
    pub cost_per_kwh: f32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            max_load_capacity_w: 5000.0,
            peak_tariff: 20.0,
            offpeak_tariff: 10.0,
            cost_per_kwh: 15.0,
        }
    }
}

impl SystemConfig {
    /// Loads and validates a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read, the TOML is
    /// invalid, or a field violates its constraint.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks field constraints after parsing.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("max_load_capacity_w", self.max_load_capacity_w),
            ("peak_tariff", self.peak_tariff),
            ("offpeak_tariff", self.offpeak_tariff),
            ("cost_per_kwh", self.cost_per_kwh),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    message: "must be a finite value > 0",
                });
            }
        }
        Ok(())
    }

    /// Tariff applied to a task scheduled at the given hour.
    pub fn tariff_for_hour(&self, hour: u8) -> f32 {
        if is_peak_hour(hour) {
            self.peak_tariff
        } else {
            self.offpeak_tariff
        }
    }
}

/// Configuration loading or validation error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config `{path}`: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid TOML in config `{path}`: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("config error: {field} — {message}")]
    Invalid {
        field: &'static str,
        message: &'static str,
    },
}
