use serde::Deserialize;
use tracing::error;

use crate::types::LoopMode;
use crate::{Error, Result};

pub const DEFAULT_PRECISION: f64 = 0.5;
const VALID_PRECISIONS: [f64; 3] = [0.1, 0.5, 1.0];

fn default_true() -> bool {
    true
}

fn default_precision() -> f64 {
    DEFAULT_PRECISION
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClimateConfig {
    pub host: String,
    pub name: String,
    /// Deprecated. Discovery resolves the device by host alone.
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub unique_id: Option<String>,
    #[serde(default)]
    pub schedule: LoopMode,
    #[serde(default = "default_true")]
    pub use_external_temp: bool,
    #[serde(default = "default_precision")]
    pub precision: f64,
    #[serde(default)]
    pub use_cooling: bool,
}

impl ClimateConfig {
    pub fn new(host: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            name: name.into(),
            mac: None,
            unique_id: None,
            schedule: LoopMode::default(),
            use_external_temp: true,
            precision: DEFAULT_PRECISION,
            use_cooling: false,
        }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_common(&self.host, &self.name, self.mac.as_deref())?;
        if !VALID_PRECISIONS.contains(&self.precision) {
            return Err(Error::Config(format!(
                "precision must be one of {VALID_PRECISIONS:?}, got {}",
                self.precision
            )));
        }
        Ok(())
    }
}

/// What the switch does when turned off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnOffMode {
    /// Drop the setpoint to the device minimum.
    #[default]
    MinTemp,
    /// Cut power to the thermostat.
    TurnOff,
}

/// What the switch does when turned on: drive to the device maximum or to a
/// fixed setpoint.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(try_from = "TurnOnModeRepr")]
pub enum TurnOnMode {
    #[default]
    MaxTemp,
    Temperature(f64),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TurnOnModeRepr {
    Temperature(f64),
    Named(String),
}

impl TryFrom<TurnOnModeRepr> for TurnOnMode {
    type Error = Error;

    fn try_from(repr: TurnOnModeRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            TurnOnModeRepr::Temperature(t) => Ok(TurnOnMode::Temperature(t)),
            TurnOnModeRepr::Named(name) if name == "max_temp" => Ok(TurnOnMode::MaxTemp),
            TurnOnModeRepr::Named(name) => Err(Error::Config(format!(
                "turn_on_mode must be \"max_temp\" or a temperature, got {name:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SwitchConfig {
    pub host: String,
    pub name: String,
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub unique_id: Option<String>,
    #[serde(default = "default_true")]
    pub use_external_temp: bool,
    #[serde(default)]
    pub turn_off_mode: TurnOffMode,
    #[serde(default)]
    pub turn_on_mode: TurnOnMode,
}

impl SwitchConfig {
    pub fn new(host: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            name: name.into(),
            mac: None,
            unique_id: None,
            use_external_temp: true,
            turn_off_mode: TurnOffMode::default(),
            turn_on_mode: TurnOnMode::default(),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_common(&self.host, &self.name, self.mac.as_deref())
    }
}

fn validate_common(host: &str, name: &str, mac: Option<&str>) -> Result<()> {
    if host.trim().is_empty() {
        return Err(Error::Config("host is required".to_string()));
    }
    if name.trim().is_empty() {
        return Err(Error::Config("name is required".to_string()));
    }
    if mac.is_some() {
        error!(host, "mac option is deprecated and ignored, remove it from the config");
    }
    Ok(())
}
