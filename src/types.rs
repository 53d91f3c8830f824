use std::fmt;

use serde::{Deserialize, Serialize};

use crate::protocol::{self, RawStatus};
use crate::Error;

/// Home Assistant's default climate bounds, used until the device reports its own.
pub const DEFAULT_MIN_TEMP: f64 = 7.0;
pub const DEFAULT_MAX_TEMP: f64 = 35.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Power {
    On,
    Off,
}

impl Power {
    pub fn from_raw(code: u8) -> Option<Self> {
        match code {
            protocol::POWER_ON => Some(Power::On),
            protocol::POWER_OFF => Some(Power::Off),
            _ => None,
        }
    }

    pub fn raw(&self) -> u8 {
        match self {
            Power::On => protocol::POWER_ON,
            Power::Off => protocol::POWER_OFF,
        }
    }
}

/// Whether the relay driving the heating/cooling element is energized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Active,
    Idle,
}

impl Activity {
    pub fn from_raw(code: u8) -> Option<Self> {
        match code {
            protocol::ACTIVE => Some(Activity::Active),
            protocol::IDLE => Some(Activity::Idle),
            _ => None,
        }
    }

    pub fn raw(&self) -> u8 {
        match self {
            Activity::Active => protocol::ACTIVE,
            Activity::Idle => protocol::IDLE,
        }
    }
}

/// Schedule-following vs manual setpoint.
///
/// The device encodes `auto_mode` and `temp_manual` with opposite polarity,
/// hence the two pairs of raw conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMode {
    Auto,
    Manual,
}

impl ControlMode {
    pub fn from_mode_raw(code: u8) -> Option<Self> {
        match code {
            protocol::MODE_AUTO => Some(ControlMode::Auto),
            protocol::MODE_MANUAL => Some(ControlMode::Manual),
            _ => None,
        }
    }

    pub fn mode_raw(&self) -> u8 {
        match self {
            ControlMode::Auto => protocol::MODE_AUTO,
            ControlMode::Manual => protocol::MODE_MANUAL,
        }
    }

    pub fn from_temp_raw(code: u8) -> Option<Self> {
        match code {
            protocol::TEMP_AUTO => Some(ControlMode::Auto),
            protocol::TEMP_MANUAL => Some(ControlMode::Manual),
            _ => None,
        }
    }

    pub fn temp_raw(&self) -> u8 {
        match self {
            ControlMode::Auto => protocol::TEMP_AUTO,
            ControlMode::Manual => protocol::TEMP_MANUAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sensor {
    Internal,
    External,
    Both,
}

impl Sensor {
    pub fn for_external(use_external_temp: bool) -> Self {
        if use_external_temp {
            Sensor::External
        } else {
            Sensor::Internal
        }
    }

    pub fn raw(&self) -> u8 {
        match self {
            Sensor::Internal => protocol::SENSOR_INTERNAL,
            Sensor::External => protocol::SENSOR_EXTERNAL,
            Sensor::Both => protocol::SENSOR_BOTH,
        }
    }
}

/// Which weekdays share a schedule program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum LoopMode {
    /// Mon-Fri plus Sat-Sun ("12345,67").
    #[default]
    WeekdaysWeekend,
    /// Mon-Sat plus Sun ("123456,7").
    SixPlusOne,
    /// Every day follows one program ("1234567").
    AllWeek,
}

impl LoopMode {
    pub fn from_raw(code: u8) -> Option<Self> {
        match code {
            0 => Some(LoopMode::WeekdaysWeekend),
            1 => Some(LoopMode::SixPlusOne),
            2 => Some(LoopMode::AllWeek),
            _ => None,
        }
    }

    pub fn raw(&self) -> u8 {
        match self {
            LoopMode::WeekdaysWeekend => 0,
            LoopMode::SixPlusOne => 1,
            LoopMode::AllWeek => 2,
        }
    }
}

impl TryFrom<u8> for LoopMode {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        LoopMode::from_raw(code)
            .ok_or_else(|| Error::Config(format!("schedule must be 0..=2, got {code}")))
    }
}

impl From<LoopMode> for u8 {
    fn from(mode: LoopMode) -> Self {
        mode.raw()
    }
}

/// Full status snapshot as returned by the device. Always replaced wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawStatus", into = "RawStatus")]
pub struct DeviceStatus {
    pub room_temp: f64,
    pub external_temp: f64,
    pub thermostat_temp: f64,
    pub svl: i32,
    pub svh: i32,
    pub dif: i32,
    pub power: Power,
    pub active: Activity,
    pub auto_mode: ControlMode,
    pub temp_manual: ControlMode,
}

impl DeviceStatus {
    /// Decode the key/value record handed back by the link library.
    pub fn from_value(value: serde_json::Value) -> crate::Result<Self> {
        serde_json::from_value(value).map_err(|e| Error::Protocol(format!("malformed status: {e}")))
    }

    /// Temperature the entity reports, picked by sensor preference.
    pub fn current_temp(&self, use_external_temp: bool) -> f64 {
        if use_external_temp {
            self.external_temp
        } else {
            self.room_temp
        }
    }
}

impl TryFrom<RawStatus> for DeviceStatus {
    type Error = Error;

    fn try_from(raw: RawStatus) -> Result<Self, Self::Error> {
        let bad = |field: &str, code: u8| Error::Protocol(format!("unknown {field} code: {code}"));
        Ok(Self {
            room_temp: raw.room_temp,
            external_temp: raw.external_temp,
            thermostat_temp: raw.thermostat_temp,
            svl: raw.svl,
            svh: raw.svh,
            dif: raw.dif,
            power: Power::from_raw(raw.power).ok_or_else(|| bad("power", raw.power))?,
            active: Activity::from_raw(raw.active).ok_or_else(|| bad("active", raw.active))?,
            auto_mode: ControlMode::from_mode_raw(raw.auto_mode)
                .ok_or_else(|| bad("auto_mode", raw.auto_mode))?,
            temp_manual: ControlMode::from_temp_raw(raw.temp_manual)
                .ok_or_else(|| bad("temp_manual", raw.temp_manual))?,
        })
    }
}

impl From<DeviceStatus> for RawStatus {
    fn from(status: DeviceStatus) -> Self {
        Self {
            room_temp: status.room_temp,
            external_temp: status.external_temp,
            thermostat_temp: status.thermostat_temp,
            svl: status.svl,
            svh: status.svh,
            dif: status.dif,
            power: status.power.raw(),
            active: status.active.raw(),
            auto_mode: status.auto_mode.mode_raw(),
            temp_manual: status.temp_manual.temp_raw(),
        }
    }
}

/// Wall-clock time as the device wants it: ISO weekday, 1 = Monday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub weekday: u8,
}

impl DeviceTime {
    pub fn from_datetime<T: chrono::Timelike + chrono::Datelike>(t: &T) -> Self {
        Self {
            hour: t.hour() as u8,
            minute: t.minute() as u8,
            second: t.second() as u8,
            weekday: t.weekday().number_from_monday() as u8,
        }
    }

    pub fn now() -> Self {
        Self::from_datetime(&chrono::Local::now())
    }
}

impl fmt::Display for DeviceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02} (day {})",
            self.hour, self.minute, self.second, self.weekday
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HvacMode {
    Off,
    Heat,
    HeatCool,
    Auto,
}

impl HvacMode {
    pub fn as_hass_str(&self) -> &'static str {
        match self {
            HvacMode::Off => "off",
            HvacMode::Heat => "heat",
            HvacMode::HeatCool => "heat_cool",
            HvacMode::Auto => "auto",
        }
    }

    pub fn from_hass_str(s: &str) -> Option<Self> {
        match s {
            "off" => Some(HvacMode::Off),
            "heat" => Some(HvacMode::Heat),
            "heat_cool" => Some(HvacMode::HeatCool),
            "auto" => Some(HvacMode::Auto),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HvacAction {
    Off,
    Idle,
    Heating,
    Cooling,
}

impl HvacAction {
    pub fn as_hass_str(&self) -> &'static str {
        match self {
            HvacAction::Off => "off",
            HvacAction::Idle => "idle",
            HvacAction::Heating => "heating",
            HvacAction::Cooling => "cooling",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    #[default]
    None,
    Away,
}

impl Preset {
    pub fn as_hass_str(&self) -> &'static str {
        match self {
            Preset::None => "none",
            Preset::Away => "away",
        }
    }

    pub fn from_hass_str(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Preset::None),
            "away" => Some(Preset::Away),
            _ => None,
        }
    }
}

/// Climate state derived from one status snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityState {
    pub current_temperature: f64,
    pub target_temperature: f64,
    pub min_temp: f64,
    pub max_temp: f64,
    pub hvac_mode: HvacMode,
    pub hvac_action: HvacAction,
    pub preset_mode: Preset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwitchState {
    On,
    Off,
    #[default]
    Unavailable,
}

impl SwitchState {
    pub fn as_hass_str(&self) -> &'static str {
        match self {
            SwitchState::On => "on",
            SwitchState::Off => "off",
            SwitchState::Unavailable => "unavailable",
        }
    }
}

/// Events emitted when the derived climate state changes between updates.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    CurrentTemperatureChanged { temp: f64 },
    TargetTemperatureChanged { temp: f64 },
    RangeChanged { min: f64, max: f64 },
    ModeChanged { mode: HvacMode },
    ActionChanged { action: HvacAction },
    PresetChanged { preset: Preset },
    AvailabilityChanged { available: bool },
}
