use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::*;
use crate::Result;

pub const POWER_ON: u8 = 1;
pub const POWER_OFF: u8 = 0;
pub const ACTIVE: u8 = 1;
pub const IDLE: u8 = 0;
pub const MODE_AUTO: u8 = 1;
pub const MODE_MANUAL: u8 = 0;
pub const SENSOR_INTERNAL: u8 = 0;
pub const SENSOR_EXTERNAL: u8 = 1;
pub const SENSOR_BOTH: u8 = 2;
pub const TEMP_AUTO: u8 = 0;
pub const TEMP_MANUAL: u8 = 1;

/// Status record with raw integer codes, in the shape the link library
/// reports it. Extra keys (schedules, lock flags, ...) are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawStatus {
    pub room_temp: f64,
    pub external_temp: f64,
    pub thermostat_temp: f64,
    pub svl: i32,
    pub svh: i32,
    pub dif: i32,
    pub power: u8,
    pub active: u8,
    pub auto_mode: u8,
    pub temp_manual: u8,
}

/// A resolved, not yet authenticated device.
///
/// Implemented on top of whatever library speaks the encrypted Broadlink
/// protocol. Calls block; the client runs them on a worker thread.
pub trait DeviceHandle: Send {
    /// Performs the key-exchange handshake. `Ok(false)` means the device
    /// answered but refused.
    fn authenticate(&mut self) -> Result<bool>;

    fn full_status(&mut self) -> Result<DeviceStatus>;

    fn set_power(&mut self, power: Power) -> Result<()>;

    fn set_mode(&mut self, mode: ControlMode, loop_mode: LoopMode, sensor: Sensor) -> Result<()>;

    fn set_temperature(&mut self, celsius: f64) -> Result<()>;

    fn set_time(&mut self, time: DeviceTime) -> Result<()>;
}

/// Resolves a hostname to a device handle.
pub trait Discover: Send + Sync {
    fn discover(&self, host: &str, timeout: Duration) -> Result<Box<dyn DeviceHandle>>;
}

impl<F> Discover for F
where
    F: Fn(&str, Duration) -> Result<Box<dyn DeviceHandle>> + Send + Sync,
{
    fn discover(&self, host: &str, timeout: Duration) -> Result<Box<dyn DeviceHandle>> {
        self(host, timeout)
    }
}
