mod client;
mod climate;
mod config;
mod diff;
mod error;
mod interpret;
mod logger;
mod protocol;
mod switch;
mod types;

pub use client::{RetryPolicy, Session, ThermostatClient, ThermostatClientBuilder};
pub use climate::{ClimateAttributes, ClimateEntity, ClimateSnapshot, TEMPERATURE_UNIT};
pub use config::{ClimateConfig, SwitchConfig, TurnOffMode, TurnOnMode, DEFAULT_PRECISION};
pub use error::{Error, Result};
pub use interpret::{interpret, InterpretConfig};
pub use logger::MessageLogMode;
pub use protocol::{DeviceHandle, Discover, RawStatus};
pub use switch::SwitchEntity;
pub use types::*;
