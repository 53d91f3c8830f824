use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::client::ThermostatClient;
use crate::config::ClimateConfig;
use crate::diff::state_events;
use crate::interpret::{interpret, InterpretConfig};
use crate::types::*;
use crate::Result;

type EventCallback = Box<dyn Fn(&Event) + Send + Sync>;
type SnapshotCallback = Box<dyn Fn(&ClimateSnapshot) + Send + Sync>;

pub const TEMPERATURE_UNIT: &str = "°C";

/// Extra state exported to the host and handed back by it on restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateAttributes {
    pub away_setpoint: f64,
    pub manual_setpoint: f64,
    pub external_temp: Option<f64>,
    pub room_temp: Option<f64>,
    pub loop_mode: LoopMode,
}

/// Everything the host needs to write the entity's state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClimateSnapshot {
    pub available: bool,
    pub state: Option<EntityState>,
    pub attributes: ClimateAttributes,
}

/// Climate entity for one thermostat.
///
/// Plain state holder: the host calls [`added`](Self::added),
/// [`restore`](Self::restore), [`update`](Self::update) and the command
/// methods, and is told about changes through the registered callbacks.
/// Commands take `&mut self`, so one entity never runs two device operations
/// at once.
pub struct ClimateEntity {
    config: ClimateConfig,
    client: ThermostatClient,
    state: Option<EntityState>,
    available: bool,
    preset: Preset,
    away_setpoint: f64,
    manual_setpoint: f64,
    room_temp: Option<f64>,
    external_temp: Option<f64>,
    event_callbacks: Vec<EventCallback>,
    snapshot_callbacks: Vec<SnapshotCallback>,
}

impl ClimateEntity {
    pub fn new(config: ClimateConfig, client: ThermostatClient) -> Self {
        Self {
            config,
            client,
            state: None,
            available: false,
            preset: Preset::None,
            away_setpoint: DEFAULT_MIN_TEMP,
            manual_setpoint: DEFAULT_MIN_TEMP,
            room_temp: None,
            external_temp: None,
            event_callbacks: Vec::new(),
            snapshot_callbacks: Vec::new(),
        }
    }

    pub fn on_event(mut self, f: impl Fn(&Event) + Send + Sync + 'static) -> Self {
        self.event_callbacks.push(Box::new(f));
        self
    }

    pub fn on_snapshot(mut self, f: impl Fn(&ClimateSnapshot) + Send + Sync + 'static) -> Self {
        self.snapshot_callbacks.push(Box::new(f));
        self
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn unique_id(&self) -> Option<&str> {
        self.config.unique_id.as_deref()
    }

    pub fn precision(&self) -> f64 {
        self.config.precision
    }

    pub fn temperature_unit(&self) -> &'static str {
        TEMPERATURE_UNIT
    }

    pub fn hvac_modes(&self) -> Vec<HvacMode> {
        let manual = if self.config.use_cooling {
            HvacMode::HeatCool
        } else {
            HvacMode::Heat
        };
        vec![HvacMode::Auto, manual, HvacMode::Off]
    }

    pub fn preset_modes(&self) -> Vec<Preset> {
        vec![Preset::None, Preset::Away]
    }

    /// Last derived state; `None` until the first successful update.
    pub fn state(&self) -> Option<&EntityState> {
        self.state.as_ref()
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn preset_mode(&self) -> Preset {
        self.preset
    }

    pub fn away_setpoint(&self) -> f64 {
        self.away_setpoint
    }

    pub fn manual_setpoint(&self) -> f64 {
        self.manual_setpoint
    }

    pub fn min_temp(&self) -> f64 {
        self.state.as_ref().map_or(DEFAULT_MIN_TEMP, |s| s.min_temp)
    }

    pub fn max_temp(&self) -> f64 {
        self.state.as_ref().map_or(DEFAULT_MAX_TEMP, |s| s.max_temp)
    }

    pub fn attributes(&self) -> ClimateAttributes {
        ClimateAttributes {
            away_setpoint: self.away_setpoint,
            manual_setpoint: self.manual_setpoint,
            external_temp: self.external_temp,
            room_temp: self.room_temp,
            loop_mode: self.config.schedule,
        }
    }

    pub fn snapshot(&self) -> ClimateSnapshot {
        ClimateSnapshot {
            available: self.available,
            state: self.state.clone(),
            attributes: self.attributes(),
        }
    }

    /// Lifecycle hook: sync the device clock in the background, then restore
    /// setpoints from the host's last persisted attributes.
    pub fn added(&mut self, last_attributes: Option<&Value>) {
        self.client.spawn_time_sync();
        if let Some(attrs) = last_attributes {
            self.restore(attrs);
        }
    }

    /// Load the remembered away/manual setpoints. Missing keys keep the
    /// current values.
    pub fn restore(&mut self, attributes: &Value) {
        if let Some(t) = attributes.get("away_setpoint").and_then(|v| v.as_f64()) {
            self.away_setpoint = t;
        }
        if let Some(t) = attributes.get("manual_setpoint").and_then(|v| v.as_f64()) {
            self.manual_setpoint = t;
        }
        debug!(
            name = %self.config.name,
            away = self.away_setpoint,
            manual = self.manual_setpoint,
            "restored setpoints"
        );
    }

    /// Poll the device. Without data the previous state is kept and the
    /// entity is marked unavailable.
    pub async fn update(&mut self) {
        match self.client.dispatch(|c| c.read_status()).await {
            Ok(status) => self.apply_status(&status),
            Err(e) => {
                debug!(name = %self.config.name, error = %e, "no status this cycle");
                self.set_available(false);
                self.publish_snapshot();
            }
        }
    }

    /// Set a manual target. On success the value is remembered as the
    /// setpoint of the active preset.
    pub async fn set_temperature(&mut self, celsius: f64) -> Result<()> {
        let loop_mode = self.config.schedule;
        let sensor = self.sensor();
        let result = self
            .client
            .dispatch(move |c| {
                c.session("set_temperature", |s| {
                    s.set_mode(ControlMode::Manual, loop_mode, sensor)?;
                    s.set_temperature(celsius)
                })
            })
            .await;

        if result.is_ok() {
            match self.preset {
                Preset::Away => self.away_setpoint = celsius,
                Preset::None => self.manual_setpoint = celsius,
            }
        }
        self.publish_snapshot();
        result
    }

    pub async fn set_hvac_mode(&mut self, mode: HvacMode) -> Result<()> {
        let loop_mode = self.config.schedule;
        let sensor = self.sensor();
        let result = self
            .client
            .dispatch(move |c| {
                c.session("set_hvac_mode", |s| {
                    if mode == HvacMode::Off {
                        return s.set_power(Power::Off);
                    }
                    s.set_power(Power::On)?;
                    let control = if mode == HvacMode::Auto {
                        ControlMode::Auto
                    } else {
                        ControlMode::Manual
                    };
                    s.set_mode(control, loop_mode, sensor)
                })
            })
            .await;
        self.publish_snapshot();
        result
    }

    /// Switch preset and drive the device to that preset's remembered setpoint.
    /// The preset is taken even if the device can't be reached.
    pub async fn set_preset_mode(&mut self, preset: Preset) -> Result<()> {
        self.preset = preset;
        if let Some(ref mut state) = self.state
            && state.preset_mode != preset
        {
            state.preset_mode = preset;
            self.emit(&Event::PresetChanged { preset });
        }

        let setpoint = match preset {
            Preset::Away => self.away_setpoint,
            Preset::None => self.manual_setpoint,
        };
        let loop_mode = self.config.schedule;
        let sensor = self.sensor();
        let result = self
            .client
            .dispatch(move |c| {
                c.session("set_preset_mode", |s| {
                    s.set_power(Power::On)?;
                    s.set_mode(ControlMode::Manual, loop_mode, sensor)?;
                    s.set_temperature(setpoint)
                })
            })
            .await;
        self.publish_snapshot();
        result
    }

    pub async fn turn_on(&mut self) -> Result<()> {
        self.set_hvac_mode(HvacMode::Auto).await
    }

    pub async fn turn_off(&mut self) -> Result<()> {
        self.set_hvac_mode(HvacMode::Off).await
    }

    fn interpret_config(&self) -> InterpretConfig {
        InterpretConfig {
            use_external_temp: self.config.use_external_temp,
            use_cooling: self.config.use_cooling,
            current_preset: self.preset,
        }
    }

    fn sensor(&self) -> Sensor {
        Sensor::for_external(self.config.use_external_temp)
    }

    fn apply_status(&mut self, status: &DeviceStatus) {
        self.room_temp = Some(status.room_temp);
        self.external_temp = Some(status.external_temp);

        let next = interpret(status, &self.interpret_config());
        self.preset = next.preset_mode;

        let events = state_events(self.state.as_ref(), &next);
        self.set_available(true);
        self.state = Some(next);

        for event in &events {
            self.emit(event);
        }
        if !events.is_empty() {
            debug!(name = %self.config.name, count = events.len(), "state changed");
        }
        self.publish_snapshot();
    }

    fn set_available(&mut self, available: bool) {
        if self.available != available {
            self.available = available;
            self.emit(&Event::AvailabilityChanged { available });
        }
    }

    fn emit(&self, event: &Event) {
        for cb in &self.event_callbacks {
            cb(event);
        }
    }

    fn publish_snapshot(&self) {
        if self.snapshot_callbacks.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for cb in &self.snapshot_callbacks {
            cb(&snapshot);
        }
    }
}
