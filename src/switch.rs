use tracing::debug;

use crate::client::ThermostatClient;
use crate::config::{SwitchConfig, TurnOffMode, TurnOnMode};
use crate::types::*;
use crate::Result;

type StateCallback = Box<dyn Fn(SwitchState) + Send + Sync>;

/// On/off view of a thermostat, for setups that only ever want it heating or
/// not. The loop mode is always the default one.
pub struct SwitchEntity {
    config: SwitchConfig,
    client: ThermostatClient,
    state: SwitchState,
    min_temp: f64,
    max_temp: f64,
    current_temp: Option<f64>,
    state_callbacks: Vec<StateCallback>,
}

impl SwitchEntity {
    pub fn new(config: SwitchConfig, client: ThermostatClient) -> Self {
        Self {
            config,
            client,
            state: SwitchState::Unavailable,
            min_temp: DEFAULT_MIN_TEMP,
            max_temp: DEFAULT_MAX_TEMP,
            current_temp: None,
            state_callbacks: Vec::new(),
        }
    }

    pub fn on_state(mut self, f: impl Fn(SwitchState) + Send + Sync + 'static) -> Self {
        self.state_callbacks.push(Box::new(f));
        self
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn unique_id(&self) -> Option<&str> {
        self.config.unique_id.as_deref()
    }

    pub fn state(&self) -> SwitchState {
        self.state
    }

    pub fn is_on(&self) -> bool {
        self.state == SwitchState::On
    }

    pub fn min_temp(&self) -> f64 {
        self.min_temp
    }

    pub fn max_temp(&self) -> f64 {
        self.max_temp
    }

    pub fn current_temperature(&self) -> Option<f64> {
        self.current_temp
    }

    pub fn added(&self) {
        self.client.spawn_time_sync();
    }

    /// Power the thermostat on in manual mode and drive it to the configured
    /// "on" setpoint. The switch reports on regardless of the device outcome.
    pub async fn turn_on(&mut self) -> Result<()> {
        let target = match self.config.turn_on_mode {
            TurnOnMode::MaxTemp => self.max_temp,
            TurnOnMode::Temperature(t) => t,
        };
        let sensor = Sensor::for_external(self.config.use_external_temp);
        let result = self
            .client
            .dispatch(move |c| {
                c.session("turn_on", |s| {
                    s.set_power(Power::On)?;
                    s.set_mode(ControlMode::Manual, LoopMode::default(), sensor)?;
                    s.set_temperature(target)
                })
            })
            .await;
        self.set_state(SwitchState::On);
        result
    }

    pub async fn turn_off(&mut self) -> Result<()> {
        let mode = self.config.turn_off_mode;
        let min_temp = self.min_temp;
        let sensor = Sensor::for_external(self.config.use_external_temp);
        let result = self
            .client
            .dispatch(move |c| {
                c.session("turn_off", |s| match mode {
                    TurnOffMode::TurnOff => s.set_power(Power::Off),
                    TurnOffMode::MinTemp => {
                        s.set_mode(ControlMode::Manual, LoopMode::default(), sensor)?;
                        s.set_temperature(min_temp)
                    }
                })
            })
            .await;
        self.set_state(SwitchState::Off);
        result
    }

    /// The switch is on only while the thermostat is powered and its element
    /// is energized.
    pub async fn update(&mut self) {
        match self.client.dispatch(|c| c.read_status()).await {
            Ok(status) => {
                self.min_temp = f64::from(status.svl);
                self.max_temp = f64::from(status.svh);
                self.current_temp = Some(status.current_temp(self.config.use_external_temp));
                let next = if status.power == Power::On && status.active == Activity::Active {
                    SwitchState::On
                } else {
                    SwitchState::Off
                };
                self.set_state(next);
            }
            Err(e) => {
                debug!(name = %self.config.name, error = %e, "no status this cycle");
                self.set_state(SwitchState::Unavailable);
            }
        }
    }

    fn set_state(&mut self, state: SwitchState) {
        self.state = state;
        for cb in &self.state_callbacks {
            cb(state);
        }
    }
}
