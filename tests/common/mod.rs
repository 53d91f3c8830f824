#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use floureon::{
    Activity, ControlMode, DeviceHandle, DeviceStatus, DeviceTime, Discover, Error, LoopMode, Power,
    Result, RetryPolicy, Sensor, ThermostatClient,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Power(Power),
    Mode(ControlMode, LoopMode, Sensor),
    Temperature(f64),
    Time(DeviceTime),
}

#[derive(Debug)]
pub struct DeviceState {
    /// Discovery attempts that time out before the device answers.
    pub discover_failures: u32,
    pub discover_calls: u32,
    pub auth_ok: bool,
    pub auth_calls: u32,
    pub status: Option<DeviceStatus>,
    pub fail_commands: bool,
    pub commands: Vec<Command>,
}

/// In-memory thermostat that records every command it receives.
#[derive(Clone)]
pub struct MockDevice {
    inner: Arc<Mutex<DeviceState>>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(DeviceState {
                discover_failures: 0,
                discover_calls: 0,
                auth_ok: true,
                auth_calls: 0,
                status: Some(heating_status()),
                fail_commands: false,
                commands: Vec::new(),
            })),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, DeviceState> {
        self.inner.lock().unwrap()
    }

    pub fn commands(&self) -> Vec<Command> {
        self.state().commands.clone()
    }

    pub fn clear_commands(&self) {
        self.state().commands.clear();
    }

    pub fn client(&self) -> ThermostatClient {
        init_tracing();
        ThermostatClient::builder("192.168.1.50", self.clone())
            .retry(RetryPolicy::default().pause(Duration::ZERO))
            .build()
            .unwrap()
    }
}

impl Discover for MockDevice {
    fn discover(&self, _host: &str, _timeout: Duration) -> Result<Box<dyn DeviceHandle>> {
        let mut state = self.state();
        state.discover_calls += 1;
        if state.discover_failures > 0 {
            state.discover_failures -= 1;
            return Err(Error::Timeout);
        }
        Ok(Box::new(MockHandle {
            inner: self.inner.clone(),
        }))
    }
}

struct MockHandle {
    inner: Arc<Mutex<DeviceState>>,
}

impl MockHandle {
    fn record(&mut self, command: Command) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        if state.fail_commands {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "socket closed",
            )));
        }
        state.commands.push(command);
        Ok(())
    }
}

impl DeviceHandle for MockHandle {
    fn authenticate(&mut self) -> Result<bool> {
        let mut state = self.inner.lock().unwrap();
        state.auth_calls += 1;
        Ok(state.auth_ok)
    }

    fn full_status(&mut self) -> Result<DeviceStatus> {
        self.inner.lock().unwrap().status.clone().ok_or(Error::Timeout)
    }

    fn set_power(&mut self, power: Power) -> Result<()> {
        self.record(Command::Power(power))
    }

    fn set_mode(&mut self, mode: ControlMode, loop_mode: LoopMode, sensor: Sensor) -> Result<()> {
        self.record(Command::Mode(mode, loop_mode, sensor))
    }

    fn set_temperature(&mut self, celsius: f64) -> Result<()> {
        self.record(Command::Temperature(celsius))
    }

    fn set_time(&mut self, time: DeviceTime) -> Result<()> {
        self.record(Command::Time(time))
    }
}

/// Powered, manual, element energized, room at 20 with target 22.
pub fn heating_status() -> DeviceStatus {
    DeviceStatus {
        room_temp: 20.0,
        external_temp: 18.0,
        thermostat_temp: 22.0,
        svl: 5,
        svh: 35,
        dif: 1,
        power: Power::On,
        active: Activity::Active,
        auto_mode: ControlMode::Manual,
        temp_manual: ControlMode::Auto,
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
