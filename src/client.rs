use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, error, trace, warn};

use crate::logger::{MessageLogMode, MessageLogger};
use crate::protocol::{DeviceHandle, Discover};
use crate::types::*;
use crate::{Error, Result};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_RETRY_PAUSE: Duration = Duration::from_millis(100);

/// Bounds on device discovery. Worst case latency of a call is roughly
/// `max_attempts * (attempt_timeout + pause)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub attempt_timeout: Duration,
    pub pause: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            pause: DEFAULT_RETRY_PAUSE,
        }
    }
}

impl RetryPolicy {
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }
}

#[derive(Clone, Copy)]
enum Severity {
    Warn,
    Error,
}

pub struct ThermostatClientBuilder {
    host: String,
    link: Arc<dyn Discover>,
    retry: RetryPolicy,
    log_mode: Option<MessageLogMode>,
    log_path: Option<String>,
}

impl ThermostatClientBuilder {
    pub fn new(host: impl Into<String>, link: impl Discover + 'static) -> Self {
        Self {
            host: host.into(),
            link: Arc::new(link),
            retry: RetryPolicy::default(),
            log_mode: None,
            log_path: None,
        }
    }

    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn message_log(mut self, mode: MessageLogMode, path: impl Into<String>) -> Self {
        self.log_mode = Some(mode);
        self.log_path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<ThermostatClient> {
        let logger = match (self.log_mode, self.log_path) {
            (Some(mode), Some(path)) => Some(Arc::new(Mutex::new(MessageLogger::new(mode, &path)?))),
            _ => None,
        };

        Ok(ThermostatClient {
            host: self.host,
            link: self.link,
            retry: self.retry,
            logger,
        })
    }
}

/// Session adapter for one thermostat.
///
/// Holds no connection: every operation resolves the device, authenticates,
/// runs and drops the handle. All methods block and are meant to run on a
/// worker thread, see [`ThermostatClient::dispatch`].
#[derive(Clone)]
pub struct ThermostatClient {
    host: String,
    link: Arc<dyn Discover>,
    retry: RetryPolicy,
    logger: Option<Arc<Mutex<MessageLogger>>>,
}

impl ThermostatClient {
    pub fn builder(host: impl Into<String>, link: impl Discover + 'static) -> ThermostatClientBuilder {
        ThermostatClientBuilder::new(host, link)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Resolve the device handle, retrying discovery up to the policy bound.
    pub fn connect(&self) -> Result<Session<'_>> {
        let attempts = self.retry.max_attempts.max(1);
        let mut timed_out = true;
        for attempt in 1..=attempts {
            match self.link.discover(&self.host, self.retry.attempt_timeout) {
                Ok(handle) => {
                    trace!(host = %self.host, attempt, "thermostat resolved");
                    return Ok(Session {
                        client: self,
                        handle,
                    });
                }
                Err(e) if e.is_timeout() => {
                    debug!(host = %self.host, attempt, "discovery timed out");
                }
                Err(e) => {
                    debug!(host = %self.host, attempt, error = %e, "discovery failed");
                    timed_out = false;
                }
            }
            if attempt < attempts {
                thread::sleep(self.retry.pause);
            }
        }
        Err(Error::Unreachable {
            host: self.host.clone(),
            attempts,
            timed_out,
        })
    }

    /// Resolve and authenticate a fresh session.
    pub fn open(&self) -> Result<Session<'_>> {
        let mut session = self.connect()?;
        if !session.handle.authenticate()? {
            return Err(Error::AuthenticationFailed);
        }
        Ok(session)
    }

    /// Open a session, run `f` on it, then drop it. Failures are logged here
    /// and handed back for the caller to degrade on.
    pub fn session<T>(&self, action: &str, f: impl FnOnce(&mut Session<'_>) -> Result<T>) -> Result<T> {
        self.run(action, Severity::Error, f)
    }

    pub fn read_status(&self) -> Result<DeviceStatus> {
        self.run("read_status", Severity::Warn, |s| s.full_status())
    }

    pub fn set_time(&self, time: DeviceTime) -> Result<()> {
        self.session("set_time", |s| s.set_time(time))
    }

    /// Push the host's local wall-clock time to the device.
    pub fn sync_time(&self) -> Result<()> {
        self.set_time(DeviceTime::now())
    }

    pub fn set_power(&self, power: Power) -> Result<()> {
        self.session("set_power", |s| s.set_power(power))
    }

    pub fn set_mode(&self, mode: ControlMode, loop_mode: LoopMode, sensor: Sensor) -> Result<()> {
        self.session("set_mode", |s| s.set_mode(mode, loop_mode, sensor))
    }

    pub fn set_temperature(&self, celsius: f64) -> Result<()> {
        self.session("set_temperature", |s| s.set_temperature(celsius))
    }

    /// Run a blocking client call on the tokio blocking pool and await it.
    pub async fn dispatch<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&ThermostatClient) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let client = self.clone();
        tokio::task::spawn_blocking(move || f(&client))
            .await
            .map_err(|e| Error::Worker(e.to_string()))?
    }

    /// Fire-and-forget clock sync on the blocking pool. Needs a tokio runtime;
    /// without one the sync is skipped.
    pub fn spawn_time_sync(&self) {
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let client = self.clone();
                // errors are already logged by the client
                runtime.spawn_blocking(move || client.sync_time().ok());
            }
            Err(_) => warn!(host = %self.host, "no async runtime, skipping time sync"),
        }
    }

    fn run<T>(
        &self,
        action: &str,
        severity: Severity,
        f: impl FnOnce(&mut Session<'_>) -> Result<T>,
    ) -> Result<T> {
        let result = self.open().and_then(|mut session| f(&mut session));
        if let Err(ref e) = result {
            self.report(action, severity, e);
        }
        result
    }

    fn report(&self, action: &str, severity: Severity, err: &Error) {
        if err.is_timeout() {
            debug!(host = %self.host, action, "thermostat timed out");
        } else {
            match severity {
                Severity::Warn => warn!(host = %self.host, action, error = %err, "thermostat operation failed"),
                Severity::Error => error!(host = %self.host, action, error = %err, "thermostat operation failed"),
            }
        }
        self.journal(|log| log.log_failure(&self.host, action, &err.to_string()));
    }

    fn journal(&self, f: impl FnOnce(&mut MessageLogger)) {
        if let Some(ref logger) = self.logger
            && let Ok(mut logger) = logger.lock()
        {
            f(&mut logger);
        }
    }
}

/// A resolved device handle. Commands go through here so they are journaled.
pub struct Session<'a> {
    client: &'a ThermostatClient,
    handle: Box<dyn DeviceHandle>,
}

impl Session<'_> {
    pub fn authenticate(&mut self) -> Result<bool> {
        self.handle.authenticate()
    }

    pub fn full_status(&mut self) -> Result<DeviceStatus> {
        let status = self.handle.full_status()?;
        if let Ok(body) = serde_json::to_value(&status) {
            self.client
                .journal(|log| log.log_status(&self.client.host, &body));
        }
        Ok(status)
    }

    pub fn set_power(&mut self, power: Power) -> Result<()> {
        self.log("set_power", json!({ "power": power.raw() }));
        self.handle.set_power(power)
    }

    pub fn set_mode(&mut self, mode: ControlMode, loop_mode: LoopMode, sensor: Sensor) -> Result<()> {
        self.log(
            "set_mode",
            json!({
                "auto_mode": mode.mode_raw(),
                "loop_mode": loop_mode.raw(),
                "sensor": sensor.raw(),
            }),
        );
        self.handle.set_mode(mode, loop_mode, sensor)
    }

    pub fn set_temperature(&mut self, celsius: f64) -> Result<()> {
        self.log("set_temperature", json!({ "celsius": celsius }));
        self.handle.set_temperature(celsius)
    }

    pub fn set_time(&mut self, time: DeviceTime) -> Result<()> {
        self.log(
            "set_time",
            json!({
                "hour": time.hour,
                "minute": time.minute,
                "second": time.second,
                "weekday": time.weekday,
            }),
        );
        self.handle.set_time(time)
    }

    fn log(&self, action: &str, body: serde_json::Value) {
        debug!(host = %self.client.host, action, %body, "sending command");
        self.client
            .journal(|log| log.log_command(&self.client.host, action, &body));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_matches_device_behaviour() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.attempt_timeout, Duration::from_secs(3));
        assert_eq!(policy.pause, Duration::from_millis(100));
    }

    #[test]
    fn policy_never_drops_below_one_attempt() {
        let policy = RetryPolicy::default().max_attempts(0);
        assert_eq!(policy.max_attempts, 1);
    }

    #[test]
    fn closure_link_exhausts_attempts() {
        let link = |_: &str, _: Duration| -> Result<Box<dyn DeviceHandle>> { Err(Error::Timeout) };
        let client = ThermostatClient::builder("10.0.0.9", link)
            .retry(RetryPolicy::default().pause(Duration::ZERO))
            .build()
            .unwrap();
        let err = client.connect().err().unwrap();
        assert!(
            matches!(err, Error::Unreachable { ref host, attempts: 3, timed_out: true } if host == "10.0.0.9"),
            "got {err:?}"
        );
        assert!(err.is_timeout());
    }

    #[test]
    fn mixed_failures_are_not_a_timeout() {
        let link = |_: &str, _: Duration| -> Result<Box<dyn DeviceHandle>> {
            Err(Error::Protocol("bad reply".into()))
        };
        let client = ThermostatClient::builder("10.0.0.9", link)
            .retry(RetryPolicy::default().max_attempts(2).pause(Duration::ZERO))
            .build()
            .unwrap();
        let err = client.connect().err().unwrap();
        assert!(
            matches!(err, Error::Unreachable { attempts: 2, timed_out: false, .. }),
            "got {err:?}"
        );
        assert!(!err.is_timeout());
    }
}
