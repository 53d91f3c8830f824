use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// Discovery gave up. `timed_out` is set when every attempt timed out.
    Unreachable {
        host: String,
        attempts: u32,
        timed_out: bool,
    },
    Timeout,
    AuthenticationFailed,
    Protocol(String),
    Config(String),
    Worker(String),
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl Error {
    /// Timeouts are routine on flaky Wi-Fi and only worth a debug line.
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Timeout => true,
            Error::Unreachable { timed_out, .. } => *timed_out,
            Error::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            ),
            _ => false,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Unreachable { host, attempts, .. } => {
                write!(f, "thermostat {host} unreachable after {attempts} attempts")
            }
            Error::Timeout => write!(f, "device timeout"),
            Error::AuthenticationFailed => write!(f, "authentication failed"),
            Error::Protocol(msg) => write!(f, "protocol error: {msg}"),
            Error::Config(msg) => write!(f, "invalid config: {msg}"),
            Error::Worker(msg) => write!(f, "worker error: {msg}"),
            Error::Io(e) => write!(f, "IO error: {e}"),
            Error::Json(e) => write!(f, "JSON error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
