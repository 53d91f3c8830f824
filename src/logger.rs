use std::fs::{File, OpenOptions};
use std::io::Write;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::warn;

use crate::diff::status_changes;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLogMode {
    Full,
    Diffed,
}

/// Append-only NDJSON journal of device traffic.
pub(crate) struct MessageLogger {
    mode: MessageLogMode,
    file: File,
    previous_status: Option<Value>,
}

impl MessageLogger {
    pub fn new(mode: MessageLogMode, path: &str) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            mode,
            file,
            previous_status: None,
        })
    }

    pub fn log_command(&mut self, host: &str, action: &str, body: &Value) {
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "cmd",
            "host": host,
            "action": action,
            "body": body,
        });
        self.write_line(&entry);
    }

    pub fn log_failure(&mut self, host: &str, action: &str, error: &str) {
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "err",
            "host": host,
            "action": action,
            "error": error,
        });
        self.write_line(&entry);
    }

    pub fn log_status(&mut self, host: &str, body: &Value) {
        let ts = Utc::now().to_rfc3339();
        let entry = match (self.mode, self.previous_status.as_ref()) {
            (MessageLogMode::Full, _) => json!({
                "ts": ts,
                "dir": "status",
                "host": host,
                "body": body,
            }),
            (MessageLogMode::Diffed, None) => json!({
                "ts": ts,
                "dir": "status",
                "host": host,
                "full": true,
                "body": body,
            }),
            (MessageLogMode::Diffed, Some(prev)) => {
                json!({
                    "ts": ts,
                    "dir": "status",
                    "host": host,
                    "changes": status_changes(prev, body),
                })
            }
        };
        self.write_line(&entry);
        if self.mode == MessageLogMode::Diffed {
            self.previous_status = Some(body.clone());
        }
    }

    fn write_line(&mut self, entry: &Value) {
        if let Ok(line) = serde_json::to_string(entry)
            && let Err(e) = writeln!(self.file, "{line}")
        {
            warn!("failed to write journal entry: {e}");
        }
    }
}
