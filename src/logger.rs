use std::fs::{File, OpenOptions};
use std::io::Write;

use chrono::Utc;
use serde_json::{Value, json};
use tracing::warn;

use crate::types::{ControlRequest, DeviceSnapshot};

pub enum MessageLogMode {
    /// Log every state poll in full.
    Full,
    /// Log the first poll in full, then only the fields that changed.
    Changes,
}

pub(crate) struct MessageLogger {
    mode: MessageLogMode,
    file: File,
    previous: Option<DeviceSnapshot>,
}

impl MessageLogger {
    pub fn new(mode: MessageLogMode, path: &str) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            mode,
            file,
            previous: None,
        })
    }

    pub fn log_control(&mut self, request: &ControlRequest) {
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "cmd",
            "body": serde_json::to_value(request).unwrap_or(Value::Null),
        });
        self.write_line(&entry);
    }

    pub fn log_state_poll(&mut self, snapshot: &DeviceSnapshot) {
        match self.mode {
            MessageLogMode::Full => {
                let entry = json!({
                    "ts": Utc::now().to_rfc3339(),
                    "dir": "poll",
                    "body": serde_json::to_value(snapshot).unwrap_or(Value::Null),
                });
                self.write_line(&entry);
            }
            MessageLogMode::Changes => {
                match self.previous {
                    None => {
                        let entry = json!({
                            "ts": Utc::now().to_rfc3339(),
                            "dir": "poll",
                            "full": true,
                            "body": serde_json::to_value(snapshot).unwrap_or(Value::Null),
                        });
                        self.write_line(&entry);
                    }
                    Some(ref previous) => {
                        let changes = snapshot_changes(previous, snapshot);
                        let entry = json!({
                            "ts": Utc::now().to_rfc3339(),
                            "dir": "poll",
                            "changes": changes,
                        });
                        self.write_line(&entry);
                    }
                }
                self.previous = Some(snapshot.clone());
            }
        }
    }

    fn write_line(&mut self, entry: &Value) {
        if let Ok(line) = serde_json::to_string(entry)
            && let Err(e) = writeln!(self.file, "{line}")
        {
            warn!("failed to write log entry: {e}");
        }
    }
}

fn snapshot_changes(previous: &DeviceSnapshot, current: &DeviceSnapshot) -> Vec<Value> {
    let prev = serde_json::to_value(previous).unwrap_or(Value::Null);
    let curr = serde_json::to_value(current).unwrap_or(Value::Null);
    let (Value::Object(prev), Value::Object(curr)) = (prev, curr) else {
        return Vec::new();
    };

    curr.iter()
        .filter(|(field, value)| prev.get(*field) != Some(value))
        .map(|(field, value)| {
            json!({
                "path": field,
                "old": prev.get(field).cloned().unwrap_or(Value::Null),
                "new": value,
            })
        })
        .collect()
}
