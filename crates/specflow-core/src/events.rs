//! Best-effort transition notifications.
//!
//! Every phase and task-status transition produces one [`TransitionEvent`].
//! Sinks are attempted once per event; a failing sink is logged and never
//! affects the operation that produced the event.

use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use jiff::Timestamp;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{IoResultExt, OrchestratorError, Result};

/// A structured notification of one state transition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransitionEvent {
    pub spec_id: String,
    /// Set for task-status transitions, absent for phase transitions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    pub from: String,
    pub to: String,
    pub timestamp: Timestamp,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub forced: bool,
}

impl TransitionEvent {
    /// A phase transition of `spec_id`.
    pub fn phase(spec_id: &str, from: impl ToString, to: impl ToString, forced: bool) -> Self {
        Self {
            spec_id: spec_id.to_string(),
            task_id: None,
            from: from.to_string(),
            to: to.to_string(),
            timestamp: Timestamp::now(),
            forced,
        }
    }

    /// A status transition of one task.
    pub fn task(spec_id: &str, task_id: &str, from: impl ToString, to: impl ToString) -> Self {
        Self {
            task_id: Some(task_id.to_string()),
            ..Self::phase(spec_id, from, to, false)
        }
    }
}

/// Receiver of transition events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &TransitionEvent) -> Result<()>;
}

/// Delivers `event` once, logging instead of failing.
pub fn emit_best_effort(sink: &dyn EventSink, event: &TransitionEvent) {
    if let Err(e) = sink.emit(event) {
        warn!(
            "Dropped event for spec {} ({} -> {}): {e}",
            event.spec_id, event.from, event.to
        );
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn emit(&self, _event: &TransitionEvent) -> Result<()> {
        Ok(())
    }
}

/// Writes events to the `log` facade under the `specflow::events` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: &TransitionEvent) -> Result<()> {
        let json = serde_json::to_string(event)?;
        info!(target: "specflow::events", "{json}");
        Ok(())
    }
}

/// Appends one JSON object per line to a file.
#[derive(Debug)]
pub struct JsonlSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonlSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// `$XDG_STATE_HOME/specflow/events.jsonl`
    pub fn default_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("specflow")
            .place_state_file("events.jsonl")
            .map_err(|e| OrchestratorError::Configuration {
                message: format!("Cannot resolve XDG state directory: {e}"),
            })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventSink for JsonlSink {
    fn emit(&self, event: &TransitionEvent) -> Result<()> {
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');

        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).at_path(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .at_path(&self.path)?;
        file.write_all(&line).at_path(&self.path)
    }
}

/// Keeps events in memory for assertions.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct MemorySink {
    pub events: Mutex<Vec<TransitionEvent>>,
    pub fail: std::sync::atomic::AtomicBool,
}

#[cfg(test)]
impl EventSink for MemorySink {
    fn emit(&self, event: &TransitionEvent) -> Result<()> {
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(OrchestratorError::Configuration {
                message: "sink offline".to_string(),
            });
        }
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_jsonl_sink_appends_lines() {
        let dir = TempDir::new().unwrap();
        let sink = JsonlSink::new(dir.path().join("logs/events.jsonl"));

        sink.emit(&TransitionEvent::phase("0a1b2c3d", "new", "defined", false))
            .unwrap();
        sink.emit(&TransitionEvent::task("0a1b2c3d", "T1", "pending", "in_progress"))
            .unwrap();

        let content = std::fs::read_to_string(sink.path()).unwrap();
        let events: Vec<TransitionEvent> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].task_id, None);
        assert_eq!(events[1].task_id.as_deref(), Some("T1"));
        assert_eq!(events[1].to, "in_progress");
    }

    #[test]
    fn test_best_effort_swallows_failures() {
        let sink = MemorySink::default();
        sink.fail.store(true, std::sync::atomic::Ordering::SeqCst);
        emit_best_effort(&sink, &TransitionEvent::phase("x", "new", "defined", true));
        assert!(sink.events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_forced_flag_serialization() {
        let json = serde_json::to_string(&TransitionEvent::phase("x", "a", "b", false)).unwrap();
        assert!(!json.contains("forced"));
        let json = serde_json::to_string(&TransitionEvent::phase("x", "a", "b", true)).unwrap();
        assert!(json.contains("\"forced\":true"));
    }
}
