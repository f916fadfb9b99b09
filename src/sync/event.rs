//! Change events and the sinks that receive them.

use chrono::{DateTime, Utc};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::fs::EntryKind;
use crate::sync::action::ActionKind;

/// Record of one completed mutation of the replica.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Replica-side path of the top-level entry acted on.
    pub path: PathBuf,
    pub kind: EntryKind,
    pub action: ActionKind,
    pub timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn new(path: impl Into<PathBuf>, kind: EntryKind, action: ActionKind) -> Self {
        Self {
            path: path.into(),
            kind,
            action,
            timestamp: Utc::now(),
        }
    }

    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    pub fn parent(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new(""))
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} was successfully {} (target path: {}).",
            self.kind.label(),
            self.name(),
            self.action.verb(),
            self.parent().display()
        )
    }
}

/// Receiver of change events, injected into the applier.
pub trait ChangeSink: Send + Sync {
    fn record(&self, event: &ChangeEvent);
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ChangeEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ChangeEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Remove and return everything recorded so far.
    pub fn take(&self) -> Vec<ChangeEvent> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }
}

impl ChangeSink for RecordingSink {
    fn record(&self, event: &ChangeEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
