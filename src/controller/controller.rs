use chrono::{DateTime, Local};
use std::fmt;

/// Stable identifier of a physical controller for the lifetime of its connection
pub type ControllerId = usize;

// Raw control event with a chrono timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct ControlEvent {
    pub identifier: String,
    pub value: f32,
    pub timestamp: DateTime<Local>,
}

impl ControlEvent {
    pub fn new(identifier: impl Into<String>, value: f32) -> Self {
        Self {
            identifier: identifier.into(),
            value,
            timestamp: Local::now(),
        }
    }
}

impl fmt::Display for ControlEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={:.4} at {}",
            self.identifier,
            self.value,
            self.timestamp.format("%H:%M:%S.%3f")
        )
    }
}

/// A pollable input device
///
/// `poll` refreshes the device and fills its event queue. It returns `false`
/// once the device is gone; the poller then drops the controller for good.
pub trait Controller: Send {
    fn id(&self) -> ControllerId;

    fn name(&self) -> &str;

    fn poll(&mut self) -> bool;

    /// Takes every queued event, oldest first
    fn drain_events(&mut self) -> Vec<ControlEvent>;
}

// Controller errors
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("Initialization error: {0}")]
    InitializationError(String),

    #[error("Registry lock poisoned")]
    RegistryPoisoned,

    #[error("Poller task failed: {0}")]
    TaskError(String),
}

// Poller settings
#[derive(Clone, Debug)]
pub struct PollerSettings {
    pub poll_interval_ms: u64,
    pub stats_interval_secs: i64,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 10,
            stats_interval_secs: 30,
        }
    }
}
