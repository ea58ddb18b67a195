//! Timer and transparency state structures

use std::fmt;

use serde::{Deserialize, Serialize};

/// Countdown state. Stopped is initial and neither state is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerState {
    Stopped,
    Running,
}

impl TimerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerState::Stopped => "stopped",
            TimerState::Running => "running",
        }
    }

    pub fn is_running(&self) -> bool {
        *self == TimerState::Running
    }
}

impl Default for TimerState {
    fn default() -> Self {
        TimerState::Stopped
    }
}

impl fmt::Display for TimerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cosmetic overlay state, orthogonal to [`TimerState`] but driven by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransparencyState {
    Opaque,
    Transparent,
}

impl Default for TransparencyState {
    fn default() -> Self {
        TransparencyState::Opaque
    }
}

impl fmt::Display for TransparencyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransparencyState::Opaque => f.write_str("opaque"),
            TransparencyState::Transparent => f.write_str("transparent"),
        }
    }
}

/// Point-in-time view of a controller, published on its watch channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownSnapshot {
    pub state: TimerState,
    pub transparency: TransparencyState,
    pub target_seconds: Option<u64>,
    pub remaining_seconds: u64,
    pub lap_count: usize,
}

impl CountdownSnapshot {
    /// Snapshot of a freshly created controller
    pub fn new() -> Self {
        Self {
            state: TimerState::Stopped,
            transparency: TransparencyState::Opaque,
            target_seconds: None,
            remaining_seconds: 0,
            lap_count: 0,
        }
    }

    /// Whether a host should enable its start control
    pub fn can_start(&self) -> bool {
        self.state == TimerState::Stopped && self.target_seconds.is_some() && self.remaining_seconds > 0
    }
}

impl Default for CountdownSnapshot {
    fn default() -> Self {
        Self::new()
    }
}
