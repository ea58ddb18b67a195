//! Notifications pushed to timer subscribers

use serde::{Deserialize, Serialize};

use super::{LapRecord, TransparencyState};

/// Event emitted by a countdown controller on every observable change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TimerEvent {
    EnteredRunning,
    /// User-initiated stop
    EnteredStopped,
    /// The countdown reached zero; the controller is now stopped
    Expired,
    Tick { remaining_seconds: u64 },
    TransparencyChanged { state: TransparencyState },
    LapRecorded { lap: LapRecord },
    LapsCleared,
    LapsRestored { count: usize },
}
