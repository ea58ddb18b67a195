//! State management module
//!
//! This module contains the countdown state machine and the values it
//! publishes to subscribers.

pub mod countdown;
pub mod events;
pub mod lap;
pub mod timer_state;

// Re-export main types
pub use countdown::CountdownController;
pub use events::TimerEvent;
pub use lap::{LapLog, LapRecord};
pub use timer_state::{CountdownSnapshot, TimerState, TransparencyState};
