//! Tiny Timer - a countdown timer core for translucent overlay timers
//!
//! This library provides a repeating timer that fires on a tokio runtime, a
//! countdown state machine with transparency and question-lap tracking, and
//! the serial control loop that connects the two.

pub mod config;
pub mod error;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::CountdownError;
pub use state::{CountdownController, TimerEvent, TimerState, TransparencyState};
pub use tasks::{run_control_loop, tick_forwarder, Command, RepeatingTimer, TickSource};
pub use utils::signals::shutdown_signal;
