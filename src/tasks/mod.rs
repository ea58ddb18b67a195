//! Background tasks module
//!
//! This module contains the repeating timer task, the serial control loop
//! that feeds the countdown controller, the command reader thread and the
//! event printer.

pub mod control_loop;
pub mod event_printer;
pub mod repeating_timer;
pub mod stdin_reader;

// Re-export main types and functions
pub use control_loop::{run_control_loop, tick_forwarder, Command};
pub use event_printer::{event_printer_task, lap_report};
pub use repeating_timer::{RepeatingTimer, TickSource};
pub use stdin_reader::spawn_command_reader;
