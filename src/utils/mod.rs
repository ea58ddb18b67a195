//! Utility functions module
//!
//! This module contains utility functions used throughout the application.

pub mod clock;
pub mod signals;

// Re-export main functions
pub use clock::{format_hms, parse_seconds};
pub use signals::shutdown_signal;
