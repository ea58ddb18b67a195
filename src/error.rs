//! Error types for the timer core

use std::time::Duration;
use thiserror::Error;

/// Rejection reasons for timer and controller operations.
///
/// None of these are fatal: the rejected operation leaves all state
/// untouched, and the caller decides how to reflect it (for example by
/// keeping a start control disabled).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CountdownError {
    #[error("timer interval must be positive, got {0:?}")]
    InvalidInterval(Duration),
    #[error("countdown target must be positive, got {0}s")]
    InvalidTarget(i64),
    #[error("cannot {action} while {state}")]
    InvalidStateTransition {
        action: &'static str,
        state: &'static str,
    },
}

impl CountdownError {
    pub(crate) fn transition(action: &'static str, state: &'static str) -> Self {
        Self::InvalidStateTransition { action, state }
    }
}

/// User-entered clock text that could not be read as a time of day
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid clock value {0:?}, expected HH:MM:SS, MM:SS or seconds")]
pub struct InvalidClock(pub String);

pub type Result<T> = std::result::Result<T, CountdownError>;
