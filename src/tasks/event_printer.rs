//! Event printer background task

use tokio::sync::broadcast::{error::RecvError, Receiver};
use tracing::{info, warn};

use crate::{
    state::{LapRecord, TimerEvent},
    utils::clock::format_hms,
};

/// Print every timer event to stdout until the controller goes away
pub async fn event_printer_task(mut events: Receiver<TimerEvent>, json: bool) {
    info!("Starting event printer task");

    loop {
        match events.recv().await {
            Ok(event) => println!("{}", render(&event, json)),
            Err(RecvError::Lagged(skipped)) => {
                warn!("Event printer fell behind, skipped {} events", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// One output line for an event
pub fn render(event: &TimerEvent, json: bool) -> String {
    if json {
        return match serde_json::to_string(event) {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to serialize {:?}: {}", event, e);
                format!("{:?}", event)
            }
        };
    }

    match event {
        TimerEvent::EnteredRunning => "running".to_string(),
        TimerEvent::EnteredStopped => "stopped".to_string(),
        TimerEvent::Expired => "time is up".to_string(),
        TimerEvent::Tick { remaining_seconds } => format_hms(*remaining_seconds),
        TimerEvent::TransparencyChanged { state } => format!("overlay {}", state),
        TimerEvent::LapRecorded { lap } => format!(
            "question {}: {} ({} left)",
            lap.number,
            format_hms(lap.duration_seconds),
            format_hms(lap.remaining_seconds)
        ),
        TimerEvent::LapsCleared => "laps cleared".to_string(),
        TimerEvent::LapsRestored { count } => format!("{} laps restored", count),
    }
}

/// Lap list as shown by the lap view, one line per question
pub fn lap_report(laps: &[LapRecord]) -> String {
    if laps.is_empty() {
        return "No question laps\n".to_string();
    }

    let mut report = String::from("Question laps:\n");
    for lap in laps {
        report.push_str(&format!(
            "  {:>3}  {}  {} left\n",
            lap.number,
            format_hms(lap.duration_seconds),
            format_hms(lap.remaining_seconds)
        ));
    }
    report
}
