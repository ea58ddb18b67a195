//! Conversions between clock values and countdown seconds

use chrono::{NaiveTime, Timelike};

use crate::error::InvalidClock;

/// Parse `HH:MM:SS`, `MM:SS` or a plain second count below one day
pub fn parse_clock(input: &str) -> Result<NaiveTime, InvalidClock> {
    let input = input.trim();
    let invalid = || InvalidClock(input.to_string());

    match input.matches(':').count() {
        0 => {
            let seconds: u32 = input.parse().map_err(|_| invalid())?;
            NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0).ok_or_else(invalid)
        }
        1 => NaiveTime::parse_from_str(&format!("00:{}", input), "%H:%M:%S").map_err(|_| invalid()),
        2 => NaiveTime::parse_from_str(input, "%H:%M:%S").map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

/// Whole seconds represented by a time of day
pub fn seconds_from_time(time: NaiveTime) -> i64 {
    i64::from(time.hour()) * 3600 + i64::from(time.minute()) * 60 + i64::from(time.second())
}

/// Parse clock text straight into countdown seconds
pub fn parse_seconds(input: &str) -> Result<i64, InvalidClock> {
    parse_clock(input).map(seconds_from_time)
}

/// Format seconds as "HH:MM:SS"
pub fn format_hms(seconds: u64) -> String {
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;
    format!("{:02}:{:02}:{:02}", h, m, s)
}
