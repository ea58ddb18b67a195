//! Question lap records

use serde::{Deserialize, Serialize};

/// One recorded lap. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LapRecord {
    /// 1-based position in the sequence
    pub number: u32,
    /// Seconds elapsed since the previous lap, or since the start
    pub duration_seconds: u64,
    /// Remaining countdown seconds when the lap was taken
    pub remaining_seconds: u64,
}

/// Ordered lap sequence owned by a controller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LapLog {
    records: Vec<LapRecord>,
}

impl LapLog {
    pub fn new() -> Self {
        Self { records: Vec::new() }
    }

    /// Append a lap taken at `remaining_seconds`.
    ///
    /// `baseline_seconds` is used as the reference when no lap exists yet.
    pub fn record(&mut self, baseline_seconds: u64, remaining_seconds: u64) -> LapRecord {
        let previous = self
            .records
            .last()
            .map(|lap| lap.remaining_seconds)
            .unwrap_or(baseline_seconds);

        let record = LapRecord {
            number: self.records.len() as u32 + 1,
            duration_seconds: previous.saturating_sub(remaining_seconds),
            remaining_seconds,
        };
        self.records.push(record);
        record
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Hand the whole sequence off, leaving this log empty
    pub fn take(&mut self) -> Vec<LapRecord> {
        std::mem::take(&mut self.records)
    }

    /// Replace the sequence with one handed back by a companion view
    pub fn restore(&mut self, records: Vec<LapRecord>) {
        self.records = records;
    }

    pub fn records(&self) -> &[LapRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
