use std::time::Duration;

use serde::Serialize;

use crate::domain::{Direction, SetupSignal, Timeframe};

/// A (symbol, timeframe) unit that could not be scanned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchFailure {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanProgress {
    pub timeframe: Timeframe,
    pub completed: usize,
    pub total: usize,
    pub elapsed: Duration,
    pub eta: Option<Duration>,
}

/// Everything one timeframe pass produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeframeReport {
    pub timeframe: Timeframe,
    /// Setups completed on the newest candle. Bullish first.
    pub current: Vec<SetupSignal>,
    /// Setups completed on the candle before it. Bullish first.
    pub second_last: Vec<SetupSignal>,
    pub scanned: usize,
    pub skipped_insufficient: usize,
    pub failures: Vec<FetchFailure>,
    pub elapsed: Duration,
    pub cancelled: bool,
}

impl TimeframeReport {
    pub fn signal_count(&self) -> usize {
        self.current.len() + self.second_last.len()
    }

    pub fn count(&self, direction: Direction) -> usize {
        self.current
            .iter()
            .chain(&self.second_last)
            .filter(|s| s.direction == direction)
            .count()
    }
}

/// Progress feed for whoever is watching a scan.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    Started {
        timeframes: Vec<Timeframe>,
        symbols: usize,
    },
    Progress(ScanProgress),
    FetchFailed(FetchFailure),
    TimeframeCompleted(TimeframeReport),
    Finished {
        signals: usize,
        cancelled: bool,
        elapsed: Duration,
    },
}

/// `(elapsed / completed) * remaining`, or `None` before anything has completed.
pub fn estimate_remaining(elapsed: Duration, completed: usize, total: usize) -> Option<Duration> {
    if completed == 0 {
        return None;
    }
    let remaining = total.saturating_sub(completed) as u32;
    Some((elapsed / completed as u32) * remaining)
}
