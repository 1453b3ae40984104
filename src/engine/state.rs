use chrono::{DateTime, Utc};

use crate::domain::Timeframe;
use crate::error::ScanError;

use super::messages::{FetchFailure, TimeframeReport};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ScanStatus {
    #[default]
    Idle,
    Running {
        started_at: DateTime<Utc>,
    },
}

/// Result of the most recent scan cycle.
///
/// Only the scanner produces new values, and only between cycles: `begin` resets it and
/// `finish` publishes the reports. Readers treat it as immutable in between.
#[derive(Debug, Clone, Default)]
pub struct ScanState {
    pub status: ScanStatus,
    pub last_scanned: Option<DateTime<Utc>>,
    pub reports: Vec<TimeframeReport>,
    pub cancelled: bool,
    pub cycles_completed: u64,
}

impl ScanState {
    pub fn is_running(&self) -> bool {
        matches!(self.status, ScanStatus::Running { .. })
    }

    pub fn ensure_idle(&self) -> Result<(), ScanError> {
        if self.is_running() {
            Err(ScanError::AlreadyRunning)
        } else {
            Ok(())
        }
    }

    /// Start a new cycle: previous results are dropped.
    pub fn begin(self, now: DateTime<Utc>) -> Self {
        Self {
            status: ScanStatus::Running { started_at: now },
            last_scanned: Some(now),
            reports: Vec::new(),
            cancelled: false,
            cycles_completed: self.cycles_completed,
        }
    }

    pub fn finish(self, reports: Vec<TimeframeReport>, cancelled: bool) -> Self {
        Self {
            status: ScanStatus::Idle,
            reports,
            cancelled,
            cycles_completed: self.cycles_completed + 1,
            ..self
        }
    }

    pub fn report_for(&self, timeframe: Timeframe) -> Option<&TimeframeReport> {
        self.reports.iter().find(|r| r.timeframe == timeframe)
    }

    pub fn total_signals(&self) -> usize {
        self.reports.iter().map(TimeframeReport::signal_count).sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &FetchFailure> {
        self.reports.iter().flat_map(|r| r.failures.iter())
    }
}
