//! Auto-run trigger: fire once, shortly after a candle closes, for whichever selected
//! timeframe closed. Pure decision logic, the caller supplies the clock.

use std::collections::HashMap;

use crate::config::{DF, SCAN};
use crate::domain::Timeframe;

pub const TRIGGER_WINDOW_SECS: i64 = SCAN.trigger_window_secs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickDecision {
    Trigger(Timeframe),
    Idle,
}

/// True when `now` sits inside the window just after a `duration` boundary and nothing fired
/// during that same window.
pub fn should_trigger(now_secs: i64, last_trigger_secs: i64, duration_secs: i64) -> bool {
    if duration_secs <= 0 {
        return false;
    }
    let remainder = now_secs.rem_euclid(duration_secs);
    remainder < TRIGGER_WINDOW_SECS && now_secs - last_trigger_secs > duration_secs - TRIGGER_WINDOW_SECS
}

/// Remembers the last trigger per distinct timeframe selection. A selection never seen before
/// counts as never triggered (timestamp 0).
#[derive(Debug, Clone, Default)]
pub struct AutoRunScheduler {
    last_trigger: HashMap<Vec<Timeframe>, i64>,
}

impl AutoRunScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(selected: &[Timeframe]) -> Vec<Timeframe> {
        let mut key = selected.to_vec();
        key.sort();
        key.dedup();
        key
    }

    pub fn last_trigger_secs(&self, selected: &[Timeframe]) -> i64 {
        self.last_trigger
            .get(&Self::key(selected))
            .copied()
            .unwrap_or(0)
    }

    pub fn set_last_trigger(&mut self, selected: &[Timeframe], secs: i64) {
        self.last_trigger.insert(Self::key(selected), secs);
    }

    /// Evaluate one poll. Short-circuits on the first qualifying timeframe, in selection
    /// order; month timeframes are skipped.
    pub fn tick(&mut self, now_secs: i64, selected: &[Timeframe]) -> TickDecision {
        let last = self.last_trigger_secs(selected);
        let hit = selected.iter().copied().find(|tf| {
            tf.duration_secs()
                .is_some_and(|d| should_trigger(now_secs, last, d))
        });

        match hit {
            Some(tf) => {
                self.set_last_trigger(selected, now_secs);
                log::info!("⏰ {} candle closed, triggering scan", tf);
                TickDecision::Trigger(tf)
            }
            None => {
                if DF.log_scheduler_ticks {
                    log::info!("Scheduler tick at {}: nothing due", now_secs);
                }
                TickDecision::Idle
            }
        }
    }
}
