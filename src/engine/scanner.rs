use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;

use crate::analysis::{CradleDetector, CradleIndicators, MIN_WINDOW};
use crate::config::{DF, DetectorConfig, ScanConfig};
use crate::data::MarketDataProvider;
use crate::domain::{
    DetectedOn, Direction, Instrument, Series, SetupSignal, Timeframe, bullish_first,
};
use crate::error::FetchError;
use crate::trace_time;
use crate::utils::{format_duration, now_utc};

use super::messages::{FetchFailure, ScanEvent, ScanProgress, TimeframeReport, estimate_remaining};
use super::state::ScanState;

pub type EventSender = UnboundedSender<ScanEvent>;

/// Cooperative stop request, checked between symbols.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Indicators plus detector over one validated series.
pub fn detect_series(series: &Series, config: &DetectorConfig) -> Vec<SetupSignal> {
    let Some(reference_close) = series.last_close() else {
        return Vec::new();
    };
    let indicators =
        CradleIndicators::compute(&series.closes(), config.fast_span, config.slow_span);
    let detector = CradleDetector::new(config.mode, config.strict_small_bull);

    detector
        .scan(series.candles(), &indicators)
        .into_iter()
        .map(|(direction, detected_on)| SetupSignal {
            symbol: series.symbol.clone(),
            timeframe: series.timeframe,
            direction,
            detected_on,
            reference_close,
        })
        .collect()
}

/// Walks timeframes then symbols, one fetch at a time.
pub struct Scanner<'a> {
    provider: &'a dyn MarketDataProvider,
    config: &'a ScanConfig,
    cancel: CancelFlag,
    events: Option<EventSender>,
}

impl<'a> Scanner<'a> {
    pub fn new(provider: &'a dyn MarketDataProvider, config: &'a ScanConfig) -> Self {
        Self {
            provider,
            config,
            cancel: CancelFlag::new(),
            events: None,
        }
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_events(mut self, events: Option<EventSender>) -> Self {
        self.events = events;
        self
    }

    fn emit(&self, event: ScanEvent) {
        if let Some(tx) = &self.events {
            // Nobody listening is fine.
            let _ = tx.send(event);
        }
    }

    /// One full cycle over every configured timeframe.
    ///
    /// A state that is already running comes back untouched: the trigger is dropped.
    pub async fn run_cycle(&self, state: ScanState, universe: &[Instrument]) -> ScanState {
        if let Err(e) = state.ensure_idle() {
            log::warn!("Scan trigger dropped: {}", e);
            return state;
        }

        let state = state.begin(now_utc());
        let started = Instant::now();
        log::info!(
            "🔍 Scanning {} symbols on {} timeframe(s) via {}",
            universe.len(),
            self.config.timeframes.len(),
            self.provider.name()
        );
        self.emit(ScanEvent::Started {
            timeframes: self.config.timeframes.clone(),
            symbols: universe.len(),
        });

        let mut reports = Vec::with_capacity(self.config.timeframes.len());
        let mut cancelled = false;
        for &timeframe in &self.config.timeframes {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            let report = self.scan_timeframe(timeframe, universe).await;
            cancelled = report.cancelled;
            self.emit(ScanEvent::TimeframeCompleted(report.clone()));
            reports.push(report);
            if cancelled {
                break;
            }
        }

        let state = state.finish(reports, cancelled);
        let elapsed = started.elapsed();
        if cancelled {
            log::warn!(
                "Scan cancelled after {}",
                format_duration(elapsed.as_millis() as i64)
            );
        } else {
            log::info!(
                "✅ Scan finished in {}: {} signal(s)",
                format_duration(elapsed.as_millis() as i64),
                state.total_signals()
            );
        }
        self.emit(ScanEvent::Finished {
            signals: state.total_signals(),
            cancelled,
            elapsed,
        });
        state
    }

    pub async fn scan_timeframe(
        &self,
        timeframe: Timeframe,
        universe: &[Instrument],
    ) -> TimeframeReport {
        let started = Instant::now();
        let total = universe.len();
        let mut found = Vec::new();
        let mut failures = Vec::new();
        let mut scanned = 0;
        let mut skipped_insufficient = 0;
        let mut cancelled = false;

        for (i, instrument) in universe.iter().enumerate() {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            if i > 0 && !self.config.throttle().is_zero() {
                tokio::time::sleep(self.config.throttle()).await;
                // A stop raised during the pause skips the next fetch.
                if self.cancel.is_cancelled() {
                    cancelled = true;
                    break;
                }
            }

            match self.fetch(instrument, timeframe).await {
                Ok(series) if series.len() < MIN_WINDOW => skipped_insufficient += 1,
                Ok(series) => {
                    scanned += 1;
                    let signals = trace_time!("detect_series", 500, {
                        detect_series(&series, &self.config.detector)
                    });
                    if DF.log_signals {
                        for s in &signals {
                            log::info!(
                                "🎯 {} {} {} on {} candle",
                                s.symbol,
                                s.timeframe,
                                s.direction,
                                s.detected_on
                            );
                        }
                    }
                    found.extend(signals);
                }
                Err(e) => {
                    log::warn!("Skipping {} {}: {}", instrument.symbol, timeframe, e);
                    let failure = FetchFailure {
                        symbol: instrument.symbol.clone(),
                        timeframe,
                        reason: e.to_string(),
                    };
                    self.emit(ScanEvent::FetchFailed(failure.clone()));
                    failures.push(failure);
                }
            }

            self.report_progress(timeframe, i + 1, total, started);
        }

        let (current, second_last): (Vec<_>, Vec<_>) = found
            .into_iter()
            .partition(|s| s.detected_on == DetectedOn::CurrentCandle);
        let report = TimeframeReport {
            timeframe,
            current: bullish_first(current),
            second_last: bullish_first(second_last),
            scanned,
            skipped_insufficient,
            failures,
            elapsed: started.elapsed(),
            cancelled,
        };
        log::info!(
            "{}: {} scanned, {} bullish, {} bearish, {} failed, {} short",
            timeframe,
            report.scanned,
            report.count(Direction::Bullish),
            report.count(Direction::Bearish),
            report.failures.len(),
            report.skipped_insufficient
        );
        report
    }

    async fn fetch(
        &self,
        instrument: &Instrument,
        timeframe: Timeframe,
    ) -> Result<Series, FetchError> {
        let limit = self.config.lookback;
        let timeout = self.config.fetch_timeout();
        let candles = tokio::time::timeout(
            timeout,
            self.provider.fetch_series(instrument, timeframe, limit),
        )
        .await
        .map_err(|_| FetchError::Timeout(timeout))??;

        Ok(Series::from_candles(
            instrument.symbol.clone(),
            timeframe,
            candles,
        )?)
    }

    fn report_progress(
        &self,
        timeframe: Timeframe,
        completed: usize,
        total: usize,
        started: Instant,
    ) {
        let elapsed = started.elapsed();
        let progress = ScanProgress {
            timeframe,
            completed,
            total,
            elapsed,
            eta: estimate_remaining(elapsed, completed, total),
        };
        if DF.log_every_progress_step || completed % 10 == 0 || completed == total {
            log::info!(
                "{} {}/{} ({:.0}%) ETA {}",
                timeframe,
                completed,
                total,
                100.0 * completed as f64 / total.max(1) as f64,
                progress
                    .eta
                    .map(|d| format_duration(d.as_millis() as i64))
                    .unwrap_or_else(|| "-".into())
            );
        }
        self.emit(ScanEvent::Progress(progress));
    }
}
