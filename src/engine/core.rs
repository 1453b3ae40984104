use std::sync::Arc;

use tokio::time::MissedTickBehavior;

use crate::config::ScanConfig;
use crate::data::{MarketDataProvider, select_instruments};
use crate::domain::Instrument;
use crate::utils::now_epoch_secs;

use super::scanner::{CancelFlag, EventSender, Scanner};
use super::scheduler::{AutoRunScheduler, TickDecision};
use super::state::ScanState;

pub struct ScreenerEngine {
    provider: Arc<dyn MarketDataProvider>,
    config: ScanConfig,
    /// Last published scan result
    state: ScanState,
    scheduler: AutoRunScheduler,
    /// Instruments from the most recent successful listing
    universe: Vec<Instrument>,
    cancel: CancelFlag,
    events: Option<EventSender>,
}

impl ScreenerEngine {
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: ScanConfig) -> Self {
        Self {
            provider,
            config,
            state: ScanState::default(),
            scheduler: AutoRunScheduler::new(),
            universe: Vec::new(),
            cancel: CancelFlag::new(),
            events: None,
        }
    }

    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Handle for stopping a running scan (and the auto loop) from elsewhere.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn universe(&self) -> &[Instrument] {
        &self.universe
    }

    /// Re-list symbols. A failed listing keeps the previous universe.
    pub async fn refresh_universe(&mut self) -> usize {
        match self.provider.list_symbols().await {
            Ok(listed) => {
                self.universe = select_instruments(&listed, &self.config.universe);
                log::info!(
                    "Universe: {} of {} listed instruments selected",
                    self.universe.len(),
                    listed.len()
                );
            }
            Err(e) => log::warn!(
                "Symbol listing failed ({}), keeping {} previous instruments",
                e,
                self.universe.len()
            ),
        }
        self.universe.len()
    }

    /// Refresh the universe and run one full cycle.
    ///
    /// A stop raised before this call belongs to an earlier scan and is cleared first.
    pub async fn run_manual(&mut self) -> &ScanState {
        self.cancel.reset();
        self.run_cycle().await
    }

    /// Scheduled cycles keep a pending stop so the auto loop winds down.
    async fn run_cycle(&mut self) -> &ScanState {
        self.refresh_universe().await;

        let scanner = Scanner::new(self.provider.as_ref(), &self.config)
            .with_cancel(self.cancel.clone())
            .with_events(self.events.clone());
        let previous = std::mem::take(&mut self.state);
        self.state = scanner.run_cycle(previous, &self.universe).await;
        &self.state
    }

    /// One scheduler poll. Returns the new state when a scan ran.
    pub async fn on_tick(&mut self, now_secs: i64) -> Option<&ScanState> {
        if !self.config.auto_run {
            return None;
        }
        match self.scheduler.tick(now_secs, &self.config.timeframes) {
            TickDecision::Trigger(_) => Some(self.run_cycle().await),
            TickDecision::Idle => None,
        }
    }

    /// Poll the scheduler until cancelled, calling `on_cycle` after every scan.
    pub async fn run_auto<F>(&mut self, mut on_cycle: F)
    where
        F: FnMut(&ScanState),
    {
        let mut interval = tokio::time::interval(self.config.poll_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        log::info!(
            "Auto-run on {:?}, polling every {}s",
            self.config
                .timeframes
                .iter()
                .map(|tf| tf.token())
                .collect::<Vec<_>>(),
            self.config.poll_interval_secs
        );

        loop {
            interval.tick().await;
            if self.cancel.is_cancelled() {
                log::info!("Auto-run stopped");
                break;
            }
            if let Some(state) = self.on_tick(now_epoch_secs()).await {
                on_cycle(state);
            }
        }
    }
}
