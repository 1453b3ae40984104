//! Debugging feature flags.

pub struct LogFlags {
    /// Per-symbol fetch lines (request, candle count).
    pub log_fetch_detail: bool,

    /// Every scheduler tick, not just the ones that trigger.
    pub log_scheduler_ticks: bool,

    /// One progress line per symbol (otherwise every 10th symbol and the last).
    pub log_every_progress_step: bool,

    /// Activate trace_time macro (for cool scope-level timing)
    pub log_performance: bool,

    /// Log each individual signal as it is found.
    pub log_signals: bool,
}

pub const DF: LogFlags = LogFlags {
    log_fetch_detail: false,
    log_scheduler_ticks: false,
    log_every_progress_step: false,
    log_performance: false,
    log_signals: true,
};
