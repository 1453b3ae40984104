use std::time::Duration;

use thiserror::Error;

use crate::domain::Timeframe;

/// Why one (symbol, timeframe) fetch could not produce a series.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("rate limited by exchange")]
    RateLimited,

    #[error("exchange error {code}: {msg}")]
    Api { code: String, msg: String },

    #[error("unknown symbol {0}")]
    UnknownSymbol(String),

    #[error("timeframe {0} not supported by this exchange")]
    UnsupportedTimeframe(Timeframe),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("bad series: {0}")]
    Series(#[from] SeriesError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug, PartialEq)]
pub enum SeriesError {
    #[error("timestamp {timestamp_ms} at index {index} does not increase")]
    NotIncreasing { index: usize, timestamp_ms: i64 },

    #[error("non-finite value in candle {index}")]
    NonFinite { index: usize },
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("no timeframes selected")]
    NoTimeframes,

    #[error("ema spans must be positive (fast {fast}, slow {slow})")]
    ZeroSpan { fast: usize, slow: usize },

    #[error("lookback {lookback} is below the minimum window of {min} candles")]
    LookbackTooShort { lookback: usize, min: usize },

    #[error("poll interval must be at least one second")]
    ZeroPollInterval,
}

#[derive(Error, Debug, PartialEq)]
pub enum ScanError {
    #[error("a scan cycle is already running")]
    AlreadyRunning,
}
