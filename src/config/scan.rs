//! Scan configuration: compile-time blueprint plus the runtime struct it seeds.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::analysis::{DetectorMode, MIN_WINDOW};
use crate::domain::{MarketKind, Timeframe};
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Exchange {
    #[default]
    Bitget,
    Binance,
}

pub struct DetectorDefaults {
    pub mode: DetectorMode,
    pub strict_small_bull: bool,
    pub fast_span: usize,
    pub slow_span: usize,
}

pub struct UniverseDefaults {
    pub exchange: Exchange,
    pub market_kind: MarketKind,
    pub quote_asset: &'static str,
}

pub struct ScanDefaults {
    pub timeframes: &'static [Timeframe],
    pub auto_run: bool,
    pub lookback: usize,
    pub throttle_ms: u64,
    pub fetch_timeout_ms: u64,
    pub poll_interval_secs: u64,
    /// A scheduler trigger fires only within this many seconds after a candle boundary.
    pub trigger_window_secs: i64,
    pub detector: DetectorDefaults,
    pub universe: UniverseDefaults,
}

pub const SCAN: ScanDefaults = ScanDefaults {
    timeframes: &[Timeframe::H1, Timeframe::H4, Timeframe::D1],
    auto_run: false,
    lookback: 100,
    throttle_ms: 300,
    fetch_timeout_ms: 10_000,
    poll_interval_secs: 15,
    trigger_window_secs: 30,
    detector: DetectorDefaults {
        mode: DetectorMode::Live,
        strict_small_bull: false,
        fast_span: 10,
        slow_span: 20,
    },
    universe: UniverseDefaults {
        exchange: Exchange::Bitget,
        market_kind: MarketKind::Swap,
        quote_asset: "USDT",
    },
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub mode: DetectorMode,
    pub strict_small_bull: bool,
    pub fast_span: usize,
    pub slow_span: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            mode: SCAN.detector.mode,
            strict_small_bull: SCAN.detector.strict_small_bull,
            fast_span: SCAN.detector.fast_span,
            slow_span: SCAN.detector.slow_span,
        }
    }
}

/// Which instruments make up the scan universe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniverseConfig {
    pub exchange: Exchange,
    pub market_kind: MarketKind,
    pub quote_asset: String,
    /// When non-empty, only these symbols (if listed by the exchange) are scanned.
    pub symbols: Vec<String>,
    pub max_symbols: Option<usize>,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            exchange: SCAN.universe.exchange,
            market_kind: SCAN.universe.market_kind,
            quote_asset: SCAN.universe.quote_asset.to_string(),
            symbols: Vec::new(),
            max_symbols: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub timeframes: Vec<Timeframe>,
    pub auto_run: bool,
    /// Candles requested per (symbol, timeframe).
    pub lookback: usize,
    /// Pause between consecutive symbol fetches within a timeframe.
    pub throttle_ms: u64,
    pub fetch_timeout_ms: u64,
    pub poll_interval_secs: u64,
    pub detector: DetectorConfig,
    pub universe: UniverseConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            timeframes: SCAN.timeframes.to_vec(),
            auto_run: SCAN.auto_run,
            lookback: SCAN.lookback,
            throttle_ms: SCAN.throttle_ms,
            fetch_timeout_ms: SCAN.fetch_timeout_ms,
            poll_interval_secs: SCAN.poll_interval_secs,
            detector: DetectorConfig::default(),
            universe: UniverseConfig::default(),
        }
    }
}

impl ScanConfig {
    /// Read a JSON file. Missing keys keep their defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let cfg: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeframes.is_empty() {
            return Err(ConfigError::NoTimeframes);
        }
        if self.detector.fast_span == 0 || self.detector.slow_span == 0 {
            return Err(ConfigError::ZeroSpan {
                fast: self.detector.fast_span,
                slow: self.detector.slow_span,
            });
        }
        if self.lookback < MIN_WINDOW {
            return Err(ConfigError::LookbackTooShort {
                lookback: self.lookback,
                min: MIN_WINDOW,
            });
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(())
    }

    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}
