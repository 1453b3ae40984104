#![allow(clippy::const_is_empty)]
#![allow(clippy::collapsible_if)]
#![allow(clippy::collapsible_else_if)]

// Core modules
pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod report;
pub mod utils;

// Re-export commonly used types outside of crate
pub use analysis::{CradleDetector, DetectorMode};
pub use config::{DF, Exchange, SCAN, ScanConfig};
pub use domain::{Candle, DetectedOn, Direction, Instrument, MarketKind, SetupSignal, Timeframe};
pub use engine::{ScanEvent, ScanState, ScreenerEngine};

// CLI argument parsing
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about = "Cradle setup screener", long_about = None)]
pub struct Cli {
    /// JSON config file. Flags below override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Comma separated timeframes, e.g. 1h,4h,1d
    #[arg(long, value_delimiter = ',')]
    pub timeframes: Vec<Timeframe>,

    /// Keep running and rescan after every candle close
    #[arg(long, default_value_t = false)]
    pub auto: bool,

    /// Candles fetched per symbol
    #[arg(long)]
    pub lookback: Option<usize>,

    /// Delay between symbol fetches, in milliseconds
    #[arg(long)]
    pub throttle_ms: Option<u64>,

    /// Scheduler poll interval in auto mode, in seconds
    #[arg(long)]
    pub poll_secs: Option<u64>,

    /// Pattern rules: live or historical
    #[arg(long)]
    pub mode: Option<DetectorMode>,

    /// Historical mode: require a small up candle
    #[arg(long, default_value_t = false)]
    pub strict: bool,

    #[arg(long)]
    pub exchange: Option<Exchange>,

    /// spot or swap
    #[arg(long)]
    pub market: Option<MarketKind>,

    /// Quote asset to screen, e.g. USDT
    #[arg(long)]
    pub quote: Option<String>,

    /// Only these symbols (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub symbols: Vec<String>,

    #[arg(long)]
    pub max_symbols: Option<usize>,
}

impl Cli {
    pub fn apply_to(&self, config: &mut ScanConfig) {
        if !self.timeframes.is_empty() {
            config.timeframes = self.timeframes.clone();
        }
        if self.auto {
            config.auto_run = true;
        }
        if let Some(lookback) = self.lookback {
            config.lookback = lookback;
        }
        if let Some(ms) = self.throttle_ms {
            config.throttle_ms = ms;
        }
        if let Some(secs) = self.poll_secs {
            config.poll_interval_secs = secs;
        }
        if let Some(mode) = self.mode {
            config.detector.mode = mode;
        }
        if self.strict {
            config.detector.strict_small_bull = true;
        }
        if let Some(exchange) = self.exchange {
            config.universe.exchange = exchange;
        }
        if let Some(kind) = self.market {
            config.universe.market_kind = kind;
        }
        if let Some(quote) = &self.quote {
            config.universe.quote_asset = quote.to_uppercase();
        }
        if !self.symbols.is_empty() {
            config.universe.symbols = self.symbols.iter().map(|s| s.to_uppercase()).collect();
        }
        if self.max_symbols.is_some() {
            config.universe.max_symbols = self.max_symbols;
        }
    }

    /// Defaults, then the config file, then flags. Validated.
    pub fn resolve_config(&self) -> Result<ScanConfig> {
        let mut config = match &self.config {
            Some(path) => ScanConfig::load_from_path(path)?,
            None => ScanConfig::default(),
        };
        self.apply_to(&mut config);
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "cradle-screener",
            "--timeframes",
            "15m,4h",
            "--lookback",
            "50",
            "--mode",
            "historical",
            "--strict",
            "--exchange",
            "binance",
            "--market",
            "spot",
            "--symbols",
            "btcusdt,ethusdt",
        ]);
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.timeframes, vec![Timeframe::M15, Timeframe::H4]);
        assert_eq!(config.lookback, 50);
        assert_eq!(config.detector.mode, DetectorMode::Historical);
        assert!(config.detector.strict_small_bull);
        assert_eq!(config.universe.exchange, Exchange::Binance);
        assert_eq!(config.universe.market_kind, MarketKind::Spot);
        assert_eq!(config.universe.symbols, vec!["BTCUSDT", "ETHUSDT"]);
        assert!(!config.auto_run);
        assert_eq!(config.throttle_ms, SCAN.throttle_ms);
    }

    #[test]
    fn no_flags_means_defaults() {
        let config = Cli::parse_from(["cradle-screener"]).resolve_config().unwrap();
        assert_eq!(config.timeframes, SCAN.timeframes.to_vec());
        assert_eq!(config.detector.mode, DetectorMode::Live);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(Cli::try_parse_from(["cradle-screener", "--timeframes", "7x"]).is_err());
        let cli = Cli::parse_from(["cradle-screener", "--lookback", "2"]);
        assert!(cli.resolve_config().is_err());
    }
}
