//! Configuration module for the screener.

// Can all be private now because we have a public re-export.
mod binance;
mod bitget;
mod debug;
mod scan;

// Re-export commonly used items
pub use binance::{BINANCE, BINANCE_PAIRS_FILENAME, BinanceApiConfig, KNOWN_QUOTE_ASSETS};
pub use bitget::{BITGET, product_type_for};
pub use debug::DF;
pub use scan::{DetectorConfig, Exchange, SCAN, ScanConfig, UniverseConfig};
