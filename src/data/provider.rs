use async_trait::async_trait;

use crate::config::UniverseConfig;
use crate::domain::{Candle, Instrument, Timeframe};
use crate::error::FetchError;

/// Abstract interface for fetching market data.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Short label for logs.
    fn name(&self) -> &str;

    /// Every instrument the exchange lists, across the market kinds it serves.
    async fn list_symbols(&self) -> Result<Vec<Instrument>, FetchError>;

    /// The most recent `limit` candles, oldest first.
    async fn fetch_series(
        &self,
        instrument: &Instrument,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, FetchError>;
}

/// Narrow a listing down to the instruments a scan should visit.
///
/// Keeps the configured market kind and quote asset, intersects with an explicit symbol list
/// when one is given, sorts by symbol and applies the optional cap.
pub fn select_instruments(listed: &[Instrument], universe: &UniverseConfig) -> Vec<Instrument> {
    let mut selected: Vec<Instrument> = listed
        .iter()
        .filter(|i| i.kind == universe.market_kind)
        .filter(|i| i.quote.eq_ignore_ascii_case(&universe.quote_asset))
        .filter(|i| {
            universe.symbols.is_empty()
                || universe
                    .symbols
                    .iter()
                    .any(|s| s.eq_ignore_ascii_case(&i.symbol))
        })
        .cloned()
        .collect();

    selected.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    selected.dedup_by(|a, b| a.symbol == b.symbol);

    if let Some(cap) = universe.max_symbols {
        selected.truncate(cap);
    }
    selected
}

/// Oldest first, duplicates (same open time) dropped keeping the later row.
pub(crate) fn normalize_candles(mut candles: Vec<Candle>) -> Vec<Candle> {
    candles.sort_by_key(|c| c.timestamp_ms);
    let mut out: Vec<Candle> = Vec::with_capacity(candles.len());
    for c in candles {
        match out.last_mut() {
            Some(last) if last.timestamp_ms == c.timestamp_ms => *last = c,
            _ => out.push(c),
        }
    }
    out
}

/// Keep only the newest `limit` candles.
pub(crate) fn keep_latest(mut candles: Vec<Candle>, limit: usize) -> Vec<Candle> {
    if candles.len() > limit {
        candles.drain(..candles.len() - limit);
    }
    candles
}
