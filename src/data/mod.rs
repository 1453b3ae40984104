mod binance;
mod bitget;
mod provider;
mod rate_limiter;

use std::sync::Arc;

use crate::config::{BINANCE, Exchange, UniverseConfig};
use crate::domain::MarketKind;
use crate::error::FetchError;

pub use {
    binance::{BinanceProvider, interval_for},
    bitget::BitgetProvider,
    provider::{MarketDataProvider, select_instruments},
    rate_limiter::GlobalRateLimiter,
};

/// Build the provider for the configured exchange.
pub fn provider_for(universe: &UniverseConfig) -> Result<Arc<dyn MarketDataProvider>, FetchError> {
    Ok(match universe.exchange {
        Exchange::Bitget => Arc::new(BitgetProvider::new(
            &universe.quote_asset,
            universe.market_kind,
        )?),
        Exchange::Binance => {
            if universe.market_kind != MarketKind::Spot {
                log::warn!("Binance pairs are spot only; use --market spot or nothing will match");
            }
            Arc::new(BinanceProvider::new(GlobalRateLimiter::new(
                BINANCE.limits.weight_limit_minute,
            )))
        }
    })
}
