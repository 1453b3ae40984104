// Spot klines via the official Binance connector. The universe comes from a local pairs file
// since the scan only needs a curated symbol list here.

use std::path::PathBuf;

use async_trait::async_trait;
use binance_sdk::{
    config::ConfigurationRestApi,
    errors::{self, ConnectorError as connection_error},
    spot::{
        SpotRestApi,
        rest_api::{KlinesIntervalEnum, KlinesItemInner, KlinesParams, RestApi},
    },
};

use crate::config::{BINANCE, BINANCE_PAIRS_FILENAME, BinanceApiConfig, DF};
use crate::data::{
    GlobalRateLimiter,
    provider::{MarketDataProvider, keep_latest, normalize_candles},
};
use crate::domain::{Candle, Instrument, MarketKind, Timeframe};
use crate::error::FetchError;
use crate::utils::epoch_ms_to_utc;

pub fn interval_for(timeframe: Timeframe) -> KlinesIntervalEnum {
    use Timeframe as T;
    match timeframe {
        T::M1 => KlinesIntervalEnum::Interval1m,
        T::M3 => KlinesIntervalEnum::Interval3m,
        T::M5 => KlinesIntervalEnum::Interval5m,
        T::M15 => KlinesIntervalEnum::Interval15m,
        T::M30 => KlinesIntervalEnum::Interval30m,
        T::H1 => KlinesIntervalEnum::Interval1h,
        T::H2 => KlinesIntervalEnum::Interval2h,
        T::H4 => KlinesIntervalEnum::Interval4h,
        T::H6 => KlinesIntervalEnum::Interval6h,
        T::H12 => KlinesIntervalEnum::Interval12h,
        T::D1 => KlinesIntervalEnum::Interval1d,
        T::D3 => KlinesIntervalEnum::Interval3d,
        T::W1 => KlinesIntervalEnum::Interval1w,
        T::Month1 => KlinesIntervalEnum::Interval1M,
    }
}

pub struct BinanceProvider {
    limiter: GlobalRateLimiter,
    pairs_file: PathBuf,
}

impl BinanceProvider {
    pub fn new(limiter: GlobalRateLimiter) -> Self {
        Self::with_pairs_file(limiter, PathBuf::from(BINANCE_PAIRS_FILENAME))
    }

    pub fn with_pairs_file(limiter: GlobalRateLimiter, pairs_file: PathBuf) -> Self {
        Self {
            limiter,
            pairs_file,
        }
    }
}

/// One symbol per line; blank lines and `#` comments ignored.
pub(crate) fn parse_pairs_file(text: &str) -> Vec<Instrument> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .filter_map(|l| {
            let symbol = l.to_uppercase();
            let parsed = Instrument::from_concatenated(&symbol, MarketKind::Spot);
            if parsed.is_none() {
                log::warn!("Ignoring pair with unknown quote asset: {}", symbol);
            }
            parsed
        })
        .collect()
}

fn item_to_f64(item: Option<KlinesItemInner>) -> Option<f64> {
    item.and_then(|inner| match inner {
        KlinesItemInner::String(s) => s.parse::<f64>().ok(),
        _ => None,
    })
}

/// Kline rows: open time, open, high, low, close, volume, close time, ...
pub(crate) fn candle_from_kline(row: Vec<KlinesItemInner>) -> Result<Candle, FetchError> {
    let mut items = row.into_iter();
    let timestamp_ms = match items.next() {
        Some(KlinesItemInner::Integer(ts)) => ts,
        _ => return Err(FetchError::Malformed("kline open_time".to_string())),
    };
    let mut next = |name: &str| {
        item_to_f64(items.next()).ok_or_else(|| FetchError::Malformed(format!("kline {}", name)))
    };
    let open = next("open")?;
    let high = next("high")?;
    let low = next("low")?;
    let close = next("close")?;
    let volume = next("volume")?;
    Ok(Candle::new(timestamp_ms, open, high, low, close, volume))
}

async fn configure_binance_client() -> Result<RestApi, FetchError> {
    let config = BinanceApiConfig::default();
    let rest_conf = ConfigurationRestApi::builder()
        .timeout(config.timeout_ms)
        .retries(config.retries)
        .backoff(config.backoff_ms)
        .build()
        .map_err(|e| FetchError::Connection(e.to_string()))?;
    Ok(SpotRestApi::production(rest_conf))
}

/// `klines()` hands back `anyhow::Error`; anything that is not a connector error is treated as transport.
fn classify_error(symbol: &str, e: anyhow::Error) -> FetchError {
    match e.downcast_ref::<errors::ConnectorError>() {
        Some(conn_err) => classify_connector(symbol, conn_err),
        None => FetchError::Connection(format!("{}: {:#}", symbol, e)),
    }
}

fn classify_connector(symbol: &str, conn_err: &errors::ConnectorError) -> FetchError {
    match conn_err {
        connection_error::TooManyRequestsError(_) | connection_error::RateLimitBanError(_) => {
            FetchError::RateLimited
        }
        connection_error::BadRequestError(msg) if msg.contains("Invalid symbol") => {
            FetchError::UnknownSymbol(symbol.to_string())
        }
        connection_error::NotFoundError(_) => FetchError::UnknownSymbol(symbol.to_string()),
        connection_error::ServerError { msg, status_code } => FetchError::Api {
            code: status_code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "server".to_string()),
            msg: msg.clone(),
        },
        other => FetchError::Connection(other.to_string()),
    }
}

#[async_trait]
impl MarketDataProvider for BinanceProvider {
    fn name(&self) -> &str {
        "binance"
    }

    async fn list_symbols(&self) -> Result<Vec<Instrument>, FetchError> {
        let text = tokio::fs::read_to_string(&self.pairs_file).await?;
        let pairs = parse_pairs_file(&text);
        log::info!(
            "Loaded {} Binance pairs from {}",
            pairs.len(),
            self.pairs_file.display()
        );
        Ok(pairs)
    }

    async fn fetch_series(
        &self,
        instrument: &Instrument,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, FetchError> {
        if instrument.kind != MarketKind::Spot {
            return Err(FetchError::UnknownSymbol(format!(
                "{} is not a Binance spot market",
                instrument.symbol
            )));
        }
        let rest_client = configure_binance_client().await?;
        let limit = limit.min(BINANCE.limits.klines_limit);

        self.limiter
            .acquire(BINANCE.limits.kline_call_weight, &instrument.symbol)
            .await;

        let params = KlinesParams::builder(instrument.symbol.clone(), interval_for(timeframe))
            .limit(limit as i32)
            .build()
            .map_err(|e| FetchError::Connection(e.to_string()))?;

        let response = rest_client
            .klines(params)
            .await
            .map_err(|e| classify_error(&instrument.symbol, e))?;
        let rows = response
            .data()
            .await
            .map_err(|e| classify_connector(&instrument.symbol, &e))?;

        let candles = rows
            .into_iter()
            .map(candle_from_kline)
            .collect::<Result<Vec<_>, _>>()?;
        let candles = keep_latest(normalize_candles(candles), limit);

        if DF.log_fetch_detail {
            log::info!(
                "binance {} {}: {} candles, newest {}",
                instrument.symbol,
                timeframe,
                candles.len(),
                candles
                    .last()
                    .map(|c| epoch_ms_to_utc(c.timestamp_ms))
                    .unwrap_or_default()
            );
        }
        Ok(candles)
    }
}
