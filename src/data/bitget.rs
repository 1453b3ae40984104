use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{BITGET, DF, product_type_for};
use crate::data::provider::{MarketDataProvider, keep_latest, normalize_candles};
use crate::domain::{Candle, Instrument, MarketKind, Timeframe};
use crate::error::FetchError;
use crate::utils::epoch_ms_to_utc;

/// Bitget public market data for one market kind (USDT-M perpetuals or spot).
#[derive(Clone)]
pub struct BitgetProvider {
    http: Client,
    base_url: String,
    settlement: String,
    kind: MarketKind,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: String,
    #[serde(default)]
    msg: String,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContractRow {
    symbol: String,
    base_coin: String,
    quote_coin: String,
    #[serde(default)]
    symbol_status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpotSymbolRow {
    symbol: String,
    base_coin: String,
    quote_coin: String,
    #[serde(default)]
    status: Option<String>,
}

impl BitgetProvider {
    /// `settlement` picks the futures product line (e.g. `USDT` -> `USDT-FUTURES`); `kind`
    /// decides which listing endpoint is queried.
    pub fn new(settlement: &str, kind: MarketKind) -> Result<Self, FetchError> {
        Self::with_base_url(BITGET.endpoints.base_url, settlement, kind)
    }

    pub fn with_base_url(
        base_url: &str,
        settlement: &str,
        kind: MarketKind,
    ) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(Duration::from_millis(BITGET.timeout_ms))
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            settlement: settlement.to_uppercase(),
            kind,
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.http.get(&url).query(query).send().await?;

        if resp.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited);
        }
        // Bitget reports most failures as JSON with a non-zero code, even on 4xx.
        let status = resp.status();
        let body = resp.text().await?;
        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| {
            if status.is_success() {
                FetchError::Malformed(e.to_string())
            } else {
                FetchError::Api {
                    code: status.as_u16().to_string(),
                    msg: body.chars().take(200).collect(),
                }
            }
        })?;
        unwrap_envelope(envelope)
    }

    async fn list_swaps(&self) -> Result<Vec<Instrument>, FetchError> {
        let rows: Vec<ContractRow> = self
            .get(
                BITGET.endpoints.swap_contracts,
                &[("productType", product_type_for(&self.settlement).to_string())],
            )
            .await?;
        Ok(rows
            .into_iter()
            .filter(|r| r.symbol_status.as_deref().is_none_or(|s| s == "normal"))
            .map(|r| Instrument::new(r.symbol, r.base_coin, r.quote_coin, MarketKind::Swap))
            .collect())
    }

    async fn list_spot(&self) -> Result<Vec<Instrument>, FetchError> {
        let rows: Vec<SpotSymbolRow> = self.get(BITGET.endpoints.spot_symbols, &[]).await?;
        Ok(rows
            .into_iter()
            .filter(|r| r.status.as_deref().is_none_or(|s| s == "online"))
            .map(|r| Instrument::new(r.symbol, r.base_coin, r.quote_coin, MarketKind::Spot))
            .collect())
    }
}

fn unwrap_envelope<T>(envelope: Envelope<T>) -> Result<T, FetchError> {
    if envelope.code != BITGET.ok_code {
        return Err(match envelope.code.as_str() {
            "429" | "40429" => FetchError::RateLimited,
            "40034" => FetchError::UnknownSymbol(envelope.msg),
            _ => FetchError::Api {
                code: envelope.code,
                msg: envelope.msg,
            },
        });
    }
    envelope
        .data
        .ok_or_else(|| FetchError::Malformed("missing data field".to_string()))
}

/// Candle granularity token for a market kind. Bitget has no 2-hour candles on either market.
pub(crate) fn granularity(
    kind: MarketKind,
    timeframe: Timeframe,
) -> Result<&'static str, FetchError> {
    use Timeframe as T;
    let token = match kind {
        MarketKind::Swap => match timeframe {
            T::M1 => "1m",
            T::M3 => "3m",
            T::M5 => "5m",
            T::M15 => "15m",
            T::M30 => "30m",
            T::H1 => "1H",
            T::H4 => "4H",
            T::H6 => "6H",
            T::H12 => "12H",
            T::D1 => "1D",
            T::D3 => "3D",
            T::W1 => "1W",
            T::Month1 => "1M",
            T::H2 => return Err(FetchError::UnsupportedTimeframe(timeframe)),
        },
        MarketKind::Spot => match timeframe {
            T::M1 => "1min",
            T::M3 => "3min",
            T::M5 => "5min",
            T::M15 => "15min",
            T::M30 => "30min",
            T::H1 => "1h",
            T::H4 => "4h",
            T::H6 => "6h",
            T::H12 => "12h",
            T::D1 => "1day",
            T::D3 => "3day",
            T::W1 => "1week",
            T::Month1 => "1M",
            T::H2 => return Err(FetchError::UnsupportedTimeframe(timeframe)),
        },
    };
    Ok(token)
}

fn number(v: &Value) -> Option<f64> {
    match v {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Rows look like `["1695835800000", "26210.5", "26210.5", "26153", "26174.5", "1650.6", ...]`.
pub(crate) fn parse_candle_rows(rows: &[Vec<Value>]) -> Result<Vec<Candle>, FetchError> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let field = |k: usize| {
                row.get(k)
                    .and_then(number)
                    .ok_or_else(|| FetchError::Malformed(format!("row {} field {}", i, k)))
            };
            Ok(Candle::new(
                field(0)? as i64,
                field(1)?,
                field(2)?,
                field(3)?,
                field(4)?,
                field(5)?,
            ))
        })
        .collect()
}

#[async_trait]
impl MarketDataProvider for BitgetProvider {
    fn name(&self) -> &str {
        "bitget"
    }

    async fn list_symbols(&self) -> Result<Vec<Instrument>, FetchError> {
        let listed = match self.kind {
            MarketKind::Swap => self.list_swaps().await?,
            MarketKind::Spot => self.list_spot().await?,
        };
        log::info!("Bitget lists {} {} instruments", listed.len(), self.kind);
        Ok(listed)
    }

    async fn fetch_series(
        &self,
        instrument: &Instrument,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, FetchError> {
        let limit = limit.min(BITGET.candles_limit);
        let mut query = vec![
            ("symbol", instrument.symbol.clone()),
            (
                "granularity",
                granularity(instrument.kind, timeframe)?.to_string(),
            ),
            ("limit", limit.to_string()),
        ];
        let path = match instrument.kind {
            MarketKind::Swap => {
                query.push(("productType", product_type_for(&instrument.quote).to_string()));
                BITGET.endpoints.swap_candles
            }
            MarketKind::Spot => BITGET.endpoints.spot_candles,
        };

        let rows: Vec<Vec<Value>> = self.get(path, &query).await?;
        let candles = keep_latest(normalize_candles(parse_candle_rows(&rows)?), limit);

        if DF.log_fetch_detail {
            log::info!(
                "bitget {} {}: {} candles, newest {}",
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
