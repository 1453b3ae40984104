pub struct BinanceApiConfig {
    pub timeout_ms: u64,
    pub retries: u32,
    pub backoff_ms: u64,
}

impl Default for BinanceApiConfig {
    fn default() -> Self {
        Self {
            timeout_ms: BINANCE.client.timeout_ms,
            retries: BINANCE.client.retries,
            backoff_ms: BINANCE.client.backoff_ms,
        }
    }
}

/// REST constraints: max klines per call, weight budget and call cost.
pub struct RestLimits {
    pub klines_limit: usize,
    pub weight_limit_minute: u32,
    pub kline_call_weight: u32,
}

pub struct ClientDefaults {
    pub timeout_ms: u64,
    pub retries: u32,
    pub backoff_ms: u64,
}

pub const BINANCE_PAIRS_FILENAME: &str = "pairs.txt";

/// Quote assets recognised when splitting a bare symbol like `ETHUSDT`.
/// Longer/overlapping suffixes first.
pub const KNOWN_QUOTE_ASSETS: &[&str] = &["FDUSD", "USDT", "USDC", "BTC", "ETH", "BNB", "EUR"];

pub struct BinanceConfig {
    pub limits: RestLimits,
    pub client: ClientDefaults,
}

pub const BINANCE: BinanceConfig = BinanceConfig {
    limits: RestLimits {
        klines_limit: 1000,
        weight_limit_minute: 6000,
        kline_call_weight: 2,
    },
    client: ClientDefaults {
        timeout_ms: 5000,
        retries: 0, // no retry: one failure skips one (symbol, timeframe)
        backoff_ms: 1000,
    },
};
