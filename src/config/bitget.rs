/// Public REST endpoints (no auth needed for market data).
pub struct BitgetEndpoints {
    pub base_url: &'static str,
    pub swap_contracts: &'static str,
    pub swap_candles: &'static str,
    pub spot_symbols: &'static str,
    pub spot_candles: &'static str,
}

pub struct BitgetConfig {
    pub endpoints: BitgetEndpoints,
    /// Bitget caps candle requests at this many rows.
    pub candles_limit: usize,
    pub timeout_ms: u64,
    /// Envelope `code` for a successful call.
    pub ok_code: &'static str,
}

pub const BITGET: BitgetConfig = BitgetConfig {
    endpoints: BitgetEndpoints {
        base_url: "https://api.bitget.com",
        swap_contracts: "/api/v2/mix/market/contracts",
        swap_candles: "/api/v2/mix/market/candles",
        spot_symbols: "/api/v2/spot/public/symbols",
        spot_candles: "/api/v2/spot/market/candles",
    },
    candles_limit: 1000,
    timeout_ms: 10_000,
    ok_code: "00000",
};

/// Futures product line for a settlement asset.
pub fn product_type_for(quote: &str) -> &'static str {
    match quote {
        "USDT" => "USDT-FUTURES",
        "USDC" => "USDC-FUTURES",
        _ => "COIN-FUTURES",
    }
}
