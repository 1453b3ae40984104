use crate::{
    domain::{Candle, Timeframe},
    error::SeriesError,
};

/// Candles for one (symbol, timeframe) pair, strictly increasing by timestamp.
#[derive(Debug, Clone)]
pub struct Series {
    pub symbol: String,
    pub timeframe: Timeframe,
    candles: Vec<Candle>,
}

impl Series {
    pub fn from_candles(
        symbol: impl Into<String>,
        timeframe: Timeframe,
        candles: Vec<Candle>,
    ) -> Result<Self, SeriesError> {
        if let Some(bad) = candles.iter().position(|c| !c.is_finite()) {
            return Err(SeriesError::NonFinite { index: bad });
        }
        if let Some(w) = candles
            .windows(2)
            .position(|w| w[1].timestamp_ms <= w[0].timestamp_ms)
        {
            return Err(SeriesError::NotIncreasing {
                index: w + 1,
                timestamp_ms: candles[w + 1].timestamp_ms,
            });
        }
        Ok(Self {
            symbol: symbol.into(),
            timeframe,
            candles,
        })
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close_price).collect()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.candles.last().map(|c| c.close_price)
    }
}
