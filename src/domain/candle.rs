use serde::{Deserialize, Serialize};

// Define the CandleType enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandleType {
    Bullish,
    Bearish,
    Doji,
}

// Define the Candle struct with all its properties
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp_ms: i64,

    pub open_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub close_price: f64,

    pub volume: f64,
}

// Implement methods for the Candle struct
impl Candle {
    // A constructor for convenience
    pub fn new(timestamp_ms: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Candle {
            timestamp_ms,
            open_price: open,
            high_price: high,
            low_price: low,
            close_price: close,
            volume,
        }
    }

    /// Strict classification: a candle that closes exactly at its open is neither up nor down.
    pub fn get_type(&self) -> CandleType {
        if self.close_price > self.open_price {
            CandleType::Bullish
        } else if self.close_price < self.open_price {
            CandleType::Bearish
        } else {
            CandleType::Doji
        }
    }

    pub fn is_up(&self) -> bool {
        self.get_type() == CandleType::Bullish
    }

    pub fn is_down(&self) -> bool {
        self.get_type() == CandleType::Bearish
    }

    // Absolute size of the body
    pub fn body_size(&self) -> f64 {
        (self.close_price - self.open_price).abs()
    }

    pub fn is_finite(&self) -> bool {
        [
            self.open_price,
            self.high_price,
            self.low_price,
            self.close_price,
            self.volume,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}
