use {
    crate::domain::Timeframe,
    serde::{Deserialize, Serialize},
    strum_macros::Display,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Direction {
    Bullish,
    Bearish,
}

/// Which candle of the series the setup completed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum DetectedOn {
    #[strum(serialize = "current")]
    CurrentCandle,
    #[strum(serialize = "second-last")]
    SecondLastCandle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupSignal {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub direction: Direction,
    pub detected_on: DetectedOn,
    /// Close of the newest candle in the series at scan time.
    pub reference_close: f64,
}

/// Stable partition: every Bullish signal ahead of every Bearish one, discovery order kept
/// inside each group.
pub fn bullish_first(signals: Vec<SetupSignal>) -> Vec<SetupSignal> {
    let (mut bullish, bearish): (Vec<_>, Vec<_>) = signals
        .into_iter()
        .partition(|s| s.direction == Direction::Bullish);
    bullish.extend(bearish);
    bullish
}
