//! Cradle setup matching.
//!
//! Two rule sets exist and are kept apart rather than blended:
//!
//! * **Live** (primary): symmetric two-candle rule evaluated at any index `i >= 1`, using the EMA
//!   band at `i - 1`. The previous candle pulls back into the band against the EMA bias and the
//!   current candle turns back with it.
//! * **Historical** (legacy): asymmetric three-candle rule on the last three candles. A down
//!   candle closes inside the band, a small up candle follows, and the newest candle breaks the
//!   up candle's high. Only ever reports a bullish breakout.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use super::cradle::CradleIndicators;
use crate::domain::{Candle, DetectedOn, Direction};

/// Fewest candles either rule can look at.
pub const MIN_WINDOW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DetectorMode {
    #[default]
    Live,
    Historical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CradleDetector {
    pub mode: DetectorMode,
    /// Historical mode only: the up candle's body must be under half of the down candle's body.
    pub strict_small_bull: bool,
}

impl CradleDetector {
    pub fn new(mode: DetectorMode, strict_small_bull: bool) -> Self {
        Self {
            mode,
            strict_small_bull,
        }
    }

    /// Run the configured rule over a whole series and report every hit.
    ///
    /// Live mode checks the last and the second-last index independently; historical mode
    /// checks the final three-candle window once.
    pub fn scan(&self, candles: &[Candle], ind: &CradleIndicators) -> Vec<(Direction, DetectedOn)> {
        if candles.len() < MIN_WINDOW || ind.len() != candles.len() {
            return Vec::new();
        }
        match self.mode {
            DetectorMode::Live => {
                let last = candles.len() - 1;
                [
                    (last, DetectedOn::CurrentCandle),
                    (last - 1, DetectedOn::SecondLastCandle),
                ]
                .into_iter()
                .filter_map(|(idx, on)| detect_at(candles, ind, idx).map(|d| (d, on)))
                .collect()
            }
            DetectorMode::Historical => detect_historical(candles, ind, self.strict_small_bull)
                .map(|d| vec![(d, DetectedOn::CurrentCandle)])
                .unwrap_or_default(),
        }
    }
}

/// Live rule at index `idx`. Out-of-range indices (`idx < 1` or past the end) yield `None`.
pub fn detect_at(candles: &[Candle], ind: &CradleIndicators, idx: usize) -> Option<Direction> {
    if idx < 1 || idx >= candles.len() || idx >= ind.len() {
        return None;
    }
    let prev = &candles[idx - 1];
    let curr = &candles[idx];
    let fast = ind.fast[idx - 1];
    let slow = ind.slow[idx - 1];
    let band = ind.band[idx - 1];

    if !band.contains(prev.close_price) {
        return None;
    }

    if fast > slow && prev.is_down() && curr.is_up() {
        Some(Direction::Bullish)
    } else if fast < slow && prev.is_up() && curr.is_down() {
        Some(Direction::Bearish)
    } else {
        None
    }
}

/// Legacy three-candle rule on the end of the series, band taken at the oldest candle's index.
pub fn detect_historical(
    candles: &[Candle],
    ind: &CradleIndicators,
    strict_small_bull: bool,
) -> Option<Direction> {
    let n = candles.len();
    if n < MIN_WINDOW || ind.len() != n {
        return None;
    }
    let (c1, c2, c3) = (&candles[n - 3], &candles[n - 2], &candles[n - 1]);

    let bearish_origin = c1.is_down();
    let small_bull = c2.is_up() && (!strict_small_bull || c2.body_size() < 0.5 * c1.body_size());
    let breakout = c3.high_price > c2.high_price;
    let closed_in_cradle = ind.band[n - 3].contains(c1.close_price);

    (bearish_origin && small_bull && breakout && closed_in_cradle).then_some(Direction::Bullish)
}
