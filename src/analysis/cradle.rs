use serde::{Deserialize, Serialize};

use super::ema::ema_adjusted;

/// The [min, max] envelope of the fast and slow EMA at one index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CradleBand {
    pub lower: f64,
    pub upper: f64,
}

impl CradleBand {
    pub fn from_pair(fast: f64, slow: f64) -> Self {
        Self {
            lower: fast.min(slow),
            upper: fast.max(slow),
        }
    }

    /// Inclusive on both edges.
    pub fn contains(&self, price: f64) -> bool {
        self.lower <= price && price <= self.upper
    }
}

/// Pairwise min/max of two equally long EMA series.
pub fn build_band(fast: &[f64], slow: &[f64]) -> Vec<CradleBand> {
    debug_assert_eq!(fast.len(), slow.len());
    fast.iter()
        .zip(slow)
        .map(|(&f, &s)| CradleBand::from_pair(f, s))
        .collect()
}

/// Fast/slow EMAs and the band between them, index-aligned with the source series.
#[derive(Debug, Clone, PartialEq)]
pub struct CradleIndicators {
    pub fast: Vec<f64>,
    pub slow: Vec<f64>,
    pub band: Vec<CradleBand>,
}

impl CradleIndicators {
    pub fn compute(closes: &[f64], fast_span: usize, slow_span: usize) -> Self {
        Self::from_parts(ema_adjusted(closes, fast_span), ema_adjusted(closes, slow_span))
    }

    /// Use precomputed EMA values (mostly for tests and replays).
    pub fn from_parts(fast: Vec<f64>, slow: Vec<f64>) -> Self {
        let band = build_band(&fast, &slow);
        Self { fast, slow, band }
    }

    pub fn len(&self) -> usize {
        self.band.len()
    }

    pub fn is_empty(&self) -> bool {
        self.band.is_empty()
    }
}
