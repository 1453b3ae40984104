/// Smoothing factor for an EMA of the given span: `2 / (span + 1)`.
pub fn alpha_for_span(span: usize) -> f64 {
    2.0 / (span.max(1) as f64 + 1.0)
}

/// Adjusted exponential moving average.
///
/// Output `i` is the weighted mean of `values[0..=i]`, where the value `k` steps back from `i`
/// carries weight `(1 - alpha)^k` and the weights are renormalised at every index. This is the
/// "adjusted" form (what pandas `ewm(span, adjust=True)` produces), not the recursive form seeded
/// with the first sample; the two disagree noticeably over short windows.
///
/// Numerator and denominator are carried forward, so the whole series is O(n).
pub fn ema_adjusted(values: &[f64], span: usize) -> Vec<f64> {
    debug_assert!(span > 0, "EMA span must be positive");
    let decay = 1.0 - alpha_for_span(span);

    let mut out = Vec::with_capacity(values.len());
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for &v in values {
        weighted_sum = v + decay * weighted_sum;
        weight_total = 1.0 + decay * weight_total;
        out.push(weighted_sum / weight_total);
    }
    out
}
