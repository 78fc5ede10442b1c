//! Confidence from a lower bound on the win probability

/// z for a one-sided 90% bound (two-sided 95% uses 1.96)
pub const WILSON_Z: f64 = 1.645;

/// Smallest sample size used, so an empty bucket does not divide by zero
const MIN_N: f64 = 1e-9;

/// Wilson score lower bound for proportion `p` over `n` (possibly
/// fractional) observations, clamped to [0, 1].
pub fn wilson_lower_bound(p: f64, n: f64, z: f64) -> f64 {
    let n = if n.is_finite() { n.max(MIN_N) } else { MIN_N };
    let p = if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.0 };
    let z2 = z * z;
    let center = p + z2 / (2.0 * n);
    let radius = z * (p * (1.0 - p) / n + z2 / (4.0 * n * n)).max(0.0).sqrt();
    let lower = (center - radius) / (1.0 + z2 / n);
    if lower.is_finite() {
        lower.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Confidence in percent for a win rate (percent) backed by `ess` samples.
pub fn confidence_pct(win_rate_pct: f64, ess: f64) -> f64 {
    100.0 * wilson_lower_bound(win_rate_pct / 100.0, ess, WILSON_Z)
}
