//! Order statistics over score distributions.

/// Computes the `p`-th percentile of `values` (`p` in [0, 100]) using the
/// linear-interpolation order statistic.
///
/// Sort ascending, let `k = (n - 1) * p / 100`; when `k` lands on an index the
/// element is returned exactly, otherwise the two neighbors are interpolated.
/// An empty input yields 0.0.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let k = (sorted.len() - 1) as f64 * (p / 100.0);
    let floor = k.floor();
    let ceil = k.ceil();
    if floor == ceil {
        return sorted[floor as usize];
    }
    sorted[floor as usize] * (ceil - k) + sorted[ceil as usize] * (k - floor)
}
