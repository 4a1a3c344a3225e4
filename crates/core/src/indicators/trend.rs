use super::volatility::true_range;
use super::Column;

/// Average directional index with Wilder smoothing.
///
/// Directional movement starts at the second bar, DX needs `period` smoothed values and ADX
/// averages `period` DX values, so the first ADX lands on bar `2 * period`.
pub(super) fn adx(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Column {
    let n = close.len();
    let mut out = vec![None; n];
    if period == 0 || n < 2 * period + 1 {
        return out;
    }

    let tr = true_range(high, low, close);
    let mut plus_dm = Vec::with_capacity(n - 1);
    let mut minus_dm = Vec::with_capacity(n - 1);
    for i in 1..n {
        let up_move = high[i] - high[i - 1];
        let down_move = low[i - 1] - low[i];
        plus_dm.push(if up_move > down_move && up_move > 0.0 { up_move } else { 0.0 });
        minus_dm.push(if down_move > up_move && down_move > 0.0 { down_move } else { 0.0 });
    }
    // Align with the movement arrays, which start at bar 1.
    let tr = &tr[1..];

    let p = period as f64;
    let mut smoothed_plus = plus_dm[..period].iter().sum::<f64>();
    let mut smoothed_minus = minus_dm[..period].iter().sum::<f64>();
    let mut smoothed_tr = tr[..period].iter().sum::<f64>();

    // dx[k] belongs to bar period + 1 + k.
    let mut dx = Vec::with_capacity(n);
    for i in period..plus_dm.len() {
        smoothed_plus = smoothed_plus - smoothed_plus / p + plus_dm[i];
        smoothed_minus = smoothed_minus - smoothed_minus / p + minus_dm[i];
        smoothed_tr = smoothed_tr - smoothed_tr / p + tr[i];

        let (pdi, mdi) = if smoothed_tr > 0.0 {
            (100.0 * smoothed_plus / smoothed_tr, 100.0 * smoothed_minus / smoothed_tr)
        } else {
            (0.0, 0.0)
        };
        let di_sum = pdi + mdi;
        dx.push(if di_sum > 0.0 { 100.0 * (pdi - mdi).abs() / di_sum } else { 0.0 });
    }

    if dx.len() < period {
        return out;
    }

    let mut value = dx[..period].iter().sum::<f64>() / p;
    out[2 * period] = Some(value);
    for (k, d) in dx.iter().enumerate().skip(period) {
        value = (value * (p - 1.0) + d) / p;
        out[period + 1 + k] = Some(value);
    }
    out
}
