use super::Column;

const CCI_CONSTANT: f64 = 0.015;

pub(super) fn true_range(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    (0..close.len())
        .map(|i| {
            let hl = high[i] - low[i];
            if i == 0 {
                return hl;
            }
            let hc = (high[i] - close[i - 1]).abs();
            let lc = (low[i] - close[i - 1]).abs();
            hl.max(hc).max(lc)
        })
        .collect()
}

/// Wilder-smoothed average true range, seeded with the mean of the first `period` ranges.
pub(super) fn atr(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Column {
    let n = close.len();
    let mut out = vec![None; n];
    if period == 0 || n < period {
        return out;
    }

    let tr = true_range(high, low, close);
    let mut value = tr[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = Some(value);
    for i in period..n {
        value = (value * (period - 1) as f64 + tr[i]) / period as f64;
        out[i] = Some(value);
    }
    out
}

pub(super) fn cci(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Column {
    let n = close.len();
    let mut out = vec![None; n];
    if period == 0 || n < period {
        return out;
    }

    let typical: Vec<f64> = (0..n).map(|i| (high[i] + low[i] + close[i]) / 3.0).collect();
    for i in (period - 1)..n {
        let window = &typical[i + 1 - period..=i];
        let mean = window.iter().sum::<f64>() / period as f64;
        let mad = window.iter().map(|tp| (tp - mean).abs()).sum::<f64>() / period as f64;
        if mad > 0.0 {
            out[i] = Some((typical[i] - mean) / (CCI_CONSTANT * mad));
        }
    }
    out
}
