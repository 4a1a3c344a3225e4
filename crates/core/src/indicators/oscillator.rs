use super::Column;

/// Wilder RSI. Average gain and loss are seeded with the mean of the first `period` changes,
/// so the first value lands on bar `period`. Undefined (no movement at all) is `None`.
pub(super) fn rsi(close: &[f64], period: usize) -> Column {
    let n = close.len();
    let mut out = vec![None; n];
    if period == 0 || n < period + 1 {
        return out;
    }

    let mut gains = Vec::with_capacity(n - 1);
    let mut losses = Vec::with_capacity(n - 1);
    for i in 1..n {
        let change = close[i] - close[i - 1];
        gains.push(change.max(0.0));
        losses.push((-change).max(0.0));
    }

    let p = period as f64;
    let mut avg_gain = gains[..period].iter().sum::<f64>() / p;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / p;
    out[period] = rsi_value(avg_gain, avg_loss);

    // gains[i] is the change into bar i + 1.
    for i in period..gains.len() {
        avg_gain = (avg_gain * (p - 1.0) + gains[i]) / p;
        avg_loss = (avg_loss * (p - 1.0) + losses[i]) / p;
        out[i + 1] = rsi_value(avg_gain, avg_loss);
    }
    out
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 {
        return (avg_gain > 0.0).then_some(100.0);
    }
    Some(100.0 - 100.0 / (1.0 + avg_gain / avg_loss))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close_to(actual: Option<f64>, expected: f64) -> bool {
        actual.is_some_and(|v| (v - expected).abs() < 1e-9)
    }

    #[test]
    fn matches_hand_computed_wilder_values() {
        // Changes +1, +1, -1, +2.
        let out = rsi(&[1.0, 2.0, 3.0, 2.0, 4.0], 3);
        assert_eq!(&out[..3], &[None, None, None]);
        // Seed: gain 2/3, loss 1/3, RS 2.
        assert!(close_to(out[3], 200.0 / 3.0), "{:?}", out[3]);
        // gain (2/3*2+2)/3 = 10/9, loss (1/3*2)/3 = 2/9, RS 5.
        assert!(close_to(out[4], 250.0 / 3.0), "{:?}", out[4]);
    }

    #[test]
    fn smoothing_uses_wilder_alpha() {
        // A single down move after a flat seed decays by (n-1)/n per bar.
        let mut close = vec![10.0; 15];
        close.push(9.0);
        close.extend([10.0, 11.0, 12.0]);
        let out = rsi(&close, 14);
        assert_eq!(out[14], None);
        assert_eq!(out[15], Some(0.0));

        let mut gain = 0.0;
        let mut loss_avg = 1.0 / 14.0;
        for (bar, up) in [(16, 1.0), (17, 1.0), (18, 1.0)] {
            gain = (gain * 13.0 + up) / 14.0;
            loss_avg = loss_avg * 13.0 / 14.0;
            let expected = 100.0 - 100.0 / (1.0 + gain / loss_avg);
            assert!(close_to(out[bar], expected), "bar {bar}: {:?} vs {expected}", out[bar]);
        }
    }

    #[test]
    fn first_value_is_on_bar_period() {
        let close: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let out = rsi(&close, 14);
        assert!(out[..14].iter().all(Option::is_none));
        assert_eq!(out[14], Some(100.0));
    }

    #[test]
    fn flat_series_is_undefined() {
        assert!(rsi(&[5.0; 30], 14).iter().all(Option::is_none));
    }

    #[test]
    fn too_short_history_is_blank() {
        assert!(rsi(&[1.0, 2.0, 3.0], 3).iter().all(Option::is_none));
    }
}
