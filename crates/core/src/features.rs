use crate::domain::features::{FeatureRow, FEATURE_COUNT, FEATURE_NAMES};
use crate::indicators::IndicatorFrame;

/// Tickers with fewer rows than this never reach the classifier.
pub const MIN_OBSERVATIONS: usize = 30;

/// Price snapshot derived from the raw close series, independent of the feature row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub latest_price: f64,
    pub change_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Assembled {
    Ready { row: FeatureRow, quote: Quote },
    InsufficientData { rows: usize },
}

/// Builds the per-day feature rows in model column order. Columns the frame lacks are zero.
pub fn feature_rows(frame: &IndicatorFrame) -> Vec<FeatureRow> {
    let columns: Vec<_> = FEATURE_NAMES.iter().map(|name| frame.column(name)).collect();

    (0..frame.len())
        .map(|i| {
            let mut values = [None; FEATURE_COUNT];
            for (slot, column) in values.iter_mut().zip(&columns) {
                *slot = column.and_then(|c| c.get(i).copied().flatten());
            }
            FeatureRow::new(values)
        })
        .collect()
}

/// Selects the latest feature row as inference input, or reports a too-short history.
pub fn assemble(frame: &IndicatorFrame, closes: &[f64], min_observations: usize) -> Assembled {
    let rows = feature_rows(frame);
    if rows.len() < min_observations {
        return Assembled::InsufficientData { rows: rows.len() };
    }

    match (rows.last(), quote(closes)) {
        (Some(row), Some(quote)) => Assembled::Ready { row: *row, quote },
        _ => Assembled::InsufficientData { rows: rows.len() },
    }
}

pub fn quote(closes: &[f64]) -> Option<Quote> {
    let latest = *closes.last()?;
    Some(Quote {
        latest_price: round2(latest),
        change_pct: change_pct(closes),
    })
}

/// Day-over-day change in percent. `None` with fewer than two closes.
pub fn change_pct(closes: &[f64]) -> Option<f64> {
    let [.., prev, last] = closes else {
        return None;
    };
    if *prev == 0.0 {
        return None;
    }
    Some(round2(100.0 * (last - prev) / prev))
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
