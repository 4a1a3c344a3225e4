use crate::domain::ticker::TickerEntry;
use serde::{Deserialize, Serialize};

/// Trading signal emitted by the classifier.
///
/// The model was trained on the expected move over the next 5 trading days: above +1% is
/// `Buy`, below -1% is `Sell`, anything in between is `Hold`. The threshold is baked into the
/// training labels and is not visible at inference time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Buy,
    Hold,
    Sell,
}

impl Signal {
    /// Maps a raw class label. Only 2 and 1 are meaningful; every other value is `Sell`.
    pub fn from_class(class: i64) -> Self {
        match class {
            2 => Signal::Buy,
            1 => Signal::Hold,
            _ => Signal::Sell,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Signal::Buy => "buy",
            Signal::Hold => "hold",
            Signal::Sell => "sell",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum TickerError {
    #[error("data source error: {0}")]
    DataSource(String),

    #[error("indicator error: {0}")]
    Indicator(String),

    #[error("inference error: {0}")]
    Inference(String),

    #[error("unexpected classifier output: {0}")]
    UnexpectedOutput(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Recommendation {
    Signal(Signal),
    InsufficientData,
    Error(TickerError),
}

impl Recommendation {
    pub fn signal(&self) -> Option<Signal> {
        match self {
            Recommendation::Signal(s) => Some(*s),
            _ => None,
        }
    }
}

/// Outcome for one ticker in one run. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub ticker: String,
    pub sector: String,
    pub latest_price: Option<f64>,
    pub change_pct: Option<f64>,
    pub recommendation: Recommendation,
}

impl RecommendationRecord {
    pub fn signal(
        entry: &TickerEntry,
        signal: Signal,
        latest_price: f64,
        change_pct: Option<f64>,
    ) -> Self {
        Self {
            ticker: entry.symbol.clone(),
            sector: entry.sector.clone(),
            latest_price: Some(latest_price),
            change_pct,
            recommendation: Recommendation::Signal(signal),
        }
    }

    pub fn insufficient_data(entry: &TickerEntry) -> Self {
        Self::without_quote(entry, Recommendation::InsufficientData)
    }

    pub fn error(entry: &TickerEntry, err: TickerError) -> Self {
        Self::without_quote(entry, Recommendation::Error(err))
    }

    fn without_quote(entry: &TickerEntry, recommendation: Recommendation) -> Self {
        Self {
            ticker: entry.symbol.clone(),
            sector: entry.sector.clone(),
            latest_price: None,
            change_pct: None,
            recommendation,
        }
    }
}

/// Records of one run, ordered by sector (lexicographic) and then by arrival order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultSet {
    records: Vec<RecommendationRecord>,
}

impl ResultSet {
    pub fn new(mut records: Vec<RecommendationRecord>) -> Self {
        // Stable: tickers keep their incoming order within a sector.
        records.sort_by(|a, b| a.sector.cmp(&b.sector));
        Self { records }
    }

    pub fn records(&self) -> &[RecommendationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn summary(&self) -> RunSummary {
        let mut out = RunSummary::default();
        for r in &self.records {
            match &r.recommendation {
                Recommendation::Signal(Signal::Buy) => out.buy += 1,
                Recommendation::Signal(Signal::Hold) => out.hold += 1,
                Recommendation::Signal(Signal::Sell) => out.sell += 1,
                Recommendation::InsufficientData => out.insufficient_data += 1,
                Recommendation::Error(_) => out.errors += 1,
            }
        }
        out
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub buy: usize,
    pub hold: usize,
    pub sell: usize,
    pub insufficient_data: usize,
    pub errors: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_mapping_is_total() {
        assert_eq!(Signal::from_class(2), Signal::Buy);
        assert_eq!(Signal::from_class(1), Signal::Hold);
        assert_eq!(Signal::from_class(0), Signal::Sell);
        for class in [-1, 3, 4, 42, i64::MIN, i64::MAX] {
            assert_eq!(Signal::from_class(class), Signal::Sell, "class {class}");
        }
    }

    #[test]
    fn orders_by_sector_keeping_ticker_order() {
        let records = vec![
            RecommendationRecord::insufficient_data(&TickerEntry::new("X", "B")),
            RecommendationRecord::insufficient_data(&TickerEntry::new("Y", "A")),
            RecommendationRecord::insufficient_data(&TickerEntry::new("Z", "A")),
        ];

        let set = ResultSet::new(records);
        let sectors: Vec<_> = set.records().iter().map(|r| r.sector.as_str()).collect();
        let tickers: Vec<_> = set.records().iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(sectors, ["A", "A", "B"]);
        assert_eq!(tickers, ["Y", "Z", "X"]);
    }

    #[test]
    fn placeholder_records_carry_no_numbers() {
        let entry = TickerEntry::new("AAPL", "Tecnología");
        let r = RecommendationRecord::insufficient_data(&entry);
        assert_eq!(r.latest_price, None);
        assert_eq!(r.change_pct, None);

        let r = RecommendationRecord::error(&entry, TickerError::DataSource("timeout".into()));
        assert_eq!(r.latest_price, None);
        assert_eq!(r.change_pct, None);
        assert_eq!(r.recommendation.signal(), None);
    }

    #[test]
    fn summary_counts_each_outcome() {
        let a = TickerEntry::new("A", "S");
        let set = ResultSet::new(vec![
            RecommendationRecord::signal(&a, Signal::Buy, 1.0, None),
            RecommendationRecord::signal(&a, Signal::Sell, 1.0, None),
            RecommendationRecord::insufficient_data(&a),
            RecommendationRecord::error(&a, TickerError::Inference("boom".into())),
        ]);
        assert_eq!(
            set.summary(),
            RunSummary {
                buy: 1,
                hold: 0,
                sell: 1,
                insufficient_data: 1,
                errors: 1,
            }
        );
    }
}
