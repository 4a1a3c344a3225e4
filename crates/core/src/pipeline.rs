use crate::config::Settings;
use crate::domain::recommendation::{RecommendationRecord, ResultSet, Signal, TickerError};
use crate::domain::ticker::{default_registry, TickerEntry};
use crate::features::{self, Assembled, MIN_OBSERVATIONS};
use crate::indicators::{self, IndicatorError};
use crate::ingest::provider::PriceSource;
use crate::ingest::types::DateRange;
use crate::model::Classifier;
use chrono::NaiveDate;
use futures_util::future::FutureExt;
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;

/// Immutable run configuration, built once at process start.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub tickers: Vec<TickerEntry>,
    pub history_start: NaiveDate,
    pub min_observations: usize,
    pub concurrency: usize,
}

impl PipelineConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            tickers: default_registry(),
            history_start: settings.history_start,
            min_observations: MIN_OBSERVATIONS,
            concurrency: settings.fetch_concurrency,
        }
    }

    pub fn with_tickers(mut self, tickers: Vec<TickerEntry>) -> Self {
        self.tickers = tickers;
        self
    }
}

#[derive(Clone)]
pub struct Pipeline {
    config: Arc<PipelineConfig>,
    source: Arc<dyn PriceSource>,
    classifier: Arc<dyn Classifier>,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        source: Arc<dyn PriceSource>,
        classifier: Arc<dyn Classifier>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            source,
            classifier,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Evaluates every configured ticker with prices up to (excluding) `as_of_date`.
    ///
    /// Tickers are evaluated concurrently up to the configured bound. A failing ticker only
    /// affects its own record. Output order does not depend on completion order.
    pub async fn run(&self, as_of_date: NaiveDate) -> ResultSet {
        let range = DateRange {
            start: self.config.history_start,
            end: as_of_date,
        };

        let t0 = std::time::Instant::now();
        let mut evaluated: Vec<(usize, RecommendationRecord)> =
            stream::iter(self.config.tickers.iter().enumerate())
                .map(|(idx, entry)| async move { (idx, self.evaluate(entry, range).await) })
                .buffer_unordered(self.config.concurrency.max(1))
                .collect::<Vec<_>>()
                .boxed()
                .await;

        evaluated.sort_by_key(|(idx, _)| *idx);
        let results = ResultSet::new(evaluated.into_iter().map(|(_, r)| r).collect());

        let summary = results.summary();
        tracing::info!(
            source = self.source.source_name(),
            %as_of_date,
            tickers = results.len(),
            buy = summary.buy,
            hold = summary.hold,
            sell = summary.sell,
            insufficient_data = summary.insufficient_data,
            errors = summary.errors,
            elapsed_ms = t0.elapsed().as_millis(),
            "recommendation run finished"
        );

        results
    }

    pub async fn evaluate(&self, entry: &TickerEntry, range: DateRange) -> RecommendationRecord {
        let series = match self.source.fetch_daily(&entry.symbol, range).await {
            Ok(series) => series,
            Err(err) => {
                let detail = format!("{err:#}");
                tracing::warn!(ticker = %entry.symbol, error = %detail, "price fetch failed");
                return RecommendationRecord::error(entry, TickerError::DataSource(detail));
            }
        };

        let frame = match indicators::compute(&series) {
            Ok(frame) => frame,
            Err(IndicatorError::NoData) => {
                tracing::debug!(ticker = %entry.symbol, "no price data");
                return RecommendationRecord::insufficient_data(entry);
            }
            Err(err) => {
                tracing::warn!(ticker = %entry.symbol, error = %err, "indicator computation failed");
                return RecommendationRecord::error(entry, TickerError::Indicator(err.to_string()));
            }
        };

        let (row, quote) =
            match features::assemble(&frame, &series.closes(), self.config.min_observations) {
                Assembled::Ready { row, quote } => (row, quote),
                Assembled::InsufficientData { rows } => {
                    tracing::debug!(ticker = %entry.symbol, rows, "insufficient history");
                    return RecommendationRecord::insufficient_data(entry);
                }
            };

        match self.classifier.predict(&row) {
            Ok(class) => {
                let signal = Signal::from_class(class);
                tracing::debug!(ticker = %entry.symbol, class, signal = signal.as_str(), "classified");
                RecommendationRecord::signal(entry, signal, quote.latest_price, quote.change_pct)
            }
            Err(err) => {
                tracing::warn!(ticker = %entry.symbol, error = %err, "inference failed");
                RecommendationRecord::error(entry, err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::features::FeatureRow;
    use crate::domain::recommendation::Recommendation;
    use crate::indicators::tests::series_from_closes;
    use crate::ingest::types::PriceSeries;
    use crate::model::{ClassifierError, MockClassifier};
    use std::collections::HashMap;
    use std::time::Duration;

    enum Canned {
        Closes(Vec<f64>, Duration),
        Fail(&'static str),
    }

    struct StubSource {
        canned: HashMap<&'static str, Canned>,
    }

    #[async_trait::async_trait]
    impl PriceSource for StubSource {
        fn source_name(&self) -> &'static str {
            "stub"
        }

        async fn fetch_daily(&self, symbol: &str, _range: DateRange) -> anyhow::Result<PriceSeries> {
            match self.canned.get(symbol) {
                Some(Canned::Closes(closes, delay)) => {
                    tokio::time::sleep(*delay).await;
                    let mut series = series_from_closes(closes);
                    series.ticker = symbol.to_string();
                    Ok(series)
                }
                Some(Canned::Fail(msg)) => anyhow::bail!("{msg}"),
                None => Ok(PriceSeries::new(symbol, Vec::new())),
            }
        }
    }

    /// Buys on a clear 4-day rise, sells on a clear fall, holds otherwise.
    struct MomentumRule;

    impl Classifier for MomentumRule {
        fn predict(&self, row: &FeatureRow) -> Result<i64, ClassifierError> {
            let roc = row.get("roc").unwrap_or_default();
            Ok(if roc > 1.0 {
                2
            } else if roc < -1.0 {
                0
            } else {
                1
            })
        }
    }

    fn rising(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    fn config(tickers: &[(&str, &str)]) -> PipelineConfig {
        PipelineConfig {
            tickers: tickers
                .iter()
                .map(|(s, sector)| TickerEntry::new(*s, *sector))
                .collect(),
            history_start: NaiveDate::from_ymd_opt(2018, 1, 1).unwrap(),
            min_observations: MIN_OBSERVATIONS,
            concurrency: 4,
        }
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
    }

    fn find<'a>(set: &'a ResultSet, ticker: &str) -> &'a RecommendationRecord {
        set.records().iter().find(|r| r.ticker == ticker).unwrap()
    }

    #[tokio::test]
    async fn data_source_failure_is_isolated() {
        let source = StubSource {
            canned: HashMap::from([
                ("X", Canned::Fail("connection reset")),
                ("Y", Canned::Closes(rising(40), Duration::ZERO)),
            ]),
        };
        let mut classifier = MockClassifier::new();
        classifier.expect_predict().times(1).returning(|_| Ok(2));

        let pipeline = Pipeline::new(
            config(&[("X", "Tech"), ("Y", "Tech")]),
            Arc::new(source),
            Arc::new(classifier),
        );
        let set = pipeline.run(as_of()).await;

        let x = find(&set, "X");
        assert!(matches!(
            &x.recommendation,
            Recommendation::Error(TickerError::DataSource(msg)) if msg.contains("connection reset")
        ));
        assert_eq!(x.latest_price, None);

        let y = find(&set, "Y");
        assert_eq!(y.recommendation, Recommendation::Signal(Signal::Buy));
        assert_eq!(y.latest_price, Some(139.0));
        assert_eq!(y.change_pct, Some(0.72));
    }

    #[tokio::test]
    async fn short_or_empty_history_never_reaches_the_classifier() {
        let source = StubSource {
            canned: HashMap::from([("SHORT", Canned::Closes(rising(29), Duration::ZERO))]),
        };
        let mut classifier = MockClassifier::new();
        classifier.expect_predict().never();

        let pipeline = Pipeline::new(
            config(&[("SHORT", "A"), ("EMPTY", "A")]),
            Arc::new(source),
            Arc::new(classifier),
        );
        let set = pipeline.run(as_of()).await;

        for r in set.records() {
            assert_eq!(r.recommendation, Recommendation::InsufficientData, "{}", r.ticker);
            assert_eq!(r.latest_price, None);
            assert_eq!(r.change_pct, None);
        }
    }

    #[tokio::test]
    async fn inference_failure_does_not_abort_the_run() {
        let source = StubSource {
            canned: HashMap::from([
                ("A", Canned::Closes(rising(40), Duration::ZERO)),
                ("B", Canned::Closes(rising(50), Duration::ZERO)),
            ]),
        };
        let mut classifier = MockClassifier::new();
        classifier.expect_predict().returning(|row| {
            // Only the 50-bar series has volume 1049 on its last row.
            if row.get("Volume") == Some(1049.0) {
                Err(ClassifierError::Inference("shape mismatch".into()))
            } else {
                Ok(0)
            }
        });

        let pipeline = Pipeline::new(
            config(&[("A", "S"), ("B", "S")]),
            Arc::new(source),
            Arc::new(classifier),
        );
        let set = pipeline.run(as_of()).await;

        assert_eq!(find(&set, "A").recommendation, Recommendation::Signal(Signal::Sell));
        assert_eq!(
            find(&set, "B").recommendation,
            Recommendation::Error(TickerError::Inference("shape mismatch".into()))
        );
    }

    #[tokio::test]
    async fn unexpected_class_labels_map_to_sell() {
        let source = StubSource {
            canned: HashMap::from([("A", Canned::Closes(rising(40), Duration::ZERO))]),
        };
        let mut classifier = MockClassifier::new();
        classifier.expect_predict().returning(|_| Ok(7));

        let pipeline = Pipeline::new(config(&[("A", "S")]), Arc::new(source), Arc::new(classifier));
        let set = pipeline.run(as_of()).await;
        assert_eq!(set.records()[0].recommendation, Recommendation::Signal(Signal::Sell));
    }

    #[tokio::test]
    async fn flat_series_is_not_a_buy() {
        let source = StubSource {
            canned: HashMap::from([("FLAT", Canned::Closes(vec![50.0; 40], Duration::ZERO))]),
        };
        let pipeline = Pipeline::new(config(&[("FLAT", "S")]), Arc::new(source), Arc::new(MomentumRule));

        let entry = TickerEntry::new("FLAT", "S");
        let range = DateRange {
            start: pipeline.config().history_start,
            end: as_of(),
        };
        let record = pipeline.evaluate(&entry, range).await;
        assert_ne!(record.recommendation, Recommendation::Signal(Signal::Buy));
        assert_eq!(record.latest_price, Some(50.0));
        assert_eq!(record.change_pct, Some(0.0));

        let frame = indicators::compute(&series_from_closes(&[50.0; 40])).unwrap();
        let row = *features::feature_rows(&frame).last().unwrap();
        for name in ["MACD", "MACD_Signal", "Momentum", "roc", "bb_bandwidth", "adx"] {
            let v = row.get(name).unwrap();
            assert!(v.abs() < 1e-6, "{name} = {v}");
        }
        let rsi = row.get("RSI").unwrap();
        assert!((0.0..=100.0).contains(&rsi));
    }

    #[tokio::test]
    async fn zero_concurrency_still_evaluates_every_ticker() {
        let source = StubSource {
            canned: HashMap::from([
                ("A", Canned::Closes(rising(40), Duration::ZERO)),
                ("B", Canned::Closes(rising(40), Duration::ZERO)),
            ]),
        };
        let mut cfg = config(&[("A", "S"), ("B", "S")]);
        cfg.concurrency = 0;
        let pipeline = Pipeline::new(cfg, Arc::new(source), Arc::new(MomentumRule));

        let set = tokio::time::timeout(Duration::from_secs(5), pipeline.run(as_of()))
            .await
            .unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.summary().buy, 2);
    }

    #[tokio::test]
    async fn output_order_ignores_completion_order() {
        // The first registry entries finish last.
        let source = StubSource {
            canned: HashMap::from([
                ("B1", Canned::Closes(rising(40), Duration::from_millis(60))),
                ("A1", Canned::Closes(rising(40), Duration::from_millis(40))),
                ("A2", Canned::Closes(rising(40), Duration::from_millis(20))),
                ("A3", Canned::Closes(rising(40), Duration::ZERO)),
            ]),
        };
        let pipeline = Pipeline::new(
            config(&[("B1", "B"), ("A1", "A"), ("A2", "A"), ("A3", "A")]),
            Arc::new(source),
            Arc::new(MomentumRule),
        );
        let set = pipeline.run(as_of()).await;

        let tickers: Vec<_> = set.records().iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, ["A1", "A2", "A3", "B1"]);
    }
}
