pub mod domain;
pub mod features;
pub mod indicators;
pub mod ingest;
pub mod model;
pub mod pipeline;
pub mod report;

pub mod config {
    use anyhow::Context;
    use chrono::NaiveDate;

    const DEFAULT_MODEL_PATH: &str = "modelo_nvda_multiclase.onnx";
    const DEFAULT_PRICE_SOURCE_BASE_URL: &str = "https://query1.finance.yahoo.com";
    const DEFAULT_PRICE_SOURCE_TIMEOUT_SECS: u64 = 30;
    const DEFAULT_HISTORY_START: &str = "2018-01-01";
    const DEFAULT_FETCH_CONCURRENCY: usize = 4;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub model_path: String,
        pub price_source_base_url: String,
        pub price_source_timeout_secs: u64,
        pub history_start: NaiveDate,
        pub fetch_concurrency: usize,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let history_start = std::env::var("HISTORY_START")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_HISTORY_START.to_string());
            let history_start = NaiveDate::parse_from_str(history_start.trim(), "%Y-%m-%d")
                .with_context(|| format!("HISTORY_START must be YYYY-MM-DD (got {history_start})"))?;

            let fetch_concurrency = std::env::var("FETCH_CONCURRENCY")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(DEFAULT_FETCH_CONCURRENCY);
            anyhow::ensure!(fetch_concurrency >= 1, "FETCH_CONCURRENCY must be >= 1");

            Ok(Self {
                model_path: std::env::var("MODEL_PATH")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_MODEL_PATH.to_string()),
                price_source_base_url: std::env::var("PRICE_SOURCE_BASE_URL")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_PRICE_SOURCE_BASE_URL.to_string()),
                price_source_timeout_secs: std::env::var("PRICE_SOURCE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(DEFAULT_PRICE_SOURCE_TIMEOUT_SECS),
                history_start,
                fetch_concurrency,
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }
    }
}
