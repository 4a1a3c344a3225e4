use crate::config::Settings;
use crate::ingest::provider::PriceSource;
use crate::ingest::types::{DateRange, PriceBar, PriceSeries};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime};
use serde::Deserialize;
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Daily bars from the Yahoo Finance chart endpoint.
#[derive(Debug, Clone)]
pub struct YahooChartClient {
    http: reqwest::Client,
    base_url: String,
}

impl YahooChartClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(settings.price_source_timeout_secs))
            .build()
            .context("failed to build price source http client")?;

        Ok(Self {
            http,
            base_url: settings.price_source_base_url.clone(),
        })
    }

    fn url(&self, symbol: &str) -> String {
        format!(
            "{}/v8/finance/chart/{}",
            self.base_url.trim_end_matches('/'),
            symbol
        )
    }
}

#[async_trait::async_trait]
impl PriceSource for YahooChartClient {
    fn source_name(&self) -> &'static str {
        "yahoo_chart"
    }

    async fn fetch_daily(&self, symbol: &str, range: DateRange) -> Result<PriceSeries> {
        let params = [
            ("interval", "1d".to_string()),
            ("period1", unix_midnight(range.start).to_string()),
            ("period2", unix_midnight(range.end).to_string()),
        ];

        let res = self
            .http
            .get(self.url(symbol))
            .query(&params)
            .send()
            .await
            .context("price source request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read price source response")?;

        // Yahoo reports unknown symbols as 404 with a chart.error body; prefer that message.
        let parsed = serde_json::from_str::<ChartResponse>(&text);
        if !status.is_success() {
            if let Some(err) = parsed.as_ref().ok().and_then(|p| p.chart.error.as_ref()) {
                anyhow::bail!("chart API HTTP {status}: {} - {}", err.code, err.description);
            }
            anyhow::bail!("chart API HTTP {status}: {text}");
        }

        let parsed = parsed.with_context(|| format!("chart API response is not valid JSON: {text}"))?;
        parse_chart(symbol, parsed)
    }
}

fn unix_midnight(d: NaiveDate) -> i64 {
    d.and_time(NaiveTime::MIN).and_utc().timestamp()
}

fn parse_chart(symbol: &str, resp: ChartResponse) -> Result<PriceSeries> {
    if let Some(err) = resp.chart.error {
        anyhow::bail!("chart API error: {} - {}", err.code, err.description);
    }

    let Some(result) = resp.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(PriceSeries::new(symbol, Vec::new()));
    };
    let Some(quote) = result.indicators.quote.into_iter().next() else {
        return Ok(PriceSeries::new(symbol, Vec::new()));
    };
    let Some(closes) = quote.close else {
        return Ok(PriceSeries::new(symbol, Vec::new()));
    };

    let mut bars = Vec::with_capacity(result.timestamp.len());
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let Some(close) = closes.get(i).copied().flatten().filter(|v| v.is_finite()) else {
            continue;
        };
        let date = DateTime::from_timestamp(ts, 0)
            .with_context(|| format!("invalid bar timestamp {ts}"))?
            .date_naive();

        bars.push(PriceBar {
            date,
            open: pick(&quote.open, i).unwrap_or(close),
            high: pick(&quote.high, i).unwrap_or(close),
            low: pick(&quote.low, i).unwrap_or(close),
            close,
            volume: pick(&quote.volume, i).unwrap_or(0.0),
        });
    }

    Ok(PriceSeries::new(symbol, bars))
}

fn pick(column: &Option<Vec<Option<f64>>>, i: usize) -> Option<f64> {
    column
        .as_ref()
        .and_then(|c| c.get(i).copied().flatten())
        .filter(|v| v.is_finite())
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Option<Vec<Option<f64>>>,
    #[serde(default)]
    high: Option<Vec<Option<f64>>>,
    #[serde(default)]
    low: Option<Vec<Option<f64>>>,
    #[serde(default)]
    close: Option<Vec<Option<f64>>>,
    #[serde(default)]
    volume: Option<Vec<Option<f64>>>,
}
