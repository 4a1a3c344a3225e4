use anyhow::Context;
use clap::Parser;
use signalboard_core::model::onnx::OnnxClassifier;
use signalboard_core::ingest::yahoo::YahooChartClient;
use signalboard_core::pipeline::{Pipeline, PipelineConfig};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod universe;

#[derive(Debug, Parser)]
#[command(name = "signalboard_worker")]
struct Args {
    /// End of the fetched price range (YYYY-MM-DD, exclusive). Defaults to today's UTC date.
    #[arg(long)]
    as_of_date: Option<String>,

    /// Only evaluate these tickers (repeatable).
    #[arg(long = "only")]
    only: Vec<String>,

    /// Only evaluate tickers of this sector.
    #[arg(long)]
    sector: Option<String>,

    /// Print records as JSON instead of text tables.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = signalboard_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    let as_of_date = resolve_as_of_date(args.as_of_date.as_deref())?;

    let filter = universe::UniverseFilter {
        only: args.only,
        sector: args.sector,
    };
    let tickers = universe::select(signalboard_core::domain::ticker::default_registry(), &filter)?;

    // Without a model there is nothing to show; fail before touching any ticker.
    let classifier = match OnnxClassifier::load(&settings.model_path) {
        Ok(c) => c,
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %err, path = %settings.model_path, "model load failed");
            return Err(err);
        }
    };

    let source = YahooChartClient::from_settings(&settings)?;
    let config = PipelineConfig::from_settings(&settings).with_tickers(tickers);
    let pipeline = Pipeline::new(config, Arc::new(source), Arc::new(classifier));

    tracing::info!(
        %as_of_date,
        tickers = pipeline.config().tickers.len(),
        concurrency = pipeline.config().concurrency,
        "starting recommendation run"
    );
    let results = pipeline.run(as_of_date).await;

    if args.json {
        let json = serde_json::to_string_pretty(results.records())
            .context("failed to serialize recommendation records")?;
        println!("{json}");
    } else {
        print!("{}", signalboard_core::report::text::render(&results));
    }

    Ok(())
}

fn init_sentry(settings: &signalboard_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

fn resolve_as_of_date(as_of_date_arg: Option<&str>) -> anyhow::Result<chrono::NaiveDate> {
    if let Some(s) = as_of_date_arg {
        return chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("--as-of-date must be YYYY-MM-DD (got {s})"));
    }
    Ok(chrono::Utc::now().date_naive())
}
