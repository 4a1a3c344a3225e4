use axum::{
    extract::State,
    response::Html,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use signalboard_core::domain::recommendation::RecommendationRecord;
use signalboard_core::ingest::yahoo::YahooChartClient;
use signalboard_core::model::onnx::OnnxClassifier;
use signalboard_core::pipeline::{Pipeline, PipelineConfig};
use signalboard_core::report;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = signalboard_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    // The dashboard is useless without a classifier: refuse to start.
    let classifier = match OnnxClassifier::load(&settings.model_path) {
        Ok(c) => c,
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, path = %settings.model_path, "model load failed; not starting");
            return Err(e);
        }
    };

    let source = YahooChartClient::from_settings(&settings)?;
    let pipeline = Pipeline::new(
        PipelineConfig::from_settings(&settings),
        Arc::new(source),
        Arc::new(classifier),
    );

    let app = router(AppState { pipeline });

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "dashboard listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/recommendations", get(get_recommendations))
        .route("/healthz", get(healthz))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    pipeline: Pipeline,
}

#[derive(Debug, Serialize)]
struct ApiRecommendation {
    #[serde(flatten)]
    record: RecommendationRecord,
    display: String,
}

#[derive(Debug, Serialize)]
struct ApiRun {
    as_of_date: chrono::NaiveDate,
    generated_at: chrono::DateTime<chrono::Utc>,
    items: Vec<ApiRecommendation>,
}

async fn dashboard(State(state): State<AppState>) -> Html<String> {
    let as_of_date = chrono::Utc::now().date_naive();
    let results = state.pipeline.run(as_of_date).await;
    Html(report::html::render_page(&results, as_of_date))
}

async fn get_recommendations(State(state): State<AppState>) -> Json<ApiRun> {
    let as_of_date = chrono::Utc::now().date_naive();
    let results = state.pipeline.run(as_of_date).await;

    let items = results
        .records()
        .iter()
        .map(|r| ApiRecommendation {
            record: r.clone(),
            display: report::recommendation_label(&r.recommendation),
        })
        .collect();

    Json(ApiRun {
        as_of_date,
        generated_at: chrono::Utc::now(),
        items,
    })
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
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
