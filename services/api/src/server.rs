use crate::cli::ServeArgs;
use crate::infra::{build_pipeline, resolve_scoring, AppState, ScoringOverrides};
use crate::routes::lead_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use lead_scout::config::AppConfig;
use lead_scout::error::AppError;
use lead_scout::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let scoring = resolve_scoring(
        &config,
        &ScoringOverrides {
            config_path: args.config.as_deref(),
            ..ScoringOverrides::default()
        },
    )?;
    let policy = scoring.scoring.policy;
    let pipeline = build_pipeline(scoring, args.judge_scores.as_deref())?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        pipeline: Arc::new(pipeline),
    };

    let app = lead_routes()
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, policy = policy.label(), "lead scout service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
