use crate::infra::{deserialize_optional_date, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::{Local, NaiveDate};
use lead_scout::error::AppError;
use lead_scout::workflows::intake::{IntakeFormat, LeadIntake};
use lead_scout::workflows::leads::{LeadFilter, LeadRow, RunSummary};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::Cursor;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ScoreLeadsRequest {
    /// Raw records as JSON objects.
    #[serde(default)]
    pub(crate) records: Option<Vec<Value>>,
    /// Raw records as CSV text with a header row.
    #[serde(default)]
    pub(crate) csv: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) as_of: Option<NaiveDate>,
    /// Applied to the ranked rows before they are returned.
    #[serde(default)]
    pub(crate) filter: Option<LeadFilter>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ScoreLeadsResponse {
    pub(crate) as_of: NaiveDate,
    pub(crate) summary: RunSummary,
    pub(crate) returned: usize,
    pub(crate) leads: Vec<LeadRow>,
}

pub(crate) fn lead_routes() -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/leads/score",
            axum::routing::post(score_leads_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn score_leads_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<ScoreLeadsRequest>,
) -> Result<Json<ScoreLeadsResponse>, AppError> {
    let ScoreLeadsRequest {
        records,
        csv,
        as_of,
        filter,
    } = payload;

    let raw_records = match (records, csv) {
        (Some(records), None) => LeadIntake::from_json(Value::Array(records))?,
        (None, Some(csv)) => {
            LeadIntake::from_reader(Cursor::new(csv.into_bytes()), IntakeFormat::Csv)?
        }
        (Some(_), Some(_)) => {
            return Err(AppError::Input(
                "send either 'records' or 'csv', not both".to_string(),
            ))
        }
        (None, None) => {
            return Err(AppError::Input(
                "request needs 'records' or 'csv'".to_string(),
            ))
        }
    };

    let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
    let pipeline = state.pipeline.clone();
    let run = tokio::task::spawn_blocking(move || pipeline.run(&raw_records, as_of))
        .await
        .map_err(|err| AppError::Server(axum::Error::new(err)))?;

    let rows = run.rows();
    let leads: Vec<LeadRow> = match &filter {
        Some(filter) => filter.apply(&rows).into_iter().cloned().collect(),
        None => rows,
    };
    info!(
        ranked = run.summary.ranked,
        returned = leads.len(),
        dropped = run.summary.dropped.len(),
        "lead scoring request served"
    );

    Ok(Json(ScoreLeadsResponse {
        as_of,
        returned: leads.len(),
        summary: run.summary,
        leads,
    }))
}
