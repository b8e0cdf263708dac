use chrono::NaiveDate;
use lead_scout::config::{load_scoring_file, AppConfig};
use lead_scout::error::AppError;
use lead_scout::workflows::leads::{
    LeadJudge, LeadPipeline, LeadScoringConfig, PrecomputedJudge, ScoringPolicy,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) pipeline: Arc<LeadPipeline>,
}

/// Overrides applied on top of the file or default scoring configuration.
#[derive(Debug, Default)]
pub(crate) struct ScoringOverrides<'a> {
    pub(crate) config_path: Option<&'a Path>,
    pub(crate) policy: Option<ScoringPolicy>,
    pub(crate) top_n: Option<usize>,
}

/// Scoring configuration from `--config`, else `LEAD_SCOUT_CONFIG`, else defaults.
pub(crate) fn resolve_scoring(
    app: &AppConfig,
    overrides: &ScoringOverrides<'_>,
) -> Result<LeadScoringConfig, AppError> {
    let mut scoring = match overrides.config_path {
        Some(path) => load_scoring_file(path)?,
        None => app.scoring()?,
    };

    if let Some(policy) = overrides.policy {
        scoring.scoring.policy = policy;
    }
    if overrides.top_n.is_some() {
        scoring.ranking.top_n = overrides.top_n;
    }
    scoring.validate()?;
    Ok(scoring)
}

pub(crate) fn build_pipeline(
    scoring: LeadScoringConfig,
    judge_scores: Option<&Path>,
) -> Result<LeadPipeline, AppError> {
    let judge = match judge_scores {
        Some(path) => {
            let judge = PrecomputedJudge::from_path(path)?;
            info!(path = %path.display(), scores = judge.len(), "judge scores loaded");
            Some(Arc::new(judge) as Arc<dyn LeadJudge>)
        }
        None => None,
    };

    Ok(LeadPipeline::with_collaborators(scoring, None, judge)?)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_policy(raw: &str) -> Result<ScoringPolicy, String> {
    ScoringPolicy::parse(raw)
        .ok_or_else(|| format!("unknown policy '{raw}' (rules, judge, highest)"))
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}
