mod judge;
mod policy;
mod rules;

pub use judge::{JudgeError, JudgeLoadError, LeadJudge, PrecomputedJudge, TimedJudge};
pub use policy::ScoringPolicy;

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::config::LeadScoringConfig;
use super::domain::{CandidateRecord, ScoredRecord};
use crate::config::ConfigError;
use judge::normalize_judge_score;
use rules::{total_points, CriteriaTable};

pub(crate) fn ensure_judge_available(
    policy: ScoringPolicy,
    has_judge: bool,
) -> Result<(), ConfigError> {
    if policy.requires_judge() && !has_judge {
        return Err(ConfigError::invalid(
            "scoring.policy",
            format!("policy '{}' needs a judge but none is configured", policy.label()),
        ));
    }
    Ok(())
}

/// Weighted-criteria scorer for one run; all inputs fixed at construction.
#[derive(Clone)]
pub struct ScoringEngine {
    table: CriteriaTable,
    policy: ScoringPolicy,
    judge: Option<TimedJudge>,
    as_of: NaiveDate,
}

/// Scored record plus any judge failure met along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub scored: ScoredRecord,
    pub judge_failure: Option<JudgeError>,
}

impl ScoringEngine {
    /// Rule-only engine; the configured policy must not need a judge.
    pub fn new(config: &LeadScoringConfig, as_of: NaiveDate) -> Result<Self, ConfigError> {
        Self::with_judge(config, as_of, None)
    }

    pub fn with_judge(
        config: &LeadScoringConfig,
        as_of: NaiveDate,
        judge: Option<Arc<dyn LeadJudge>>,
    ) -> Result<Self, ConfigError> {
        ensure_judge_available(config.scoring.policy, judge.is_some())?;
        Ok(Self::assemble(config, as_of, judge))
    }

    /// Construction without the policy check; callers ran
    /// [`ensure_judge_available`] already.
    pub(crate) fn assemble(
        config: &LeadScoringConfig,
        as_of: NaiveDate,
        judge: Option<Arc<dyn LeadJudge>>,
    ) -> Self {
        let policy = config.scoring.policy;
        Self {
            table: CriteriaTable::new(&config.criteria, as_of),
            policy,
            judge: judge
                .filter(|_| policy.requires_judge())
                .map(|judge| TimedJudge::new(judge, config.scoring.judge_timeout())),
            as_of,
        }
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    pub fn policy(&self) -> ScoringPolicy {
        self.policy
    }

    /// Earliest publication date that still counts as recent.
    pub fn publication_cutoff(&self) -> NaiveDate {
        self.table.publication_cutoff()
    }

    pub fn score(&self, record: &CandidateRecord) -> ScoredRecord {
        self.evaluate(record).scored
    }

    pub fn evaluate(&self, record: &CandidateRecord) -> Evaluation {
        let contributions = self.table.evaluate(record);
        let rule_score = total_points(&contributions);

        let judged = self.judge.as_ref().map(|judge| {
            judge
                .judge(record)
                .and_then(normalize_judge_score)
        });
        let resolution = policy::resolve(self.policy, rule_score, judged);

        if let Some(error) = &resolution.judge_failure {
            warn!(name = %record.name, %error, rule_score, "judge failed; using rule score");
        }
        debug!(
            name = %record.name,
            rule_score,
            score = resolution.score,
            source = resolution.source.label(),
            criteria = contributions.len(),
            "record scored"
        );

        Evaluation {
            scored: ScoredRecord {
                record: record.clone(),
                score: resolution.score,
                contributions,
                source: resolution.source,
            },
            judge_failure: resolution.judge_failure,
        }
    }
}
