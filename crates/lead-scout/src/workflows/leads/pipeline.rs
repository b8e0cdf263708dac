use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::config::LeadScoringConfig;
use super::domain::{CandidateRecord, Confidence, RawRecord, WorkMode};
use super::enrichment::company::CompanyLookup;
use super::enrichment::EnrichmentEngine;
use super::export::LeadRow;
use super::keywords::normalize_text;
use super::ranking::{rank_records, PriorityTier, RankedLead};
use super::scoring::{ensure_judge_available, LeadJudge, ScoringEngine, ScoringPolicy};
use super::validation::RecordValidator;
use crate::config::ConfigError;

/// Validation, de-duplication, enrichment, scoring and ranking in one pass.
#[derive(Clone)]
pub struct LeadPipeline {
    config: LeadScoringConfig,
    validator: RecordValidator,
    enrichment: EnrichmentEngine,
    judge: Option<Arc<dyn LeadJudge>>,
}

/// Raw record rejected by the validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedRecord {
    /// Position in the input batch, starting at 0.
    pub index: usize,
    pub name: Option<String>,
    pub field: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub as_of: NaiveDate,
    pub policy: ScoringPolicy,
    pub input: usize,
    pub validated: usize,
    pub dropped: Vec<DroppedRecord>,
    pub duplicates_merged: usize,
    pub judge_fallbacks: usize,
    pub ranked: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRun {
    pub leads: Vec<RankedLead>,
    pub summary: RunSummary,
}

impl PipelineRun {
    pub fn rows(&self) -> Vec<LeadRow> {
        self.leads.iter().map(RankedLead::to_row).collect()
    }
}

impl LeadPipeline {
    /// Pipeline over the configured company reference set, without a judge.
    pub fn new(config: LeadScoringConfig) -> Result<Self, ConfigError> {
        Self::with_collaborators(config, None, None)
    }

    pub fn with_judge(
        config: LeadScoringConfig,
        judge: Arc<dyn LeadJudge>,
    ) -> Result<Self, ConfigError> {
        Self::with_collaborators(config, None, Some(judge))
    }

    /// `lookup` replaces the configured company table when given.
    pub fn with_collaborators(
        config: LeadScoringConfig,
        lookup: Option<Arc<dyn CompanyLookup>>,
        judge: Option<Arc<dyn LeadJudge>>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        ensure_judge_available(config.scoring.policy, judge.is_some())?;

        let enrichment = match lookup {
            Some(lookup) => EnrichmentEngine::with_lookup(&config.enrichment, lookup),
            None => EnrichmentEngine::from_config(&config),
        };

        Ok(Self {
            config,
            validator: RecordValidator::new(),
            enrichment,
            judge,
        })
    }

    pub fn config(&self) -> &LeadScoringConfig {
        &self.config
    }

    pub fn run(&self, raw_records: &[RawRecord], as_of: NaiveDate) -> PipelineRun {
        let policy = self.config.scoring.policy;
        info!(
            records = raw_records.len(),
            %as_of,
            policy = policy.label(),
            "lead scoring run started"
        );

        let (validated, dropped) = self.validate_all(raw_records);
        let validated_count = validated.len();
        info!(validated = validated_count, dropped = dropped.len(), "validation finished");

        let (candidates, duplicates_merged) = if self.config.ranking.deduplicate {
            deduplicate(validated)
        } else {
            (validated, 0)
        };
        if duplicates_merged > 0 {
            info!(duplicates_merged, "duplicate candidates merged");
        }

        let enriched: Vec<CandidateRecord> = candidates
            .into_iter()
            .map(|record| self.enrichment.enrich(record))
            .collect();
        info!(records = enriched.len(), "enrichment finished");

        let scoring = ScoringEngine::assemble(&self.config, as_of, self.judge.clone());
        let mut judge_fallbacks = 0;
        let scored = enriched
            .iter()
            .map(|record| {
                let evaluation = scoring.evaluate(record);
                if evaluation.judge_failure.is_some() {
                    judge_fallbacks += 1;
                }
                evaluation.scored
            })
            .collect();

        let leads = rank_records(scored, &self.config.ranking, &self.config.priority);
        let tier_count =
            |tier: PriorityTier| leads.iter().filter(|lead| lead.priority == tier).count();

        let summary = RunSummary {
            as_of,
            policy,
            input: raw_records.len(),
            validated: validated_count,
            dropped,
            duplicates_merged,
            judge_fallbacks,
            ranked: leads.len(),
            high: tier_count(PriorityTier::High),
            medium: tier_count(PriorityTier::Medium),
            low: tier_count(PriorityTier::Low),
        };
        info!(
            ranked = summary.ranked,
            high = summary.high,
            medium = summary.medium,
            low = summary.low,
            judge_fallbacks,
            "lead scoring run finished"
        );

        PipelineRun { leads, summary }
    }

    fn validate_all(
        &self,
        raw_records: &[RawRecord],
    ) -> (Vec<CandidateRecord>, Vec<DroppedRecord>) {
        let mut validated = Vec::with_capacity(raw_records.len());
        let mut dropped = Vec::new();

        for (index, raw) in raw_records.iter().enumerate() {
            match self.validator.validate(raw) {
                Ok(record) => validated.push(record),
                Err(error) => {
                    let name = raw
                        .get("name")
                        .and_then(Value::as_str)
                        .map(str::trim)
                        .filter(|name| !name.is_empty())
                        .map(str::to_string);
                    warn!(index, name = name.as_deref().unwrap_or(""), %error, "record dropped");
                    dropped.push(DroppedRecord {
                        index,
                        name,
                        field: error.field().to_string(),
                        reason: error.to_string(),
                    });
                }
            }
        }

        (validated, dropped)
    }
}

/// Collapse records sharing a normalized name. The first occurrence keeps its
/// position; the variant with more publications supplies the data and the
/// other variant fills whatever it leaves unset.
fn deduplicate(records: Vec<CandidateRecord>) -> (Vec<CandidateRecord>, usize) {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut kept: Vec<CandidateRecord> = Vec::with_capacity(records.len());
    let mut merged = 0;

    for record in records {
        let key = normalize_text(&record.name);
        match positions.get(&key) {
            Some(&position) => {
                merged += 1;
                debug!(name = %record.name, "duplicate candidate");
                let current = &mut kept[position];
                if record.publications.len() > current.publications.len() {
                    let previous = std::mem::replace(current, record);
                    fill_gaps(current, previous);
                } else {
                    fill_gaps(current, record);
                }
            }
            None => {
                positions.insert(key, kept.len());
                kept.push(record);
            }
        }
    }

    (kept, merged)
}

/// Copy what `target` lacks from a merged duplicate. Publications stay with
/// `target`; a verified email beats an inferred one.
fn fill_gaps(target: &mut CandidateRecord, donor: CandidateRecord) {
    fn fill<T>(slot: &mut Option<T>, value: Option<T>) {
        if slot.is_none() {
            *slot = value;
        }
    }

    fill(&mut target.title, donor.title);
    fill(&mut target.company, donor.company);
    fill(&mut target.person_location, donor.person_location);
    fill(&mut target.company_hq, donor.company_hq);
    fill(&mut target.company_type, donor.company_type);
    fill(&mut target.company_domain, donor.company_domain);
    fill(&mut target.about, donor.about);
    fill(&mut target.profile_url, donor.profile_url);

    if target.work_mode == WorkMode::Unknown && donor.work_mode != WorkMode::Unknown {
        target.work_mode = donor.work_mode;
        target.work_mode_confidence = donor.work_mode_confidence;
    }

    let upgrade = match (&target.email, &donor.email) {
        (None, Some(_)) => true,
        (Some(kept), Some(other)) => {
            kept.confidence == Confidence::Inferred && other.confidence == Confidence::Verified
        }
        _ => false,
    };
    if upgrade {
        target.email = donor.email;
    }
}
