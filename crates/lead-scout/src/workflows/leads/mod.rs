//! Lead qualification: schema validation, enrichment, weighted scoring,
//! ranking and export of discovered candidates.

pub mod config;
pub mod domain;
pub mod enrichment;
pub mod export;
pub mod filter;
pub(crate) mod keywords;
pub mod pipeline;
pub mod ranking;
pub mod scoring;
pub(crate) mod timeout;
pub mod validation;

#[cfg(test)]
mod tests;

pub use config::{
    CompanyEntry, CriteriaConfig, EnrichmentConfig, LeadScoringConfig, PriorityThresholds,
    RankingConfig, ScoringSection,
};
pub use domain::{
    CandidateRecord, CompanyType, Confidence, ContactEmail, CriterionHit, CriterionKind,
    Publication, RawRecord, ScoreSource, ScoredRecord, WorkMode,
};
pub use enrichment::company::{
    CompanyDirectory, CompanyLookup, CompanyProfile, LookupResult, TimedLookup,
};
pub use enrichment::EnrichmentEngine;
pub use export::{ExportError, ExportFormat, LeadRow, LEAD_COLUMNS};
pub use filter::LeadFilter;
pub use pipeline::{DroppedRecord, LeadPipeline, PipelineRun, RunSummary};
pub use ranking::{rank_records, PriorityTier, RankedLead};
pub use scoring::{
    Evaluation, JudgeError, JudgeLoadError, LeadJudge, PrecomputedJudge, ScoringEngine,
    ScoringPolicy,
};
pub use validation::{RecordValidator, ValidationError};
