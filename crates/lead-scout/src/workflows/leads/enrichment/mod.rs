//! Deterministic gap filling for validated records.
//!
//! Company metadata runs first so a looked-up domain can drive email
//! inference. Nothing already present on a record is replaced.

pub mod company;
pub mod email;
pub mod work_mode;

use std::sync::Arc;

use tracing::debug;

use self::company::{CompanyDirectory, CompanyLookup, LookupResult, TimedLookup};
use self::email::EmailInference;
use self::work_mode::WorkModeInference;
use super::config::{EnrichmentConfig, LeadScoringConfig};
use super::domain::{CandidateRecord, Confidence, ContactEmail, WorkMode};

pub use self::company::CompanyProfile;
pub use self::email::is_valid_email;

#[derive(Clone)]
pub struct EnrichmentEngine {
    lookup: Arc<dyn CompanyLookup>,
    email: EmailInference,
    work_mode: WorkModeInference,
}

impl EnrichmentEngine {
    /// Engine backed by the configured `companies` reference set.
    pub fn from_config(config: &LeadScoringConfig) -> Self {
        Self::with_inline_lookup(
            &config.enrichment,
            Arc::new(CompanyDirectory::new(&config.companies)),
        )
    }

    /// External collaborator; every call is bounded by `lookup_timeout_ms`.
    pub fn with_lookup(config: &EnrichmentConfig, lookup: Arc<dyn CompanyLookup>) -> Self {
        let timed = TimedLookup::new(lookup, config.lookup_timeout());
        Self::with_inline_lookup(config, Arc::new(timed))
    }

    /// Queries `lookup` on the calling thread, without a timeout.
    pub(crate) fn with_inline_lookup(
        config: &EnrichmentConfig,
        lookup: Arc<dyn CompanyLookup>,
    ) -> Self {
        Self {
            lookup,
            email: EmailInference::new(config),
            work_mode: WorkModeInference::new(config),
        }
    }

    pub fn enrich(&self, mut record: CandidateRecord) -> CandidateRecord {
        self.fill_company(&mut record);
        self.fill_email(&mut record);
        self.fill_work_mode(&mut record);
        record
    }

    fn fill_company(&self, record: &mut CandidateRecord) {
        let complete = record.company_type.is_some()
            && record.company_hq.is_some()
            && record.company_domain.is_some();
        if complete {
            return;
        }
        let Some(company) = record.company.as_deref() else {
            return;
        };

        match self.lookup.lookup(company) {
            LookupResult::Found(profile) => {
                debug!(name = %record.name, company, "company metadata found");
                if record.company_type.is_none() {
                    record.company_type = profile.company_type;
                }
                if record.company_hq.is_none() {
                    record.company_hq = profile.hq;
                }
                if record.company_domain.is_none() {
                    record.company_domain = profile.domain;
                }
            }
            LookupResult::Unknown => {
                debug!(name = %record.name, company, "company not in reference set");
            }
        }
    }

    fn fill_email(&self, record: &mut CandidateRecord) {
        if record.email.is_some() {
            return;
        }
        if let Some(address) = self.email.infer(record) {
            debug!(name = %record.name, email = %address, "email inferred");
            record.email = Some(ContactEmail::inferred(address));
        }
    }

    fn fill_work_mode(&self, record: &mut CandidateRecord) {
        if record.work_mode != WorkMode::Unknown {
            return;
        }
        let inferred = self.work_mode.infer(record);
        if inferred != WorkMode::Unknown {
            debug!(name = %record.name, work_mode = inferred.label(), "work mode inferred");
            record.work_mode = inferred;
            record.work_mode_confidence = Some(Confidence::Inferred);
        }
    }
}
