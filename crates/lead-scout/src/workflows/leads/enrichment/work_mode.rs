use super::super::config::EnrichmentConfig;
use super::super::domain::{CandidateRecord, WorkMode};
use super::super::keywords::KeywordSet;

/// Keyword-driven work arrangement guess. Remote signals beat onsite ones.
#[derive(Debug, Clone)]
pub struct WorkModeInference {
    remote: KeywordSet,
    onsite: KeywordSet,
}

impl WorkModeInference {
    pub fn new(config: &EnrichmentConfig) -> Self {
        Self {
            remote: KeywordSet::new(&config.remote_keywords),
            onsite: KeywordSet::new(&config.onsite_keywords),
        }
    }

    pub fn infer(&self, record: &CandidateRecord) -> WorkMode {
        let text = [
            record.person_location.as_deref(),
            record.title.as_deref(),
            record.about.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

        if self.remote.matches(&text) {
            WorkMode::Remote
        } else if self.onsite.matches(&text) {
            WorkMode::Onsite
        } else {
            WorkMode::Unknown
        }
    }
}
