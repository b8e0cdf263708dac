use chrono::{Months, NaiveDate};

use super::super::config::CriteriaConfig;
use super::super::domain::{CandidateRecord, CompanyType, CriterionHit, CriterionKind};
use super::super::keywords::KeywordSet;

pub(crate) const MAX_SCORE: u8 = 100;

/// Compiled criteria table. Built once per run; evaluation is pure.
#[derive(Debug, Clone)]
pub(crate) struct CriteriaTable {
    role_weight: u8,
    role_keywords: KeywordSet,
    domain_terms: KeywordSet,
    target_titles: KeywordSet,
    company_weight: u8,
    company_types: Vec<CompanyType>,
    technology_weight: u8,
    technology: KeywordSet,
    openness_weight: u8,
    openness: KeywordSet,
    location_weight: u8,
    hubs: KeywordSet,
    publication_weight: u8,
    publication_topics: KeywordSet,
    publication_cutoff: NaiveDate,
}

impl CriteriaTable {
    pub(crate) fn new(criteria: &CriteriaConfig, as_of: NaiveDate) -> Self {
        let publication = &criteria.recent_publication;
        let publication_cutoff = as_of
            .checked_sub_months(Months::new(publication.recency_months))
            .unwrap_or(NaiveDate::MIN);

        Self {
            role_weight: criteria.role_relevance.weight,
            role_keywords: KeywordSet::new(&criteria.role_relevance.keywords),
            domain_terms: KeywordSet::new(&criteria.role_relevance.domain_terms),
            target_titles: KeywordSet::new(&criteria.role_relevance.target_titles),
            company_weight: criteria.company_type.weight,
            company_types: criteria.company_type.types.clone(),
            technology_weight: criteria.technology_match.weight,
            technology: KeywordSet::new(&criteria.technology_match.keywords),
            openness_weight: criteria.openness_signal.weight,
            openness: KeywordSet::new(&criteria.openness_signal.keywords),
            location_weight: criteria.location.weight,
            hubs: KeywordSet::new(&criteria.location.hubs),
            publication_weight: publication.weight,
            publication_topics: KeywordSet::new(&publication.topics),
            publication_cutoff,
        }
    }

    pub(crate) fn publication_cutoff(&self) -> NaiveDate {
        self.publication_cutoff
    }

    /// Hits in criteria-table order. Zero-weight criteria never appear.
    pub(crate) fn evaluate(&self, record: &CandidateRecord) -> Vec<CriterionHit> {
        let text = record.record_text();
        let mut hits = Vec::new();

        let mut award = |criterion: CriterionKind, weight: u8, evidence: Option<String>| {
            if let (true, Some(evidence)) = (weight > 0, evidence) {
                hits.push(CriterionHit {
                    criterion,
                    points: weight,
                    evidence,
                });
            }
        };

        award(
            CriterionKind::RoleRelevance,
            self.role_weight,
            self.role_evidence(record, &text),
        );
        award(
            CriterionKind::CompanyType,
            self.company_weight,
            record
                .company_type
                .filter(|kind| self.company_types.contains(kind))
                .map(|kind| format!("company type {}", kind.label())),
        );
        award(
            CriterionKind::TechnologyMatch,
            self.technology_weight,
            self.technology
                .find(&text)
                .map(|keyword| format!("mentions '{keyword}'")),
        );
        award(
            CriterionKind::OpennessSignal,
            self.openness_weight,
            self.openness
                .find(&text)
                .map(|keyword| format!("mentions '{keyword}'")),
        );
        award(
            CriterionKind::Location,
            self.location_weight,
            self.location_evidence(record),
        );
        award(
            CriterionKind::RecentPublication,
            self.publication_weight,
            self.publication_evidence(record),
        );

        hits
    }

    fn role_evidence(&self, record: &CandidateRecord, text: &str) -> Option<String> {
        let title = record.title.as_deref()?;
        if let Some(target) = self.target_titles.find(title) {
            return Some(format!("title matches '{target}'"));
        }

        let keyword = self.role_keywords.find(title)?;
        if self.domain_terms.is_empty() {
            return Some(format!("title keyword '{keyword}'"));
        }
        self.domain_terms
            .find(text)
            .map(|term| format!("title keyword '{keyword}' with domain term '{term}'"))
    }

    fn location_evidence(&self, record: &CandidateRecord) -> Option<String> {
        let places = [
            ("person location", record.person_location.as_deref()),
            ("company hq", record.company_hq.as_deref()),
        ];
        places.into_iter().find_map(|(label, place)| {
            self.hubs
                .find(place?)
                .map(|hub| format!("hub '{hub}' in {label}"))
        })
    }

    fn publication_evidence(&self, record: &CandidateRecord) -> Option<String> {
        record.publications.iter().find_map(|publication| {
            let date = publication.published_on?;
            if date < self.publication_cutoff {
                return None;
            }

            if self.publication_topics.is_empty() {
                return Some(format!("publication dated {date}"));
            }
            let subject = [publication.topic.as_deref(), publication.title.as_deref()]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" ");
            self.publication_topics
                .find(&subject)
                .map(|topic| format!("publication dated {date} on '{topic}'"))
        })
    }
}

/// Sum of awarded points, clamped to the score ceiling.
pub(crate) fn total_points(hits: &[CriterionHit]) -> u8 {
    let sum: u32 = hits.iter().map(|hit| u32::from(hit.points)).sum();
    sum.min(u32::from(MAX_SCORE)) as u8
}
