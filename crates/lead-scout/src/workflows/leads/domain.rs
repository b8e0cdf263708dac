use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Untyped record as handed over by the collection layer.
///
/// Only the validator reads this shape; everything downstream works on
/// [`CandidateRecord`].
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Where the professional does their work, when known.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkMode {
    Remote,
    Onsite,
    #[default]
    Unknown,
}

impl WorkMode {
    pub const fn label(self) -> &'static str {
        match self {
            WorkMode::Remote => "Remote",
            WorkMode::Onsite => "Onsite",
            WorkMode::Unknown => "Unknown",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "remote" => Some(Self::Remote),
            "onsite" | "on-site" | "on site" => Some(Self::Onsite),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

/// Whether a value was observed in the source data or produced by a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Verified,
    Inferred,
}

impl Confidence {
    pub const fn label(self) -> &'static str {
        match self {
            Confidence::Verified => "verified",
            Confidence::Inferred => "inferred",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "verified" => Some(Self::Verified),
            "inferred" => Some(Self::Inferred),
            _ => None,
        }
    }
}

/// Business email plus how much it can be trusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactEmail {
    pub address: String,
    pub confidence: Confidence,
}

impl ContactEmail {
    pub fn verified(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            confidence: Confidence::Verified,
        }
    }

    pub fn inferred(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            confidence: Confidence::Inferred,
        }
    }
}

/// Coarse organisation classification used by the company-type criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompanyType {
    Pharma,
    Biotech,
    Academic,
    Other,
}

impl CompanyType {
    pub const fn label(self) -> &'static str {
        match self {
            CompanyType::Pharma => "pharma",
            CompanyType::Biotech => "biotech",
            CompanyType::Academic => "academic",
            CompanyType::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pharma" | "pharmaceutical" => Some(Self::Pharma),
            "biotech" | "biotechnology" => Some(Self::Biotech),
            "academic" | "academia" | "university" => Some(Self::Academic),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Reference to a paper or preprint attributed to the candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    pub title: Option<String>,
    pub published_on: Option<NaiveDate>,
    pub topic: Option<String>,
}

/// One discovered professional after validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub name: String,
    pub title: Option<String>,
    pub company: Option<String>,
    pub person_location: Option<String>,
    pub company_hq: Option<String>,
    pub company_type: Option<CompanyType>,
    pub company_domain: Option<String>,
    pub about: Option<String>,
    pub profile_url: Option<String>,
    pub work_mode: WorkMode,
    /// `None` while the work mode is still unknown.
    pub work_mode_confidence: Option<Confidence>,
    pub email: Option<ContactEmail>,
    pub publications: Vec<Publication>,
}

impl CandidateRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            company: None,
            person_location: None,
            company_hq: None,
            company_type: None,
            company_domain: None,
            about: None,
            profile_url: None,
            work_mode: WorkMode::Unknown,
            work_mode_confidence: None,
            email: None,
            publications: Vec::new(),
        }
    }

    /// Free text the keyword criteria search: title, about, and publication
    /// topics and titles.
    pub fn record_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        parts.extend(self.title.as_deref());
        parts.extend(self.about.as_deref());
        for publication in &self.publications {
            parts.extend(publication.topic.as_deref());
            parts.extend(publication.title.as_deref());
        }
        parts.join(" ")
    }
}

/// Identifiers for the fixed criteria table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionKind {
    RoleRelevance,
    CompanyType,
    TechnologyMatch,
    OpennessSignal,
    Location,
    RecentPublication,
}

impl CriterionKind {
    pub const fn ordered() -> [CriterionKind; 6] {
        [
            CriterionKind::RoleRelevance,
            CriterionKind::CompanyType,
            CriterionKind::TechnologyMatch,
            CriterionKind::OpennessSignal,
            CriterionKind::Location,
            CriterionKind::RecentPublication,
        ]
    }

    pub const fn id(self) -> &'static str {
        match self {
            CriterionKind::RoleRelevance => "role_relevance",
            CriterionKind::CompanyType => "company_type",
            CriterionKind::TechnologyMatch => "technology_match",
            CriterionKind::OpennessSignal => "openness_signal",
            CriterionKind::Location => "location",
            CriterionKind::RecentPublication => "recent_publication",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            CriterionKind::RoleRelevance => "Role relevance",
            CriterionKind::CompanyType => "Company type",
            CriterionKind::TechnologyMatch => "Technology match",
            CriterionKind::OpennessSignal => "Openness signal",
            CriterionKind::Location => "Location",
            CriterionKind::RecentPublication => "Recent publication",
        }
    }

    pub fn from_id(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ordered()
            .into_iter()
            .find(|criterion| criterion.id() == value)
    }
}

/// Discrete contribution to a score, kept for audits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionHit {
    pub criterion: CriterionKind,
    pub points: u8,
    pub evidence: String,
}

/// Which scorer produced the final number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreSource {
    Rules,
    Judge,
}

impl ScoreSource {
    pub const fn label(self) -> &'static str {
        match self {
            ScoreSource::Rules => "rules",
            ScoreSource::Judge => "judge",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "rules" => Some(Self::Rules),
            "judge" => Some(Self::Judge),
            _ => None,
        }
    }
}

/// A candidate together with its bounded score and the criteria behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub record: CandidateRecord,
    pub score: u8,
    pub contributions: Vec<CriterionHit>,
    pub source: ScoreSource,
}

impl ScoredRecord {
    pub fn contributing_criteria(&self) -> Vec<CriterionKind> {
        self.contributions.iter().map(|hit| hit.criterion).collect()
    }
}
