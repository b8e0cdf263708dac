//! Externally tunable scoring and enrichment settings.
//!
//! Everything the criteria table and the inference rules depend on lives
//! here so the algorithms never embed keyword lists or weights. The TOML
//! layout mirrors the struct tree; every section is optional:
//!
//! ```toml
//! [criteria.role_relevance]
//! weight = 30
//! keywords = ["director", "head"]
//! domain_terms = ["toxicology", "safety"]
//!
//! [criteria.recent_publication]
//! weight = 40
//! recency_months = 24
//! topics = ["dili", "organoid"]
//!
//! [enrichment]
//! email_patterns = ["{first}.{last}@{domain}", "{f}{last}@{domain}"]
//! lookup_timeout_ms = 2000
//!
//! [[companies]]
//! name = "Roche"
//! type = "pharma"
//! hq = "Basel, Switzerland"
//! domain = "roche.com"
//!
//! [scoring]
//! policy = "rules"
//!
//! [ranking]
//! top_n = 40
//!
//! [priority]
//! high = 80
//! medium = 60
//! ```

use super::domain::CompanyType;
use super::enrichment::email::EmailTemplate;
use super::keywords::normalize_text;
use super::scoring::ScoringPolicy;
use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const MAX_WEIGHT: u8 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LeadScoringConfig {
    pub criteria: CriteriaConfig,
    pub enrichment: EnrichmentConfig,
    /// Reference set backing the company lookup.
    pub companies: Vec<CompanyEntry>,
    pub scoring: ScoringSection,
    pub ranking: RankingConfig,
    pub priority: PriorityThresholds,
}

impl Default for LeadScoringConfig {
    fn default() -> Self {
        Self {
            criteria: CriteriaConfig::default(),
            enrichment: EnrichmentConfig::default(),
            companies: default_companies(),
            scoring: ScoringSection::default(),
            ranking: RankingConfig::default(),
            priority: PriorityThresholds::default(),
        }
    }
}

impl LeadScoringConfig {
    /// Reject configurations that would silently miscompute every score.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.criteria.validate()?;
        self.enrichment.validate()?;
        self.scoring.validate()?;
        self.ranking.validate()?;
        self.priority.validate()?;

        for (index, entry) in self.companies.iter().enumerate() {
            if entry.name.trim().is_empty() {
                return Err(ConfigError::invalid(
                    format!("companies[{index}]"),
                    "name must not be blank",
                ));
            }
            if let Some(domain) = &entry.domain {
                if !is_plausible_domain(domain) {
                    return Err(ConfigError::invalid(
                        format!("companies[{index}]"),
                        format!("'{domain}' is not a bare domain name"),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Sum of all criterion weights; may exceed 100 since totals are clamped.
    pub fn total_weight(&self) -> u32 {
        let criteria = &self.criteria;
        [
            criteria.role_relevance.weight,
            criteria.company_type.weight,
            criteria.technology_match.weight,
            criteria.openness_signal.weight,
            criteria.location.weight,
            criteria.recent_publication.weight,
        ]
        .into_iter()
        .map(u32::from)
        .sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CriteriaConfig {
    pub role_relevance: RoleCriterion,
    pub company_type: CompanyTypeCriterion,
    pub technology_match: TechnologyCriterion,
    pub openness_signal: OpennessCriterion,
    pub location: LocationCriterion,
    pub recent_publication: PublicationCriterion,
}

impl CriteriaConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let role = &self.role_relevance;
        check_weight("criteria.role_relevance", role.weight)?;
        check_keywords("criteria.role_relevance.keywords", &role.keywords)?;
        check_keywords("criteria.role_relevance.domain_terms", &role.domain_terms)?;
        check_keywords("criteria.role_relevance.target_titles", &role.target_titles)?;
        if role.weight > 0 && role.keywords.is_empty() && role.target_titles.is_empty() {
            return Err(ConfigError::invalid(
                "criteria.role_relevance",
                "needs keywords or target_titles while weighted",
            ));
        }

        let company = &self.company_type;
        check_weight("criteria.company_type", company.weight)?;
        if company.weight > 0 && company.types.is_empty() {
            return Err(ConfigError::invalid(
                "criteria.company_type",
                "types must not be empty while weighted",
            ));
        }

        let technology = &self.technology_match;
        check_weight("criteria.technology_match", technology.weight)?;
        check_required_keywords(
            "criteria.technology_match",
            technology.weight,
            &technology.keywords,
        )?;

        let openness = &self.openness_signal;
        check_weight("criteria.openness_signal", openness.weight)?;
        check_required_keywords(
            "criteria.openness_signal",
            openness.weight,
            &openness.keywords,
        )?;

        let location = &self.location;
        check_weight("criteria.location", location.weight)?;
        check_required_keywords("criteria.location", location.weight, &location.hubs)?;

        let publication = &self.recent_publication;
        check_weight("criteria.recent_publication", publication.weight)?;
        check_keywords("criteria.recent_publication.topics", &publication.topics)?;
        if publication.recency_months == 0 {
            return Err(ConfigError::invalid(
                "criteria.recent_publication",
                "recency_months must be at least 1",
            ));
        }

        Ok(())
    }
}

/// Seniority keywords combined with domain terms, or exact target titles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoleCriterion {
    pub weight: u8,
    pub keywords: Vec<String>,
    /// When non-empty, a keyword hit also needs one of these in the record text.
    pub domain_terms: Vec<String>,
    /// Titles that qualify on their own.
    pub target_titles: Vec<String>,
}

impl Default for RoleCriterion {
    fn default() -> Self {
        Self {
            weight: 30,
            keywords: strings(&[
                "director",
                "head",
                "vp",
                "vice president",
                "chief",
                "lead",
                "principal scientist",
            ]),
            domain_terms: strings(&[
                "toxicology",
                "toxicologist",
                "safety",
                "preclinical",
                "hepatic",
                "investigative",
                "dili",
                "liver",
                "hepatotoxicity",
            ]),
            target_titles: strings(&[
                "director of toxicology",
                "head of toxicology",
                "head of preclinical safety",
                "director of preclinical safety",
                "safety assessment",
                "hepatic toxicology",
                "investigative toxicology",
            ]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompanyTypeCriterion {
    pub weight: u8,
    pub types: Vec<CompanyType>,
}

impl Default for CompanyTypeCriterion {
    fn default() -> Self {
        Self {
            weight: 20,
            types: vec![CompanyType::Pharma, CompanyType::Biotech],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TechnologyCriterion {
    pub weight: u8,
    pub keywords: Vec<String>,
}

impl Default for TechnologyCriterion {
    fn default() -> Self {
        Self {
            weight: 15,
            keywords: strings(&[
                "3d",
                "in vitro",
                "cell culture",
                "organoid",
                "organoids",
                "organ on chip",
                "organ on a chip",
                "microphysiological",
                "spheroid",
                "spheroids",
            ]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OpennessCriterion {
    pub weight: u8,
    pub keywords: Vec<String>,
}

impl Default for OpennessCriterion {
    fn default() -> Self {
        Self {
            weight: 10,
            keywords: strings(&[
                "new approach methodologies",
                "nam",
                "nams",
                "alternative methods",
                "reduce animal testing",
                "animal free",
                "non animal",
                "3rs",
                "innovation",
                "early adopter",
            ]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocationCriterion {
    pub weight: u8,
    pub hubs: Vec<String>,
}

impl Default for LocationCriterion {
    fn default() -> Self {
        Self {
            weight: 10,
            hubs: strings(&[
                "boston",
                "cambridge",
                "san diego",
                "san francisco",
                "bay area",
                "basel",
                "munich",
                "london",
                "seattle",
                "research triangle",
                "raleigh",
                "durham",
            ]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublicationCriterion {
    pub weight: u8,
    pub recency_months: u32,
    /// Empty means any topic counts.
    pub topics: Vec<String>,
}

impl Default for PublicationCriterion {
    fn default() -> Self {
        Self {
            weight: 40,
            recency_months: 24,
            topics: strings(&[
                "liver toxicity",
                "dili",
                "drug induced liver injury",
                "hepatotoxicity",
                "3d cell culture",
                "organoid",
                "microphysiological",
                "organ on chip",
                "spheroid",
                "toxicology",
            ]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnrichmentConfig {
    /// Ordered templates; the first renderable one wins.
    pub email_patterns: Vec<String>,
    /// Derive `<company>.com` when no domain is known.
    pub infer_domain_from_company: bool,
    pub remote_keywords: Vec<String>,
    pub onsite_keywords: Vec<String>,
    pub lookup_timeout_ms: u64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            email_patterns: strings(&[
                "{first}.{last}@{domain}",
                "{f}{last}@{domain}",
                "{f}.{last}@{domain}",
                "{first}{last}@{domain}",
            ]),
            infer_domain_from_company: true,
            remote_keywords: strings(&[
                "remote",
                "distributed",
                "virtual",
                "work from home",
                "wfh",
            ]),
            onsite_keywords: strings(&["onsite", "on site", "in office", "in person"]),
            lookup_timeout_ms: 2_000,
        }
    }
}

impl EnrichmentConfig {
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.email_patterns.is_empty() {
            return Err(ConfigError::invalid(
                "enrichment.email_patterns",
                "at least one template is required",
            ));
        }
        for pattern in &self.email_patterns {
            EmailTemplate::parse(pattern)
                .map_err(|reason| ConfigError::invalid("enrichment.email_patterns", reason))?;
        }
        check_keywords("enrichment.remote_keywords", &self.remote_keywords)?;
        check_keywords("enrichment.onsite_keywords", &self.onsite_keywords)?;
        if self.lookup_timeout_ms == 0 {
            return Err(ConfigError::invalid(
                "enrichment.lookup_timeout_ms",
                "timeout must be positive",
            ));
        }
        Ok(())
    }
}

/// One row of the company reference set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompanyEntry {
    pub name: String,
    #[serde(rename = "type", default)]
    pub company_type: Option<CompanyType>,
    #[serde(default)]
    pub hq: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl CompanyEntry {
    fn new(
        name: &str,
        company_type: CompanyType,
        hq: &str,
        domain: &str,
        aliases: &[&str],
    ) -> Self {
        Self {
            name: name.to_string(),
            company_type: Some(company_type),
            hq: Some(hq.to_string()),
            domain: Some(domain.to_string()),
            aliases: strings(aliases),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringSection {
    pub policy: ScoringPolicy,
    pub judge_timeout_ms: u64,
}

impl Default for ScoringSection {
    fn default() -> Self {
        Self {
            policy: ScoringPolicy::Rules,
            judge_timeout_ms: 5_000,
        }
    }
}

impl ScoringSection {
    pub fn judge_timeout(&self) -> Duration {
        Duration::from_millis(self.judge_timeout_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.judge_timeout_ms == 0 {
            return Err(ConfigError::invalid(
                "scoring.judge_timeout_ms",
                "timeout must be positive",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RankingConfig {
    /// Keep only the best N leads after sorting.
    pub top_n: Option<usize>,
    /// Merge records that share a normalized name.
    pub deduplicate: bool,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_n: None,
            deduplicate: true,
        }
    }
}

impl RankingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.top_n == Some(0) {
            return Err(ConfigError::invalid(
                "ranking.top_n",
                "top_n must be positive when set",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PriorityThresholds {
    pub high: u8,
    pub medium: u8,
}

impl Default for PriorityThresholds {
    fn default() -> Self {
        Self {
            high: 80,
            medium: 60,
        }
    }
}

impl PriorityThresholds {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.high > MAX_WEIGHT || self.medium >= self.high {
            return Err(ConfigError::invalid(
                "priority",
                format!(
                    "expected medium < high <= 100, found medium {} and high {}",
                    self.medium, self.high
                ),
            ));
        }
        Ok(())
    }
}

fn default_companies() -> Vec<CompanyEntry> {
    vec![
        CompanyEntry::new(
            "Pfizer",
            CompanyType::Pharma,
            "New York, NY",
            "pfizer.com",
            &["Pfizer Inc"],
        ),
        CompanyEntry::new(
            "Roche",
            CompanyType::Pharma,
            "Basel, Switzerland",
            "roche.com",
            &["F. Hoffmann-La Roche", "Hoffmann-La Roche"],
        ),
        CompanyEntry::new(
            "Novartis",
            CompanyType::Pharma,
            "Basel, Switzerland",
            "novartis.com",
            &["Novartis AG"],
        ),
        CompanyEntry::new(
            "AstraZeneca",
            CompanyType::Pharma,
            "Cambridge, United Kingdom",
            "astrazeneca.com",
            &[],
        ),
        CompanyEntry::new(
            "GSK",
            CompanyType::Pharma,
            "London, United Kingdom",
            "gsk.com",
            &["GlaxoSmithKline"],
        ),
        CompanyEntry::new(
            "Genentech",
            CompanyType::Biotech,
            "South San Francisco, CA",
            "gene.com",
            &[],
        ),
        CompanyEntry::new(
            "Moderna",
            CompanyType::Biotech,
            "Cambridge, MA",
            "modernatx.com",
            &[],
        ),
        CompanyEntry::new(
            "Vertex Pharmaceuticals",
            CompanyType::Biotech,
            "Boston, MA",
            "vrtx.com",
            &["Vertex"],
        ),
        CompanyEntry::new(
            "Emulate",
            CompanyType::Biotech,
            "Boston, MA",
            "emulatebio.com",
            &["Emulate Inc"],
        ),
        CompanyEntry::new(
            "University of Michigan",
            CompanyType::Academic,
            "Ann Arbor, Michigan",
            "umich.edu",
            &[],
        ),
        CompanyEntry::new(
            "Harvard Medical School",
            CompanyType::Academic,
            "Boston, MA",
            "hms.harvard.edu",
            &[],
        ),
    ]
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn check_weight(section: &str, weight: u8) -> Result<(), ConfigError> {
    if weight > MAX_WEIGHT {
        return Err(ConfigError::invalid(
            section,
            format!("weight {weight} exceeds {MAX_WEIGHT}"),
        ));
    }
    Ok(())
}

fn check_keywords(section: &str, keywords: &[String]) -> Result<(), ConfigError> {
    match keywords
        .iter()
        .find(|keyword| normalize_text(keyword).is_empty())
    {
        Some(keyword) => Err(ConfigError::invalid(
            section,
            format!("keyword '{keyword}' has no searchable characters"),
        )),
        None => Ok(()),
    }
}

fn check_required_keywords(
    section: &str,
    weight: u8,
    keywords: &[String],
) -> Result<(), ConfigError> {
    if weight > 0 && keywords.is_empty() {
        return Err(ConfigError::invalid(
            section,
            "keyword list must not be empty while weighted",
        ));
    }
    check_keywords(section, keywords)
}

fn is_plausible_domain(domain: &str) -> bool {
    let domain = domain.trim();
    domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '.' || ch == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_and_match_published_weights() {
        let config = LeadScoringConfig::default();
        config.validate().expect("defaults validate");

        let criteria = &config.criteria;
        assert_eq!(criteria.role_relevance.weight, 30);
        assert_eq!(criteria.company_type.weight, 20);
        assert_eq!(criteria.technology_match.weight, 15);
        assert_eq!(criteria.openness_signal.weight, 10);
        assert_eq!(criteria.location.weight, 10);
        assert_eq!(criteria.recent_publication.weight, 40);
        assert_eq!(config.total_weight(), 125);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config: LeadScoringConfig = toml::from_str(
            "[criteria.technology_match]\nweight = 5\n\n[ranking]\ntop_n = 10\n",
        )
        .expect("parses");

        assert_eq!(config.criteria.technology_match.weight, 5);
        assert!(config
            .criteria
            .technology_match
            .keywords
            .contains(&"organoid".to_string()));
        assert_eq!(config.ranking.top_n, Some(10));
        assert!(config.ranking.deduplicate);
        assert_eq!(config.companies, default_companies());
    }

    #[test]
    fn company_table_and_policy_parse() {
        let config: LeadScoringConfig = toml::from_str(
            r#"
[scoring]
policy = "highest"

[[companies]]
name = "Acme Bio"
type = "biotech"
hq = "Durham, NC"
domain = "acmebio.com"
"#,
        )
        .expect("parses");

        assert_eq!(config.scoring.policy, ScoringPolicy::Highest);
        assert_eq!(config.companies.len(), 1);
        assert_eq!(config.companies[0].company_type, Some(CompanyType::Biotech));
        config.validate().expect("valid");
    }

    #[test]
    fn oversized_weight_is_fatal() {
        let mut config = LeadScoringConfig::default();
        config.criteria.location.weight = 150;
        let error = config.validate().expect_err("weight above 100");
        assert!(error.to_string().contains("criteria.location"));
    }

    #[test]
    fn weighted_criterion_without_keywords_is_fatal() {
        let mut config = LeadScoringConfig::default();
        config.criteria.technology_match.keywords.clear();
        assert!(config.validate().is_err());

        config.criteria.technology_match.weight = 0;
        config.validate().expect("unweighted criterion may be empty");
    }

    #[test]
    fn punctuation_only_keyword_is_fatal() {
        let mut config = LeadScoringConfig::default();
        config.criteria.location.hubs.push(" -- ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn email_template_without_domain_is_fatal() {
        let mut config = LeadScoringConfig::default();
        config.enrichment.email_patterns = vec!["{first}.{last}".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn inverted_priority_thresholds_are_fatal() {
        let mut config = LeadScoringConfig::default();
        config.priority = PriorityThresholds {
            high: 50,
            medium: 70,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_recency_window_is_fatal() {
        let mut config = LeadScoringConfig::default();
        config.criteria.recent_publication.recency_months = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn company_domain_must_be_bare() {
        let mut config = LeadScoringConfig::default();
        config.companies[0].domain = Some("https://pfizer.com/".to_string());
        assert!(config.validate().is_err());
    }
}
