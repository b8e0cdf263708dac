use regex::Regex;
use std::sync::OnceLock;

use super::super::config::EnrichmentConfig;
use super::super::domain::CandidateRecord;
use super::company::LEGAL_SUFFIXES;

static EMAIL_PATTERN: OnceLock<Regex> = OnceLock::new();

const HONORIFICS: &[&str] = &["dr", "prof", "professor", "mr", "mrs", "ms", "mx"];
const NAME_SUFFIXES: &[&str] = &[
    "phd", "md", "mba", "msc", "dvm", "pharmd", "dabt", "jr", "sr", "ii", "iii", "iv",
];

/// Syntactic address check; no deliverability is implied.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN
        .get_or_init(|| {
            Regex::new(r"(?i)^[a-z0-9._%+\-]+@[a-z0-9\-]+(\.[a-z0-9\-]+)*\.[a-z]{2,}$")
                .expect("email pattern compiles")
        })
        .is_match(value.trim())
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    First,
    Last,
    FirstInitial,
    LastInitial,
    Domain,
}

/// Address template such as `{first}.{last}@{domain}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EmailTemplate {
    segments: Vec<Segment>,
}

impl EmailTemplate {
    pub(crate) fn parse(pattern: &str) -> Result<Self, String> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = pattern.trim().chars();

        while let Some(ch) = chars.next() {
            if ch != '{' {
                literal.push(ch);
                continue;
            }

            let mut placeholder = String::new();
            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(inner) => placeholder.push(inner),
                    None => return Err(format!("unclosed placeholder in '{pattern}'")),
                }
            }

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(match placeholder.as_str() {
                "first" => Segment::First,
                "last" => Segment::Last,
                "f" => Segment::FirstInitial,
                "l" => Segment::LastInitial,
                "domain" => Segment::Domain,
                other => return Err(format!("unknown placeholder '{{{other}}}' in '{pattern}'")),
            });
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        let has_domain = segments.contains(&Segment::Domain);
        let has_name = segments.iter().any(|segment| {
            matches!(
                segment,
                Segment::First | Segment::Last | Segment::FirstInitial | Segment::LastInitial
            )
        });
        let has_at = segments
            .iter()
            .any(|segment| matches!(segment, Segment::Literal(text) if text.contains('@')));

        if !(has_domain && has_name && has_at) {
            return Err(format!(
                "'{pattern}' needs a name placeholder, '@' and {{domain}}"
            ));
        }

        Ok(Self { segments })
    }

    fn render(&self, name: &NameParts, domain: &str) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => text.as_str(),
                Segment::First => name.first.as_str(),
                Segment::Last => name.last.as_str(),
                Segment::FirstInitial => &name.first[..1],
                Segment::LastInitial => &name.last[..1],
                Segment::Domain => domain,
            })
            .collect()
    }
}

/// Lowercase ASCII first and last name, honorifics and suffixes removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NameParts {
    pub(crate) first: String,
    pub(crate) last: String,
}

pub(crate) fn split_name(name: &str) -> Option<NameParts> {
    let mut tokens: Vec<String> = name
        .split(|ch: char| ch.is_whitespace() || ch == ',')
        .map(|token| {
            token
                .chars()
                .filter(|ch| ch.is_ascii_alphabetic())
                .collect::<String>()
                .to_ascii_lowercase()
        })
        .filter(|token| !token.is_empty())
        .collect();

    while tokens
        .first()
        .is_some_and(|token| HONORIFICS.contains(&token.as_str()))
    {
        tokens.remove(0);
    }
    while tokens
        .last()
        .is_some_and(|token| NAME_SUFFIXES.contains(&token.as_str()))
    {
        tokens.pop();
    }

    if tokens.len() < 2 {
        return None;
    }

    let last = tokens.pop()?;
    let first = tokens.swap_remove(0);
    Some(NameParts { first, last })
}

/// `Acme Therapeutics, Inc.` becomes `acmetherapeutics.com`.
pub(crate) fn domain_from_company(company: &str) -> Option<String> {
    let stem: String = company
        .to_ascii_lowercase()
        .split(|ch: char| !ch.is_ascii_alphanumeric())
        .filter(|token| !token.is_empty() && !LEGAL_SUFFIXES.contains(token))
        .collect();

    (!stem.is_empty()).then(|| format!("{stem}.com"))
}

/// Generates likely business addresses from configured templates.
#[derive(Debug, Clone)]
pub struct EmailInference {
    templates: Vec<EmailTemplate>,
    infer_domain_from_company: bool,
}

impl EmailInference {
    pub fn new(config: &EnrichmentConfig) -> Self {
        let templates = config
            .email_patterns
            .iter()
            .filter_map(|pattern| EmailTemplate::parse(pattern).ok())
            .collect();

        Self {
            templates,
            infer_domain_from_company: config.infer_domain_from_company,
        }
    }

    /// Domain used for the record: the known one, else one derived from the
    /// company name when that is enabled.
    pub fn domain_for(&self, record: &CandidateRecord) -> Option<String> {
        if let Some(domain) = &record.company_domain {
            return Some(domain.clone());
        }
        if !self.infer_domain_from_company {
            return None;
        }
        record.company.as_deref().and_then(domain_from_company)
    }

    /// Every valid address the templates produce, in template order.
    pub fn candidates(&self, record: &CandidateRecord) -> Vec<String> {
        let (Some(name), Some(domain)) = (split_name(&record.name), self.domain_for(record)) else {
            return Vec::new();
        };

        let mut candidates: Vec<String> = Vec::new();
        for template in &self.templates {
            let address = template.render(&name, &domain);
            if is_valid_email(&address) && !candidates.contains(&address) {
                candidates.push(address);
            }
        }
        candidates
    }

    pub fn infer(&self, record: &CandidateRecord) -> Option<String> {
        self.candidates(record).into_iter().next()
    }
}
