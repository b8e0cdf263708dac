use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use super::super::config::CompanyEntry;
use super::super::domain::CompanyType;
use super::super::keywords::normalize_text;
use super::super::timeout::{call_with_timeout, CallInterrupted};

/// Trailing corporate-form tokens ignored when matching or deriving domains.
pub(crate) const LEGAL_SUFFIXES: &[&str] = &[
    "inc", "llc", "ltd", "corporation", "corp", "company", "co", "gmbh", "ag", "plc", "sa",
];

/// What a lookup knows about an organization. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyProfile {
    pub company_type: Option<CompanyType>,
    pub hq: Option<String>,
    pub domain: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResult {
    Found(CompanyProfile),
    Unknown,
}

/// Source of company metadata keyed by company name.
pub trait CompanyLookup: Send + Sync {
    fn lookup(&self, company: &str) -> LookupResult;
}

/// In-memory reference set built from the configured companies.
#[derive(Debug, Clone, Default)]
pub struct CompanyDirectory {
    profiles: HashMap<String, CompanyProfile>,
}

impl CompanyDirectory {
    pub fn new(entries: &[CompanyEntry]) -> Self {
        let mut profiles = HashMap::new();
        for entry in entries {
            let profile = CompanyProfile {
                company_type: entry.company_type,
                hq: entry.hq.clone(),
                domain: entry.domain.as_ref().map(|domain| domain.trim().to_ascii_lowercase()),
            };
            for name in std::iter::once(&entry.name).chain(entry.aliases.iter()) {
                let key = company_key(name);
                if !key.is_empty() {
                    profiles.entry(key).or_insert_with(|| profile.clone());
                }
            }
        }
        Self { profiles }
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl CompanyLookup for CompanyDirectory {
    fn lookup(&self, company: &str) -> LookupResult {
        match self.profiles.get(&company_key(company)) {
            Some(profile) => LookupResult::Found(profile.clone()),
            None => LookupResult::Unknown,
        }
    }
}

/// Normalized name with trailing legal suffixes removed.
fn company_key(name: &str) -> String {
    let normalized = normalize_text(name);
    let mut tokens: Vec<&str> = normalized.split(' ').filter(|token| !token.is_empty()).collect();
    while tokens.len() > 1
        && tokens
            .last()
            .is_some_and(|token| LEGAL_SUFFIXES.contains(token))
    {
        tokens.pop();
    }
    tokens.join(" ")
}

/// Lookup wrapper that gives up after `timeout` and reports `Unknown`.
#[derive(Clone)]
pub struct TimedLookup {
    inner: Arc<dyn CompanyLookup>,
    timeout: Duration,
}

impl TimedLookup {
    pub fn new(inner: Arc<dyn CompanyLookup>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

impl CompanyLookup for TimedLookup {
    fn lookup(&self, company: &str) -> LookupResult {
        let inner = Arc::clone(&self.inner);
        let name = company.to_string();
        match call_with_timeout(self.timeout, move || inner.lookup(&name)) {
            Ok(result) => result,
            Err(CallInterrupted::TimedOut(limit)) => {
                warn!(company, timeout_ms = limit.as_millis() as u64, "company lookup timed out");
                LookupResult::Unknown
            }
            Err(CallInterrupted::Aborted) => {
                warn!(company, "company lookup failed");
                LookupResult::Unknown
            }
        }
    }
}
