use serde::{Deserialize, Serialize};

use super::domain::WorkMode;
use super::export::LeadRow;
use super::ranking::PriorityTier;

/// Query over exported rows. Unset criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadFilter {
    pub priorities: Vec<PriorityTier>,
    pub min_score: Option<u8>,
    pub max_score: Option<u8>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    /// Matches person location or company HQ.
    pub location: Option<String>,
    pub work_modes: Vec<WorkMode>,
}

impl LeadFilter {
    pub fn matches(&self, row: &LeadRow) -> bool {
        if !self.priorities.is_empty() && !self.priorities.contains(&row.priority) {
            return false;
        }
        if self.min_score.is_some_and(|min| row.score < min) {
            return false;
        }
        if self.max_score.is_some_and(|max| row.score > max) {
            return false;
        }
        if !self.work_modes.is_empty() && !self.work_modes.contains(&row.work_mode) {
            return false;
        }

        contains(&self.name, Some(&row.name))
            && contains(&self.title, row.title.as_ref())
            && contains(&self.company, row.company.as_ref())
            && (contains(&self.location, row.person_location.as_ref())
                || contains(&self.location, row.company_hq.as_ref()))
    }

    /// Matching rows in their original order.
    pub fn apply<'a>(&self, rows: &'a [LeadRow]) -> Vec<&'a LeadRow> {
        rows.iter().filter(|row| self.matches(row)).collect()
    }
}

fn contains(needle: &Option<String>, haystack: Option<&String>) -> bool {
    let Some(needle) = needle.as_deref().map(str::trim).filter(|value| !value.is_empty()) else {
        return true;
    };
    haystack.is_some_and(|value| value.to_lowercase().contains(&needle.to_lowercase()))
}
