use serde::{Deserialize, Serialize};

use super::config::{PriorityThresholds, RankingConfig};
use super::domain::ScoredRecord;
use super::export::LeadRow;

/// Outreach bucket derived from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriorityTier {
    High,
    Medium,
    Low,
}

impl PriorityTier {
    pub fn for_score(score: u8, thresholds: &PriorityThresholds) -> Self {
        if score >= thresholds.high {
            PriorityTier::High
        } else if score >= thresholds.medium {
            PriorityTier::Medium
        } else {
            PriorityTier::Low
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            PriorityTier::High => "High",
            PriorityTier::Medium => "Medium",
            PriorityTier::Low => "Low",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedLead {
    /// 1-based position after sorting.
    pub rank: usize,
    pub priority: PriorityTier,
    pub scored: ScoredRecord,
}

impl RankedLead {
    pub fn to_row(&self) -> LeadRow {
        LeadRow::from_ranked(self)
    }
}

/// Stable descending sort, optional top-N cut, then rank and tier assignment.
pub fn rank_records(
    mut scored: Vec<ScoredRecord>,
    ranking: &RankingConfig,
    thresholds: &PriorityThresholds,
) -> Vec<RankedLead> {
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    if let Some(limit) = ranking.top_n {
        scored.truncate(limit);
    }

    scored
        .into_iter()
        .enumerate()
        .map(|(index, scored)| RankedLead {
            rank: index + 1,
            priority: PriorityTier::for_score(scored.score, thresholds),
            scored,
        })
        .collect()
}
