use serde::{Deserialize, Serialize};

use super::super::domain::ScoreSource;
use super::judge::JudgeError;

/// How the rule score and an optional judge score combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringPolicy {
    /// Rule-based score only.
    #[default]
    Rules,
    /// Judge score when valid, rule score otherwise.
    Judge,
    /// Larger of the rule score and a valid judge score.
    Highest,
}

impl ScoringPolicy {
    pub const fn label(self) -> &'static str {
        match self {
            ScoringPolicy::Rules => "rules",
            ScoringPolicy::Judge => "judge",
            ScoringPolicy::Highest => "highest",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "rules" => Some(Self::Rules),
            "judge" => Some(Self::Judge),
            "highest" => Some(Self::Highest),
            _ => None,
        }
    }

    pub const fn requires_judge(self) -> bool {
        !matches!(self, ScoringPolicy::Rules)
    }
}

/// Final score chosen under a policy.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Resolution {
    pub score: u8,
    pub source: ScoreSource,
    /// Set when a judge was consulted and failed.
    pub judge_failure: Option<JudgeError>,
}

pub(crate) fn resolve(
    policy: ScoringPolicy,
    rule_score: u8,
    judged: Option<Result<u8, JudgeError>>,
) -> Resolution {
    let rules_only = |judge_failure| Resolution {
        score: rule_score,
        source: ScoreSource::Rules,
        judge_failure,
    };

    match (policy, judged) {
        (ScoringPolicy::Rules, _) | (_, None) => rules_only(None),
        (_, Some(Err(error))) => rules_only(Some(error)),
        (ScoringPolicy::Judge, Some(Ok(judge_score))) => Resolution {
            score: judge_score,
            source: ScoreSource::Judge,
            judge_failure: None,
        },
        (ScoringPolicy::Highest, Some(Ok(judge_score))) if judge_score > rule_score => {
            Resolution {
                score: judge_score,
                source: ScoreSource::Judge,
                judge_failure: None,
            }
        }
        (ScoringPolicy::Highest, Some(Ok(_))) => rules_only(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_policy_ignores_judge() {
        let resolution = resolve(ScoringPolicy::Rules, 40, Some(Ok(90)));
        assert_eq!(resolution.score, 40);
        assert_eq!(resolution.source, ScoreSource::Rules);
        assert!(resolution.judge_failure.is_none());
    }

    #[test]
    fn judge_policy_prefers_valid_judge_score() {
        let resolution = resolve(ScoringPolicy::Judge, 70, Some(Ok(35)));
        assert_eq!(resolution.score, 35);
        assert_eq!(resolution.source, ScoreSource::Judge);
    }

    #[test]
    fn judge_failure_falls_back_to_rules() {
        let resolution = resolve(
            ScoringPolicy::Judge,
            70,
            Some(Err(JudgeError::OutOfRange(140.0))),
        );
        assert_eq!(resolution.score, 70);
        assert_eq!(resolution.source, ScoreSource::Rules);
        assert_eq!(resolution.judge_failure, Some(JudgeError::OutOfRange(140.0)));
    }

    #[test]
    fn highest_keeps_rule_score_on_ties() {
        let tie = resolve(ScoringPolicy::Highest, 60, Some(Ok(60)));
        assert_eq!(tie.source, ScoreSource::Rules);

        let higher = resolve(ScoringPolicy::Highest, 60, Some(Ok(61)));
        assert_eq!(higher.score, 61);
        assert_eq!(higher.source, ScoreSource::Judge);
    }

    #[test]
    fn policy_names_parse_case_insensitively() {
        assert_eq!(ScoringPolicy::parse(" Highest "), Some(ScoringPolicy::Highest));
        assert_eq!(ScoringPolicy::parse("average"), None);
        assert!(!ScoringPolicy::Rules.requires_judge());
        assert!(ScoringPolicy::Judge.requires_judge());
    }
}
