use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;

use super::common::*;
use crate::workflows::leads::domain::{CompanyType, CriterionKind, ScoreSource};
use crate::workflows::leads::enrichment::EnrichmentEngine;
use crate::workflows::leads::scoring::{JudgeError, PrecomputedJudge, ScoringEngine, ScoringPolicy};
use crate::workflows::leads::validation::RecordValidator;

#[test]
fn fontana_example_scores_seventy_under_default_table() {
    let record = RecordValidator::new()
        .validate(&fontana_raw())
        .expect("valid");
    let scored = scoring_engine().score(&record);

    assert_eq!(scored.score, 70);
    assert_eq!(
        scored.contributing_criteria(),
        vec![CriterionKind::RoleRelevance, CriterionKind::RecentPublication]
    );
    assert_eq!(scored.source, ScoreSource::Rules);
}

#[test]
fn enriched_academic_affiliation_adds_nothing() {
    let record = EnrichmentEngine::from_config(&config()).enrich(
        RecordValidator::new()
            .validate(&fontana_raw())
            .expect("valid"),
    );
    assert_eq!(record.company_type, Some(CompanyType::Academic));
    assert_eq!(record.company_hq.as_deref(), Some("Ann Arbor, Michigan"));

    assert_eq!(scoring_engine().score(&record).score, 70);
}

#[test]
fn total_above_one_hundred_is_clamped() {
    let record = RecordValidator::new()
        .validate(&fontana_full_raw())
        .expect("valid");
    let scored = scoring_engine().score(&record);

    let raw_total: u32 = scored
        .contributions
        .iter()
        .map(|hit| u32::from(hit.points))
        .sum();
    assert_eq!(raw_total, 105);
    assert_eq!(scored.score, 100);
    assert_eq!(
        scored.contributing_criteria(),
        vec![
            CriterionKind::RoleRelevance,
            CriterionKind::TechnologyMatch,
            CriterionKind::OpennessSignal,
            CriterionKind::Location,
            CriterionKind::RecentPublication,
        ]
    );
}

#[test]
fn empty_record_scores_zero() {
    let scored = scoring_engine().score(&validated(json!({ "name": "Jane Doe" })));
    assert_eq!(scored.score, 0);
    assert!(scored.contributions.is_empty());
}

#[test]
fn scoring_is_deterministic() {
    let record = validated(json!({
        "name": "Jane Doe",
        "title": "Head of Preclinical Safety",
        "company_type": "biotech",
        "company_hq": "Cambridge, MA"
    }));
    let engine = scoring_engine();

    let first = engine.score(&record);
    let second = engine.score(&record);
    assert_eq!(first, second);
    assert_eq!(first.score, 60);
}

#[test]
fn role_keyword_needs_a_domain_term() {
    let engine = scoring_engine();

    let marketing = validated(json!({
        "name": "Jane Doe",
        "title": "Director of Marketing"
    }));
    assert_eq!(engine.score(&marketing).score, 0);

    let safety = validated(json!({
        "name": "Jane Doe",
        "title": "Director of Marketing",
        "about": "Former hepatotoxicity lab manager"
    }));
    let scored = engine.score(&safety);
    assert_eq!(scored.score, 30);
    assert!(scored.contributions[0].evidence.contains("hepatotoxicity"));
}

#[test]
fn empty_domain_terms_let_keywords_stand_alone() {
    let mut config = config();
    config.criteria.role_relevance.domain_terms.clear();
    let engine = ScoringEngine::new(&config, as_of()).expect("engine");

    let record = validated(json!({ "name": "Jane Doe", "title": "Director of Marketing" }));
    assert_eq!(engine.score(&record).score, 30);
}

#[test]
fn keywords_match_whole_words_only() {
    let record = validated(json!({
        "name": "Jane Doe",
        "about": "Her name is on the masthead of a leading journal"
    }));
    assert_eq!(scoring_engine().score(&record).score, 0);
}

#[test]
fn recency_window_is_inclusive_at_the_cutoff() {
    let engine = scoring_engine();
    assert_eq!(
        engine.publication_cutoff(),
        NaiveDate::from_ymd_opt(2023, 6, 1).expect("valid")
    );

    let on_cutoff = validated(json!({
        "name": "Jane Doe",
        "publications": [{ "date": "2023-06-01", "topic": "organoid" }]
    }));
    assert_eq!(engine.score(&on_cutoff).score, 55);

    let stale = validated(json!({
        "name": "Jane Doe",
        "publications": [{ "date": "2023-05-31", "topic": "Hepatotoxicity review" }]
    }));
    let scored = engine.score(&stale);
    assert!(!scored
        .contributing_criteria()
        .contains(&CriterionKind::RecentPublication));
}

#[test]
fn undated_or_off_topic_publications_do_not_count() {
    let record = validated(json!({
        "name": "Jane Doe",
        "publications": [
            { "topic": "DILI" },
            { "date": "2025-01-10", "title": "Quarterly sales outlook" }
        ]
    }));
    assert_eq!(scoring_engine().score(&record).score, 0);
}

#[test]
fn empty_topic_list_accepts_any_recent_publication() {
    let mut config = config();
    config.criteria.recent_publication.topics.clear();
    let engine = ScoringEngine::new(&config, as_of()).expect("engine");

    let record = validated(json!({
        "name": "Jane Doe",
        "publications": [{ "date": "2025-01-10", "title": "Quarterly sales outlook" }]
    }));
    assert_eq!(engine.score(&record).score, 40);
}

#[test]
fn location_matches_company_headquarters() {
    let record = validated(json!({
        "name": "Jane Doe",
        "person_location": "Ann Arbor, Michigan",
        "company_hq": "Basel, Switzerland"
    }));
    let scored = scoring_engine().score(&record);
    assert_eq!(scored.score, 10);
    assert_eq!(scored.contributions[0].evidence, "hub 'basel' in company hq");
}

#[test]
fn zero_weight_criteria_never_contribute() {
    let mut config = config();
    config.criteria.location.weight = 0;
    let engine = ScoringEngine::new(&config, as_of()).expect("engine");

    let record = validated(json!({ "name": "Jane Doe", "person_location": "Boston" }));
    let scored = engine.score(&record);
    assert_eq!(scored.score, 0);
    assert!(scored.contributions.is_empty());
}

#[test]
fn judge_policy_without_judge_is_a_configuration_error() {
    let mut config = config();
    config.scoring.policy = ScoringPolicy::Judge;
    let error = ScoringEngine::new(&config, as_of()).err().expect("judge required");
    assert!(error.to_string().contains("scoring.policy"));
}

#[test]
fn judge_policy_uses_rounded_judge_score() {
    let mut config = config();
    config.scoring.policy = ScoringPolicy::Judge;
    let engine =
        ScoringEngine::with_judge(&config, as_of(), Some(fixed_judge(42.6))).expect("engine");

    let record = RecordValidator::new()
        .validate(&fontana_raw())
        .expect("valid");
    let evaluation = engine.evaluate(&record);

    assert_eq!(evaluation.scored.score, 43);
    assert_eq!(evaluation.scored.source, ScoreSource::Judge);
    assert_eq!(evaluation.scored.contributions.len(), 2);
    assert!(evaluation.judge_failure.is_none());
}

#[test]
fn invalid_judge_output_falls_back_to_rules() {
    let mut config = config();
    config.scoring.policy = ScoringPolicy::Judge;
    let engine =
        ScoringEngine::with_judge(&config, as_of(), Some(fixed_judge(180.0))).expect("engine");

    let record = RecordValidator::new()
        .validate(&fontana_raw())
        .expect("valid");
    let evaluation = engine.evaluate(&record);

    assert_eq!(evaluation.scored.score, 70);
    assert_eq!(evaluation.scored.source, ScoreSource::Rules);
    assert_eq!(evaluation.judge_failure, Some(JudgeError::OutOfRange(180.0)));
}

#[test]
fn highest_policy_picks_the_larger_score() {
    let judge =
        PrecomputedJudge::from_reader("name,score\nRobert Fontana,88\nJane Doe,10\n".as_bytes())
            .expect("judge scores");
    let mut config = config();
    config.scoring.policy = ScoringPolicy::Highest;
    let engine =
        ScoringEngine::with_judge(&config, as_of(), Some(Arc::new(judge))).expect("engine");

    let fontana = RecordValidator::new()
        .validate(&fontana_raw())
        .expect("valid");
    let scored = engine.score(&fontana);
    assert_eq!(scored.score, 88);
    assert_eq!(scored.source, ScoreSource::Judge);

    let jane = validated(json!({ "name": "Jane Doe", "title": "Head of Toxicology" }));
    let scored = engine.score(&jane);
    assert_eq!(scored.score, 30);
    assert_eq!(scored.source, ScoreSource::Rules);
}
