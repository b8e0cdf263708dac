use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::workflows::leads::domain::{CandidateRecord, RawRecord};
use crate::workflows::leads::enrichment::company::{CompanyLookup, LookupResult};
use crate::workflows::leads::scoring::{JudgeError, LeadJudge, ScoringEngine};
use crate::workflows::leads::validation::RecordValidator;
use crate::workflows::leads::LeadScoringConfig;

pub(super) fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid as-of date")
}

pub(super) fn config() -> LeadScoringConfig {
    LeadScoringConfig::default()
}

pub(super) fn raw(value: Value) -> RawRecord {
    match value {
        Value::Object(map) => map,
        other => panic!("raw records must be objects, got {other}"),
    }
}

pub(super) fn validated(value: Value) -> CandidateRecord {
    RecordValidator::new()
        .validate(&raw(value))
        .expect("record validates")
}

pub(super) fn fontana_raw() -> RawRecord {
    raw(json!({
        "name": "Robert Fontana",
        "title": "Professor, Medical Director",
        "company": "University of Michigan",
        "publications": [{ "date": "2024-03", "topic": "DILI" }]
    }))
}

/// Fontana with technology and openness text plus a hub location.
pub(super) fn fontana_full_raw() -> RawRecord {
    let mut record = fontana_raw();
    record.insert(
        "about".to_string(),
        json!("Builds 3D organoid and in vitro liver models; champions NAMs."),
    );
    record.insert("person_location".to_string(), json!("Boston, MA"));
    record
}

pub(super) fn scoring_engine() -> ScoringEngine {
    ScoringEngine::new(&config(), as_of()).expect("rules policy needs no judge")
}

pub(super) struct SlowLookup;

impl CompanyLookup for SlowLookup {
    fn lookup(&self, _company: &str) -> LookupResult {
        thread::sleep(Duration::from_millis(400));
        LookupResult::Unknown
    }
}

/// Judge returning one fixed raw value for everybody.
pub(super) struct FixedJudge(pub(super) f64);

impl LeadJudge for FixedJudge {
    fn judge(&self, _record: &CandidateRecord) -> Result<f64, JudgeError> {
        Ok(self.0)
    }
}

pub(super) fn fixed_judge(value: f64) -> Arc<dyn LeadJudge> {
    Arc::new(FixedJudge(value))
}
