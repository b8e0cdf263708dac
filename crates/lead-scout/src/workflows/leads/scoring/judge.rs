use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use super::super::domain::CandidateRecord;
use super::super::keywords::normalize_text;
use super::super::timeout::{call_with_timeout, CallInterrupted};

/// External scorer consulted under the `judge` and `highest` policies.
pub trait LeadJudge: Send + Sync {
    /// Raw relevance estimate; expected within 0..=100.
    fn judge(&self, record: &CandidateRecord) -> Result<f64, JudgeError>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum JudgeError {
    #[error("no judge score for '{0}'")]
    NoScore(String),
    #[error("judge returned a non-finite score")]
    NotFinite,
    #[error("judge score {0} outside 0..=100")]
    OutOfRange(f64),
    #[error("judge did not answer within {0:?}")]
    TimedOut(Duration),
    #[error("judge failed: {0}")]
    Failed(String),
}

/// Validate and round a raw judge value.
pub(crate) fn normalize_judge_score(raw: f64) -> Result<u8, JudgeError> {
    if !raw.is_finite() {
        return Err(JudgeError::NotFinite);
    }
    if !(0.0..=100.0).contains(&raw) {
        return Err(JudgeError::OutOfRange(raw));
    }
    Ok(raw.round() as u8)
}

#[derive(Debug, thiserror::Error)]
pub enum JudgeLoadError {
    #[error("failed to open judge scores {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read judge scores: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Deserialize)]
struct ScoreRow {
    name: String,
    score: f64,
}

/// Judge backed by scores computed ahead of time, keyed by normalized name.
#[derive(Debug, Clone, Default)]
pub struct PrecomputedJudge {
    scores: HashMap<String, f64>,
}

impl PrecomputedJudge {
    pub fn from_path(path: &Path) -> Result<Self, JudgeLoadError> {
        let file = File::open(path).map_err(|source| JudgeLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    /// Reads a `name,score` CSV. Later rows win on repeated names.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, JudgeLoadError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut scores = HashMap::new();
        for row in csv_reader.deserialize::<ScoreRow>() {
            let row = row?;
            let key = normalize_text(&row.name);
            if !key.is_empty() {
                scores.insert(key, row.score);
            }
        }
        Ok(Self { scores })
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

impl LeadJudge for PrecomputedJudge {
    fn judge(&self, record: &CandidateRecord) -> Result<f64, JudgeError> {
        self.scores
            .get(&normalize_text(&record.name))
            .copied()
            .ok_or_else(|| JudgeError::NoScore(record.name.clone()))
    }
}

/// Judge wrapper enforcing the configured answer deadline.
#[derive(Clone)]
pub struct TimedJudge {
    inner: Arc<dyn LeadJudge>,
    timeout: Duration,
}

impl TimedJudge {
    pub fn new(inner: Arc<dyn LeadJudge>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

impl LeadJudge for TimedJudge {
    fn judge(&self, record: &CandidateRecord) -> Result<f64, JudgeError> {
        let inner = Arc::clone(&self.inner);
        let record = record.clone();
        match call_with_timeout(self.timeout, move || inner.judge(&record)) {
            Ok(result) => result,
            Err(CallInterrupted::TimedOut(limit)) => Err(JudgeError::TimedOut(limit)),
            Err(CallInterrupted::Aborted) => Err(JudgeError::Failed("judge panicked".to_string())),
        }
    }
}
