//! Loading raw candidate records from collection-layer exports.
//!
//! CSV exports go through the header alias table; JSON input is either an
//! array of objects or an object with a `records` array.

mod mapping;
mod normalizer;
mod parser;

use crate::workflows::leads::RawRecord;
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use tracing::debug;

#[derive(Debug)]
pub enum IntakeError {
    Io(std::io::Error),
    Csv(csv::Error),
    Json(serde_json::Error),
    Shape(String),
}

impl std::fmt::Display for IntakeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntakeError::Io(err) => write!(f, "failed to read lead input: {}", err),
            IntakeError::Csv(err) => write!(f, "invalid lead CSV data: {}", err),
            IntakeError::Json(err) => write!(f, "invalid lead JSON data: {}", err),
            IntakeError::Shape(detail) => write!(f, "unexpected lead JSON layout: {}", detail),
        }
    }
}

impl std::error::Error for IntakeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IntakeError::Io(err) => Some(err),
            IntakeError::Csv(err) => Some(err),
            IntakeError::Json(err) => Some(err),
            IntakeError::Shape(_) => None,
        }
    }
}

impl From<std::io::Error> for IntakeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for IntakeError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<serde_json::Error> for IntakeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeFormat {
    Csv,
    Json,
}

impl IntakeFormat {
    /// `.json` files are JSON; everything else is treated as CSV.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Csv,
        }
    }
}

pub struct LeadIntake;

impl LeadIntake {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<RawRecord>, IntakeError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let records =
            Self::from_reader(std::io::BufReader::new(file), IntakeFormat::for_path(path))?;
        debug!(path = %path.display(), records = records.len(), "lead input loaded");
        Ok(records)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        format: IntakeFormat,
    ) -> Result<Vec<RawRecord>, IntakeError> {
        match format {
            IntakeFormat::Csv => Ok(parser::parse_csv(reader)?),
            IntakeFormat::Json => Self::from_json(serde_json::from_reader(reader)?),
        }
    }

    /// Accepts an array of objects or `{"records": [...]}`.
    pub fn from_json(value: Value) -> Result<Vec<RawRecord>, IntakeError> {
        let items = match value {
            Value::Array(items) => items,
            Value::Object(mut object) => match object.remove("records") {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(IntakeError::Shape(
                        "object input needs a 'records' array".to_string(),
                    ))
                }
            },
            _ => {
                return Err(IntakeError::Shape(
                    "expected an array of records".to_string(),
                ))
            }
        };

        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(map) => Ok(parser::canonicalize_record(map)),
                _ => Err(IntakeError::Shape(format!("record {index} is not an object"))),
            })
            .collect()
    }
}
