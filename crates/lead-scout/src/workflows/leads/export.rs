//! Flat lead rows for the presentation layer, as CSV or JSON.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::domain::{CompanyType, Confidence, CriterionKind, ScoreSource, WorkMode};
use super::ranking::{PriorityTier, RankedLead};

/// Column order of the CSV export.
pub const LEAD_COLUMNS: [&str; 17] = [
    "rank",
    "name",
    "title",
    "company",
    "person_location",
    "company_hq",
    "work_mode",
    "work_mode_confidence",
    "email",
    "email_confidence",
    "publication_count",
    "score",
    "contributing_criteria",
    "priority",
    "company_type",
    "score_source",
    "profile_url",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRow {
    pub rank: usize,
    pub name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub person_location: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub company_hq: Option<String>,
    #[serde(default)]
    pub work_mode: WorkMode,
    /// `inferred` when the work mode came from the keyword heuristic.
    #[serde(default)]
    pub work_mode_confidence: Option<Confidence>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub email_confidence: Option<Confidence>,
    pub publication_count: usize,
    pub score: u8,
    #[serde(
        default,
        serialize_with = "serialize_criteria",
        deserialize_with = "deserialize_criteria"
    )]
    pub contributing_criteria: Vec<CriterionKind>,
    pub priority: PriorityTier,
    #[serde(default)]
    pub company_type: Option<CompanyType>,
    pub score_source: ScoreSource,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub profile_url: Option<String>,
}

impl LeadRow {
    pub fn from_ranked(lead: &RankedLead) -> Self {
        let record = &lead.scored.record;
        Self {
            rank: lead.rank,
            name: record.name.clone(),
            title: record.title.clone(),
            company: record.company.clone(),
            person_location: record.person_location.clone(),
            company_hq: record.company_hq.clone(),
            work_mode: record.work_mode,
            work_mode_confidence: record.work_mode_confidence,
            email: record.email.as_ref().map(|email| email.address.clone()),
            email_confidence: record.email.as_ref().map(|email| email.confidence),
            publication_count: record.publications.len(),
            score: lead.scored.score,
            contributing_criteria: lead.scored.contributing_criteria(),
            priority: lead.priority,
            company_type: record.company_type,
            score_source: lead.scored.source,
            profile_url: record.profile_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// `.json` files are JSON; everything else is CSV.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Csv,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to open {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write leads: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid lead CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid lead JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn write_rows<W: Write>(
    rows: &[LeadRow],
    format: ExportFormat,
    writer: W,
) -> Result<(), ExportError> {
    match format {
        ExportFormat::Csv => write_csv(rows, writer),
        ExportFormat::Json => write_json(rows, writer),
    }
}

/// Header row is always written, even for an empty export.
pub fn write_csv<W: Write>(rows: &[LeadRow], writer: W) -> Result<(), ExportError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(LEAD_COLUMNS)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(rows: &[LeadRow], mut writer: W) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(&mut writer, rows)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

pub fn read_rows<R: Read>(reader: R, format: ExportFormat) -> Result<Vec<LeadRow>, ExportError> {
    match format {
        ExportFormat::Csv => {
            let mut csv_reader = csv::Reader::from_reader(reader);
            let rows = csv_reader
                .deserialize::<LeadRow>()
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        }
        ExportFormat::Json => Ok(serde_json::from_reader(reader)?),
    }
}

pub fn write_path(rows: &[LeadRow], path: &Path, format: ExportFormat) -> Result<(), ExportError> {
    let file = File::create(path).map_err(|source| ExportError::File {
        path: path.to_path_buf(),
        source,
    })?;
    write_rows(rows, format, BufWriter::new(file))
}

pub fn read_path(path: &Path) -> Result<Vec<LeadRow>, ExportError> {
    let file = File::open(path).map_err(|source| ExportError::File {
        path: path.to_path_buf(),
        source,
    })?;
    read_rows(BufReader::new(file), ExportFormat::for_path(path))
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn serialize_criteria<S>(criteria: &[CriterionKind], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let joined = criteria
        .iter()
        .map(|criterion| criterion.id())
        .collect::<Vec<_>>()
        .join(";");
    serializer.serialize_str(&joined)
}

fn deserialize_criteria<'de, D>(deserializer: D) -> Result<Vec<CriterionKind>, D::Error>
where
    D: Deserializer<'de>,
{
    let joined = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    joined
        .split(';')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            CriterionKind::from_id(id)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown criterion '{id}'")))
        })
        .collect()
}
