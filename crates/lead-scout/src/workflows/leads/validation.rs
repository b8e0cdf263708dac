use chrono::{DateTime, NaiveDate};
use serde_json::Value;

use super::domain::{
    CandidateRecord, CompanyType, Confidence, ContactEmail, Publication, RawRecord, WorkMode,
};
use super::enrichment::email::is_valid_email;

/// Reasons a raw record is rejected before it reaches enrichment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("required field '{field}' is missing or blank")]
    MissingField { field: &'static str },
    #[error("field '{field}' must be {expected}")]
    InvalidType {
        field: String,
        expected: &'static str,
    },
    #[error("field '{field}' has invalid value '{value}': {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: &'static str,
    },
}

impl ValidationError {
    /// Name of the offending field, for run summaries.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::MissingField { field } => field,
            ValidationError::InvalidType { field, .. } => field,
            ValidationError::InvalidValue { field, .. } => field,
        }
    }
}

/// Turns collection-layer mappings into typed candidate records.
///
/// Keys are expected in canonical form (see the intake header aliases);
/// unknown keys are ignored.
#[derive(Debug, Clone, Default)]
pub struct RecordValidator;

impl RecordValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, raw: &RawRecord) -> Result<CandidateRecord, ValidationError> {
        let name = match raw.get("name") {
            None | Some(Value::Null) => return Err(ValidationError::MissingField { field: "name" }),
            Some(Value::String(value)) if value.trim().is_empty() => {
                return Err(ValidationError::MissingField { field: "name" })
            }
            Some(Value::String(value)) => value.trim().to_string(),
            Some(_) => {
                return Err(ValidationError::InvalidType {
                    field: "name".to_string(),
                    expected: "a string",
                })
            }
        };

        let mut record = CandidateRecord::new(name);
        record.title = optional_string(raw, "title")?;
        record.company = optional_string(raw, "company")?;
        record.person_location = optional_string(raw, "person_location")?;
        record.company_hq = optional_string(raw, "company_hq")?;
        record.about = optional_string(raw, "about")?;
        record.profile_url = optional_string(raw, "profile_url")?;

        record.company_domain = optional_string(raw, "company_domain")?
            .map(|domain| domain.to_ascii_lowercase());

        if let Some(value) = optional_string(raw, "company_type")? {
            record.company_type = Some(CompanyType::parse(&value).ok_or_else(|| {
                ValidationError::InvalidValue {
                    field: "company_type".to_string(),
                    value,
                    reason: "expected pharma, biotech, academic or other",
                }
            })?);
        }

        if let Some(value) = optional_string(raw, "work_mode")? {
            let work_mode =
                WorkMode::parse(&value).ok_or_else(|| ValidationError::InvalidValue {
                    field: "work_mode".to_string(),
                    value,
                    reason: "expected remote, onsite or unknown",
                })?;
            if work_mode != WorkMode::Unknown {
                record.work_mode = work_mode;
                record.work_mode_confidence =
                    Some(confidence(raw, "work_mode_confidence")?.unwrap_or(Confidence::Verified));
            }
        }

        if let Some(address) = optional_string(raw, "email")? {
            if !is_valid_email(&address) {
                return Err(ValidationError::InvalidValue {
                    field: "email".to_string(),
                    value: address,
                    reason: "not a syntactically valid address",
                });
            }
            record.email = Some(ContactEmail {
                address,
                confidence: confidence(raw, "email_confidence")?.unwrap_or(Confidence::Verified),
            });
        }

        record.publications = publications(raw)?;

        Ok(record)
    }
}

fn optional_string(raw: &RawRecord, field: &str) -> Result<Option<String>, ValidationError> {
    match raw.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => {
            let trimmed = value.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        Some(_) => Err(ValidationError::InvalidType {
            field: field.to_string(),
            expected: "a string",
        }),
    }
}

fn confidence(raw: &RawRecord, field: &str) -> Result<Option<Confidence>, ValidationError> {
    optional_string(raw, field)?
        .map(|value| {
            Confidence::parse(&value).ok_or_else(|| ValidationError::InvalidValue {
                field: field.to_string(),
                value,
                reason: "expected verified or inferred",
            })
        })
        .transpose()
}

fn publications(raw: &RawRecord) -> Result<Vec<Publication>, ValidationError> {
    let items = match raw.get("publications") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(ValidationError::InvalidType {
                field: "publications".to_string(),
                expected: "an array",
            })
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| publication(index, item))
        .collect()
}

fn publication(index: usize, item: &Value) -> Result<Publication, ValidationError> {
    let field = |name: &str| format!("publications[{index}].{name}");

    let entry = match item {
        Value::String(title) => {
            return Ok(Publication {
                title: Some(title.trim().to_string()).filter(|title| !title.is_empty()),
                ..Publication::default()
            })
        }
        Value::Object(entry) => entry,
        _ => {
            return Err(ValidationError::InvalidType {
                field: format!("publications[{index}]"),
                expected: "an object or a title string",
            })
        }
    };

    let text = |name: &str| -> Result<Option<String>, ValidationError> {
        optional_string(entry, name).map_err(|_| ValidationError::InvalidType {
            field: field(name),
            expected: "a string",
        })
    };

    let date_value = entry.get("date").or_else(|| entry.get("published_on"));
    let published_on = match date_value {
        None | Some(Value::Null) => None,
        Some(Value::Number(year)) => {
            let parsed = year
                .as_i64()
                .and_then(|year| i32::try_from(year).ok())
                .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1));
            Some(parsed.ok_or_else(|| ValidationError::InvalidValue {
                field: field("date"),
                value: year.to_string(),
                reason: "not a calendar year",
            })?)
        }
        Some(Value::String(raw_date)) if raw_date.trim().is_empty() => None,
        Some(Value::String(raw_date)) => Some(parse_publication_date(raw_date).ok_or_else(
            || ValidationError::InvalidValue {
                field: field("date"),
                value: raw_date.clone(),
                reason: "expected YYYY, YYYY-MM or YYYY-MM-DD",
            },
        )?),
        Some(_) => {
            return Err(ValidationError::InvalidType {
                field: field("date"),
                expected: "a date string or year",
            })
        }
    };

    Ok(Publication {
        title: text("title")?,
        published_on,
        topic: text("topic")?,
    })
}

/// Partial dates resolve to the first day of their period.
pub(crate) fn parse_publication_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc().date());
    }

    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }

    let mut parts = trimmed.split(['-', '/']);
    let year = parts.next()?;
    if year.len() != 4 {
        return None;
    }
    let year: i32 = year.parse().ok()?;
    match (parts.next(), parts.next()) {
        (None, _) => NaiveDate::from_ymd_opt(year, 1, 1),
        (Some(month), None) => NaiveDate::from_ymd_opt(year, month.parse().ok()?, 1),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publication_dates_accept_partial_forms() {
        let ymd = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).expect("valid");
        assert_eq!(parse_publication_date("2024"), Some(ymd(2024, 1, 1)));
        assert_eq!(parse_publication_date("2024-03"), Some(ymd(2024, 3, 1)));
        assert_eq!(parse_publication_date("2024/03"), Some(ymd(2024, 3, 1)));
        assert_eq!(parse_publication_date("2024-03-15"), Some(ymd(2024, 3, 15)));
        assert_eq!(parse_publication_date("2024/03/15"), Some(ymd(2024, 3, 15)));
        assert_eq!(
            parse_publication_date("2024-03-15T10:00:00Z"),
            Some(ymd(2024, 3, 15))
        );
        assert!(parse_publication_date("  ").is_none());
        assert!(parse_publication_date("2024-13").is_none());
        assert!(parse_publication_date("March 2024").is_none());
        assert!(parse_publication_date("24-03").is_none());
    }
}
