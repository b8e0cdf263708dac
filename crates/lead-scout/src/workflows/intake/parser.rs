use super::mapping::field_for_normalized;
use super::normalizer::{fallback_field, normalize_header};
use crate::workflows::leads::RawRecord;
use serde_json::{Map, Value};
use std::io::Read;

/// Parse a CSV export into raw records keyed by canonical field names.
pub(crate) fn parse_csv<R: Read>(reader: R) -> Result<Vec<RawRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let fields: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(canonical_field)
        .collect();

    let mut records = Vec::new();
    for row in csv_reader.records() {
        let row = row?;
        let mut record = Map::new();
        for (field, cell) in fields.iter().zip(row.iter()) {
            if cell.is_empty() || record.contains_key(field) {
                continue;
            }
            let value = if field == "publications" {
                parse_publications_cell(cell)
            } else {
                Value::String(cell.to_string())
            };
            record.insert(field.clone(), value);
        }
        compose_name(&mut record);
        records.push(record);
    }

    Ok(records)
}

/// Rename keys of a JSON record through the header alias table.
///
/// Values are left untouched; the first key mapping to a field wins.
pub(crate) fn canonicalize_record(source: Map<String, Value>) -> RawRecord {
    let mut record = Map::new();
    for (key, value) in source {
        if value.is_null() {
            continue;
        }
        let field = canonical_field(&key);
        if !record.contains_key(&field) {
            record.insert(field, value);
        }
    }
    compose_name(&mut record);
    record
}

fn canonical_field(header: &str) -> String {
    let normalized = normalize_header(header);
    match field_for_normalized(&normalized) {
        Some(field) => field.to_string(),
        None => fallback_field(&normalized),
    }
}

/// Build `name` from first/last name columns when no name column is present.
fn compose_name(record: &mut RawRecord) {
    if record.contains_key("name") {
        return;
    }
    let part = |key: &str| {
        record
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };
    let composed = [part("first_name"), part("last_name")]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    if !composed.is_empty() {
        record.insert("name".to_string(), Value::String(composed));
    }
}

/// `2024-03|DILI|Title; 2023|organoid` becomes an array of publication
/// objects. Missing trailing parts are omitted.
pub(crate) fn parse_publications_cell(cell: &str) -> Value {
    let entries = cell
        .split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let mut publication = Map::new();
            for (key, part) in ["date", "topic", "title"].into_iter().zip(entry.splitn(3, '|')) {
                let part = part.trim();
                if !part.is_empty() {
                    publication.insert(key.to_string(), Value::String(part.to_string()));
                }
            }
            Value::Object(publication)
        })
        .collect();
    Value::Array(entries)
}
