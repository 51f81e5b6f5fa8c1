use std::collections::BTreeMap;
use std::path::Path;

use crate::records::{Record, Value};

#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("io error: {0:?}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0:?}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0:?}")]
    Json(#[from] serde_json::Error),

    #[error("expected a json array of objects")]
    JsonShape,

    #[error("unsupported source format: {0}")]
    UnsupportedFormat(String),
}

/// Load a record collection from a CSV or JSON file, by extension.
pub fn load(path: &Path) -> Result<Vec<Record>, SourceError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_lowercase();
    let records = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        other => return Err(SourceError::UnsupportedFormat(other.to_string())),
    };
    log::info!("loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Headers become column names. Cells are typed by inference: empty →
/// null, `true`/`false` → bool, parseable float → number, else text. An
/// `id` column supplies record ids, otherwise the 1-based row position.
fn load_csv(path: &Path) -> Result<Vec<Record>, SourceError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut records = Vec::new();
    for (idx, row) in reader.records().enumerate() {
        let row = row?;
        let mut id = (idx + 1) as u64;
        let mut fields = BTreeMap::new();
        for (header, cell) in headers.iter().zip(row.iter()) {
            if header == "id" {
                if let Ok(parsed) = cell.parse::<u64>() {
                    id = parsed;
                }
                continue;
            }
            fields.insert(header.clone(), parse_cell(cell));
        }
        records.push(Record { id, fields });
    }
    Ok(records)
}

fn parse_cell(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    match raw {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(n) = raw.parse::<f64>() {
        return Value::Number(n);
    }
    Value::Text(raw.to_string())
}

/// A JSON array of flat objects. A numeric `id` member supplies the record
/// id; nested values are kept as their JSON text.
fn load_json(path: &Path) -> Result<Vec<Record>, SourceError> {
    let file = std::fs::File::open(path)?;
    let parsed: serde_json::Value = serde_json::from_reader(std::io::BufReader::new(file))?;
    let serde_json::Value::Array(rows) = parsed else {
        return Err(SourceError::JsonShape);
    };

    let mut records = Vec::new();
    for (idx, row) in rows.into_iter().enumerate() {
        let serde_json::Value::Object(map) = row else {
            return Err(SourceError::JsonShape);
        };
        let mut id = (idx + 1) as u64;
        let mut fields = BTreeMap::new();
        for (key, value) in map {
            if key == "id" {
                if let Some(parsed) = value.as_u64() {
                    id = parsed;
                }
                continue;
            }
            fields.insert(key, convert_json(value));
        }
        records.push(Record { id, fields });
    }
    Ok(records)
}

fn convert_json(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => Value::Text(s),
        other => Value::Text(other.to_string()),
    }
}
