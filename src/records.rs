use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Unix-seconds window a bare number must fall in to be taken for a
/// date (2000-01-01 .. 2050-01-01, both exclusive).
pub const TIMESTAMP_MIN: f64 = 946_684_800.0;
pub const TIMESTAMP_MAX: f64 = 2_524_608_000.0;

static ISO_DATE_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").unwrap());

static DATE_COLUMN_HINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)date|created|updated|modified|embauche|naissance|debut|fin|start|end")
        .unwrap()
});

/// A single cell value. Untagged so JSON records round-trip naturally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Number(f64),
    Bool(bool),
    Null,
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Whether this raw value is a plausible date candidate: a number in
    /// the sane Unix-seconds window, or a string with an ISO date prefix.
    pub fn looks_like_date(&self) -> bool {
        match self {
            Value::Number(n) => *n > TIMESTAMP_MIN && *n < TIMESTAMP_MAX,
            Value::Text(s) => ISO_DATE_PREFIX.is_match(s),
            _ => false,
        }
    }

    /// Stringified form used by the text matchers. Null becomes the empty
    /// string (the evaluator drops it), integral numbers print without a
    /// decimal point.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            Value::Bool(b) => b.to_string(),
            Value::Null => String::new(),
        }
    }
}

/// One row of the collection. The id is opaque to the matching engine and
/// only reported back for selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub id: u64,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Numeric,
    Bool,
    Date,
}

impl ColumnType {
    pub fn short_label(&self) -> &'static str {
        match self {
            ColumnType::Text => "TXT",
            ColumnType::Numeric => "NUM",
            ColumnType::Bool => "BOOL",
            ColumnType::Date => "DATE",
        }
    }
}

/// Column metadata. The type is inferred from a single sampled value and
/// is advisory, for display only; matching type-switches per value.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub id: String,
    pub ty: ColumnType,
}

/// Sample the first record to build the column list.
pub fn infer_columns(records: &[Record]) -> Vec<Column> {
    let Some(first) = records.first() else {
        return Vec::new();
    };
    first
        .fields
        .iter()
        .map(|(id, value)| Column {
            id: id.clone(),
            ty: infer_type(value),
        })
        .collect()
}

fn infer_type(value: &Value) -> ColumnType {
    match value {
        Value::Number(n) if *n > TIMESTAMP_MIN && *n < TIMESTAMP_MAX => ColumnType::Date,
        Value::Number(_) => ColumnType::Numeric,
        Value::Bool(_) => ColumnType::Bool,
        Value::Text(s) if ISO_DATE_PREFIX.is_match(s) => ColumnType::Date,
        _ => ColumnType::Text,
    }
}

/// Date display locale. Matching never consults this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DateFormat {
    #[default]
    Fr,
    En,
    Iso,
}

impl DateFormat {
    pub fn format(&self, date: chrono::NaiveDate) -> String {
        match self {
            DateFormat::Fr => date.format("%d/%m/%Y").to_string(),
            DateFormat::En | DateFormat::Iso => date.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Render a value for display. Numbers in the timestamp window are shown
/// as dates when the column name suggests one, ISO date strings always.
pub fn format_value(value: &Value, column: &str, fmt: DateFormat) -> String {
    if let Value::Number(n) = value {
        if *n > TIMESTAMP_MIN && *n < TIMESTAMP_MAX && DATE_COLUMN_HINT.is_match(column) {
            if let Some(date) = crate::query::value_as_date(value) {
                return fmt.format(date);
            }
        }
    }
    if let Value::Text(s) = value {
        if ISO_DATE_PREFIX.is_match(s) {
            if let Some(date) = crate::query::value_as_date(value) {
                return fmt.format(date);
            }
        }
    }
    value.to_display_string()
}
