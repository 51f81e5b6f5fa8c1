use chrono::{DateTime, Datelike, Days, Local, NaiveDate, NaiveDateTime, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::records::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Gt,
    Gte,
    Lt,
    Lte,
}

/// A date filter extracted from a query word. All bounds are calendar
/// days; candidate values are truncated to local midnight before
/// comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateCondition {
    Exact(NaiveDate),
    Range(NaiveDate, NaiveDate),
    Compare(CompareOp, NaiveDate),
}

// ISO is YYYY-MM-DD, day-first is DD-MM-YYYY or DD/MM/YYYY.
static ISO_CMP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([><]=?)(\d{4}-\d{2}-\d{2})$").unwrap());
static DAY_FIRST_CMP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([><]=?)(\d{2}[-/]\d{2}[-/]\d{4})$").unwrap());
static ISO_RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})\.\.(\d{4}-\d{2}-\d{2})$").unwrap());
static DAY_FIRST_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2}[-/]\d{2}[-/]\d{4})\.\.(\d{2}[-/]\d{2}[-/]\d{4})$").unwrap()
});
static DAY_FIRST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{2})[-/](\d{2})[-/](\d{4})$").unwrap());

/// Cheap shape test deciding whether date parsing is attempted at all.
/// A leading `@` is reserved for date keywords.
pub fn looks_like_date_word(word: &str) -> bool {
    word.starts_with('@')
        || ISO_CMP.is_match(word)
        || DAY_FIRST_CMP.is_match(word)
        || ISO_RANGE.is_match(word)
        || DAY_FIRST_RANGE.is_match(word)
}

/// Parse a date keyword (`@today`, `@week`, ...), comparison (`>2024-01-01`)
/// or range (`2024-01-01..2024-12-31`). Returns `None` when the word only
/// looks date-shaped (e.g. `@foo`, invalid day-first values), in which case
/// the token falls through to numeric/wildcard/plain detection.
pub fn parse_date_word(word: &str, today: NaiveDate) -> Option<DateCondition> {
    match word.to_lowercase().as_str() {
        "@today" => return Some(DateCondition::Exact(today)),
        "@yesterday" => return Some(DateCondition::Exact(today - Days::new(1))),
        "@week" => {
            // Sunday-to-Saturday week containing today
            let start = today - Days::new(u64::from(today.weekday().num_days_from_sunday()));
            return Some(DateCondition::Range(start, start + Days::new(6)));
        }
        "@month" => {
            let start = today.with_day(1)?;
            return Some(DateCondition::Range(start, month_end(start)));
        }
        "@year" => {
            let start = NaiveDate::from_ymd_opt(today.year(), 1, 1)?;
            let end = NaiveDate::from_ymd_opt(today.year(), 12, 31)?;
            return Some(DateCondition::Range(start, end));
        }
        _ => {}
    }

    if let Some(caps) = ISO_CMP.captures(word).or_else(|| DAY_FIRST_CMP.captures(word)) {
        let op = match &caps[1] {
            ">" => CompareOp::Gt,
            ">=" => CompareOp::Gte,
            "<" => CompareOp::Lt,
            _ => CompareOp::Lte,
        };
        let date = parse_flex_date(&caps[2])?;
        return Some(DateCondition::Compare(op, date));
    }

    if let Some(caps) = ISO_RANGE
        .captures(word)
        .or_else(|| DAY_FIRST_RANGE.captures(word))
    {
        let start = parse_flex_date(&caps[1])?;
        let end = parse_flex_date(&caps[2])?;
        return Some(DateCondition::Range(start, end));
    }

    None
}

/// Accepts ISO (`YYYY-MM-DD`) and day-first (`DD-MM-YYYY`, `DD/MM/YYYY`).
fn parse_flex_date(s: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    let caps = DAY_FIRST.captures(s)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn month_end(first: NaiveDate) -> NaiveDate {
    let next = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    next.map(|d| d - Days::new(1)).unwrap_or(first)
}

/// Interpret a candidate value as a calendar day: numbers are Unix seconds,
/// strings are parsed leniently. Both are truncated to local midnight.
pub fn value_as_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Number(n) => Local
            .timestamp_opt(*n as i64, 0)
            .single()
            .map(|dt| dt.date_naive()),
        Value::Text(s) => parse_date_string(s),
        _ => None,
    }
}

fn parse_date_string(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local).date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    let prefix = s.get(0..10).unwrap_or(s);
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

/// A value that fails to parse as a date never matches.
pub fn match_date(value: &Value, cond: &DateCondition) -> bool {
    let Some(d) = value_as_date(value) else {
        return false;
    };
    match cond {
        DateCondition::Exact(date) => d == *date,
        DateCondition::Range(start, end) => d >= *start && d <= *end,
        DateCondition::Compare(op, date) => match op {
            CompareOp::Gt => d > *date,
            CompareOp::Gte => d >= *date,
            CompareOp::Lt => d < *date,
            CompareOp::Lte => d <= *date,
        },
    }
}
