use crate::records::{Record, Value};

use super::date;
use super::matchers;
use super::parser::{Mode, ParsedQuery, Token, TokenKind};

/// Decide match/no-match for one record. An empty token sequence never
/// matches: filtering requires an explicit query.
pub fn matches(record: &Record, query: &ParsedQuery, active: &[String]) -> bool {
    if query.tokens.is_empty() {
        return false;
    }
    match query.mode {
        Mode::Or => query.tokens.iter().any(|t| eval_token(record, t, active)),
        Mode::And => query.tokens.iter().all(|t| eval_token(record, t, active)),
        // All tokens must co-occur within one column of the active set.
        Mode::AndPerColumn => active.iter().any(|col| {
            let single = std::slice::from_ref(col);
            query.tokens.iter().all(|t| eval_token(record, t, single))
        }),
    }
}

fn eval_token(record: &Record, token: &Token, active: &[String]) -> bool {
    let cols: &[String] = if token.cols.is_empty() {
        active
    } else {
        &token.cols
    };

    let hit = match &token.kind {
        TokenKind::Date(cond) => {
            let candidates: Vec<&Value> = cols
                .iter()
                .filter_map(|c| record.fields.get(c))
                .filter(|v| v.looks_like_date())
                .collect();
            if candidates.is_empty() {
                // Nothing to exclude: a negated token with no applicable
                // columns counts as satisfied.
                return token.negate;
            }
            candidates.into_iter().any(|v| date::match_date(v, cond))
        }
        TokenKind::Numeric(range) => {
            let candidates: Vec<f64> = cols
                .iter()
                .filter_map(|c| record.fields.get(c))
                .filter_map(Value::as_number)
                .collect();
            if candidates.is_empty() {
                return token.negate;
            }
            candidates.iter().any(|n| range.matches(*n))
        }
        _ => {
            let candidates: Vec<String> = cols
                .iter()
                .map(|c| {
                    record
                        .fields
                        .get(c)
                        .map(Value::to_display_string)
                        .unwrap_or_default()
                })
                .filter(|s| !s.is_empty())
                .collect();
            candidates.iter().any(|v| matchers::match_value(v, token))
        }
    };

    if token.negate {
        !hit
    } else {
        hit
    }
}
