use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use super::parser::{Modifier, Token, TokenKind};

/// A numeric filter extracted from a query word. Range bounds are
/// inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericRange {
    Range { min: f64, max: f64 },
    Gt(f64),
    Gte(f64),
    Lt(f64),
    Lte(f64),
}

static NUM_RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)?)\.\.(\d+(?:\.\d+)?)$").unwrap());
static NUM_GT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(>=?)(\d+(?:\.\d+)?)$").unwrap());
static NUM_LT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(<=?)(\d+(?:\.\d+)?)$").unwrap());
static NUM_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(?:\.\d+)?\.\.|^[><]=?\d").unwrap());

/// Cheap shape test deciding whether numeric parsing is attempted.
pub fn looks_like_numeric_word(word: &str) -> bool {
    NUM_SHAPE.is_match(word)
}

pub fn parse_numeric_range(word: &str) -> Option<NumericRange> {
    if let Some(caps) = NUM_RANGE.captures(word) {
        return Some(NumericRange::Range {
            min: caps[1].parse().ok()?,
            max: caps[2].parse().ok()?,
        });
    }
    if let Some(caps) = NUM_GT.captures(word) {
        let value = caps[2].parse().ok()?;
        return Some(if &caps[1] == ">=" {
            NumericRange::Gte(value)
        } else {
            NumericRange::Gt(value)
        });
    }
    if let Some(caps) = NUM_LT.captures(word) {
        let value = caps[2].parse().ok()?;
        return Some(if &caps[1] == "<=" {
            NumericRange::Lte(value)
        } else {
            NumericRange::Lt(value)
        });
    }
    None
}

impl NumericRange {
    pub fn matches(&self, n: f64) -> bool {
        match self {
            NumericRange::Range { min, max } => n >= *min && n <= *max,
            NumericRange::Gt(v) => n > *v,
            NumericRange::Gte(v) => n >= *v,
            NumericRange::Lt(v) => n < *v,
            NumericRange::Lte(v) => n <= *v,
        }
    }
}

/// Run a token's text matcher against one stringified value. Comparisons
/// are case-insensitive. Date and numeric kinds are routed by the
/// evaluator against raw typed values, never here.
pub fn match_value(value: &str, token: &Token) -> bool {
    match &token.kind {
        TokenKind::Regex => RegexBuilder::new(&token.word)
            .case_insensitive(true)
            .build()
            .map(|rx| rx.is_match(value))
            .unwrap_or(false),
        TokenKind::Wildcard => wildcard_match(value, &token.word),
        TokenKind::Fuzzy => fuzzy_match(value, &token.word),
        TokenKind::Phrase => value.to_lowercase().contains(&token.word.to_lowercase()),
        TokenKind::Plain(Modifier::Equals) => value.to_lowercase() == token.word.to_lowercase(),
        TokenKind::Plain(Modifier::StartsWith) => {
            value.to_lowercase().starts_with(&token.word.to_lowercase())
        }
        TokenKind::Plain(Modifier::EndsWith) => {
            value.to_lowercase().ends_with(&token.word.to_lowercase())
        }
        TokenKind::WholeWord => whole_word_match(value, &token.word),
        TokenKind::Plain(Modifier::None) => {
            value.to_lowercase().contains(&token.word.to_lowercase())
        }
        TokenKind::Date(_) | TokenKind::Numeric(_) => false,
    }
}

fn wildcard_to_regex(pattern: &str) -> Option<Regex> {
    // `*` = any sequence, `?` = any single character
    let escaped = regex::escape(pattern)
        .replace(r"\*", ".*")
        .replace(r"\?", ".");
    RegexBuilder::new(&format!("^{escaped}$"))
        .case_insensitive(true)
        .build()
        .ok()
}

/// The pattern must cover the whole value, or any single
/// whitespace-delimited word within it.
pub fn wildcard_match(value: &str, pattern: &str) -> bool {
    let Some(rx) = wildcard_to_regex(pattern) else {
        return false;
    };
    rx.is_match(value) || value.split_whitespace().any(|w| rx.is_match(w))
}

/// Substring hit short-circuits. Otherwise each word of the value, capped
/// to `max(query_len, 5)` characters, must be within
/// `min(2, query_len / 3)` edits of the query word. Words shorter than 3
/// characters on either side never fuzzy-match.
pub fn fuzzy_match(value: &str, word: &str) -> bool {
    let v = value.to_lowercase();
    let w = word.to_lowercase();
    if v.contains(&w) {
        return true;
    }
    let w_len = w.chars().count();
    if w_len < 3 {
        return false;
    }
    let budget = 2.min(w_len / 3);
    let keep = w_len.max(5);
    v.split_whitespace()
        .filter(|cand| cand.chars().count() >= 3)
        .any(|cand| {
            let truncated: String = cand.chars().take(keep).collect();
            levenshtein(&truncated, &w) <= budget
        })
}

pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        cur[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            cur[j + 1] = if ca == cb {
                prev[j]
            } else {
                1 + prev[j].min(prev[j + 1]).min(cur[j])
            };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// The word must be bounded by non-word characters (or the value edges)
/// on both sides. Implemented by boundary scan since the regex crate has
/// no lookaround.
pub fn whole_word_match(value: &str, word: &str) -> bool {
    let v = value.to_lowercase();
    let w = word.to_lowercase();
    if w.is_empty() {
        return false;
    }
    v.match_indices(&w).any(|(idx, hit)| {
        let before_ok = v[..idx]
            .chars()
            .next_back()
            .map_or(true, |c| !is_word_char(c));
        let after_ok = v[idx + hit.len()..]
            .chars()
            .next()
            .map_or(true, |c| !is_word_char(c));
        before_ok && after_ok
    })
}
