use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::date::{self, DateCondition};
use super::matchers::{self, NumericRange};

/// Boolean rule reducing per-token hits to a record verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    #[default]
    Or,
    And,
    AndPerColumn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    None,
    Equals,
    StartsWith,
    EndsWith,
}

/// The single matcher governing a token's evaluation. Detection order is
/// deterministic (see `parse`); exactly one kind applies per token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Plain(Modifier),
    Phrase,
    WholeWord,
    Regex,
    Wildcard,
    Fuzzy,
    Date(DateCondition),
    Numeric(NumericRange),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Unit text as typed, for caller-side highlighting.
    pub raw: String,
    /// Search word after prefix stripping.
    pub word: String,
    pub negate: bool,
    /// Explicit column scope; empty means "use the active columns".
    pub cols: Vec<String>,
    pub kind: TokenKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuery {
    pub tokens: Vec<Token>,
    pub mode: Mode,
}

// One unit per iteration, first branch wins: quoted phrase, single-quoted
// whole word, slash-delimited regex, bare word.
static UNIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([^"]+)"|'(\S+)|/([^/]+)/|(\S+)"#).unwrap());

// `<`/`>` followed by digits reads as a numeric/date comparator, not as a
// starts-with/ends-with modifier.
static LT_NUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^<=?\d").unwrap());
static GT_NUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^>=?\d").unwrap());

/// Parse a raw query string. A leading `&&` forces AND-per-column, `&`
/// forces AND, otherwise the caller's default mode applies.
pub fn parse(raw: &str, default_mode: Mode) -> ParsedQuery {
    parse_at(raw, default_mode, chrono::Local::now().date_naive())
}

/// Same as `parse` with an explicit "today" so relative date keywords are
/// deterministic under test.
pub fn parse_at(raw: &str, default_mode: Mode, today: NaiveDate) -> ParsedQuery {
    let mut s = raw.trim();
    let mut mode = default_mode;
    if let Some(rest) = s.strip_prefix("&&") {
        mode = Mode::AndPerColumn;
        s = rest.trim();
    } else if let Some(rest) = s.strip_prefix('&') {
        mode = Mode::And;
        s = rest.trim();
    }

    let mut tokens = Vec::new();
    for caps in UNIT.captures_iter(s) {
        let raw_tok = caps.get(0).map(|m| m.as_str()).unwrap_or_default();

        let (mut word, phrase, whole, is_regex) = if let Some(m) = caps.get(1) {
            (m.as_str().to_string(), true, false, false)
        } else if let Some(m) = caps.get(2) {
            (m.as_str().to_string(), false, true, false)
        } else if let Some(m) = caps.get(3) {
            (m.as_str().to_string(), false, false, true)
        } else {
            let m = caps.get(4).map(|m| m.as_str()).unwrap_or_default();
            (m.to_string(), false, false, false)
        };

        let mut negate = false;
        if let Some(rest) = word.strip_prefix('!') {
            negate = true;
            word = rest.to_string();
        }

        // Fuzzy wins over modifiers; the two are mutually exclusive.
        let mut fuzzy = false;
        let mut modifier = Modifier::None;
        if let Some(rest) = word.strip_prefix('~') {
            fuzzy = true;
            word = rest.to_string();
        } else if let Some(rest) = word.strip_prefix('=') {
            modifier = Modifier::Equals;
            word = rest.to_string();
        } else if word.starts_with('<') && !LT_NUMERIC.is_match(&word) {
            modifier = Modifier::StartsWith;
            word.remove(0);
        } else if word.starts_with('>') && !GT_NUMERIC.is_match(&word) {
            modifier = Modifier::EndsWith;
            word.remove(0);
        }

        // Column scope: value@Col1,Col2. A leading `@` is a date keyword,
        // never a scope marker.
        let mut cols: Vec<String> = Vec::new();
        if let Some(at) = word.find('@') {
            if at > 0 {
                cols = word[at + 1..]
                    .split(',')
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect();
                word.truncate(at);
            }
        }

        let date_cond = if date::looks_like_date_word(&word) {
            date::parse_date_word(&word, today)
        } else {
            None
        };

        let num_range = if date_cond.is_none() && matchers::looks_like_numeric_word(&word) {
            matchers::parse_numeric_range(&word)
        } else {
            None
        };

        let wildcard = !is_regex
            && date_cond.is_none()
            && num_range.is_none()
            && (word.contains('*') || word.contains('?'));

        // Typed date/numeric conditions govern even for slash-delimited
        // units; only a word with neither shape is kept as a pattern.
        let kind = if let Some(cond) = date_cond {
            TokenKind::Date(cond)
        } else if let Some(range) = num_range {
            TokenKind::Numeric(range)
        } else if is_regex {
            TokenKind::Regex
        } else if wildcard {
            TokenKind::Wildcard
        } else if fuzzy {
            TokenKind::Fuzzy
        } else if phrase {
            TokenKind::Phrase
        } else if modifier != Modifier::None {
            TokenKind::Plain(modifier)
        } else if whole {
            TokenKind::WholeWord
        } else {
            TokenKind::Plain(Modifier::None)
        };

        if word.is_empty() {
            continue;
        }
        tokens.push(Token {
            raw: raw_tok.to_string(),
            word,
            negate,
            cols,
            kind,
        });
    }

    ParsedQuery { tokens, mode }
}
