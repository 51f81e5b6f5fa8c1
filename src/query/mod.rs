mod date;
mod eval;
mod matchers;
mod parser;

use serde::{Deserialize, Serialize};

use crate::records::Record;

pub use date::value_as_date;
pub use eval::matches;
pub use parser::{parse, Mode, ParsedQuery, Token, TokenKind};

/// Per-word match behavior applied by the driver before parsing:
/// `starts` prepends `<`, `exact` prepends `=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    #[default]
    Contains,
    Starts,
    Exact,
}

/// Everything a filter pass needs from the caller. Built fresh per
/// invocation; the engine holds no state between calls.
#[derive(Debug, Clone, Default)]
pub struct FilterContext {
    pub active_columns: Vec<String>,
    pub logic_mode: Mode,
    pub match_mode: MatchMode,
}

/// Display category for caller-side badging, by priority
/// negate > date > numeric > fuzzy > wildcard > phrase > plain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenCategory {
    Negated,
    Date,
    Numeric,
    Fuzzy,
    Wildcard,
    Phrase,
    Plain,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenBadge {
    pub raw: String,
    pub negate: bool,
    pub category: TokenCategory,
}

#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    /// Matched records in input order.
    pub matched: Vec<Record>,
    /// Ids of the matched records, for host selection reporting.
    pub matched_ids: Vec<u64>,
    /// One badge per parsed token, for highlighting.
    pub tokens: Vec<TokenBadge>,
}

/// Run one filter pass: build the effective query from the context's match
/// and logic modes, parse it, and scan every record in order. A
/// whitespace-only query yields the empty outcome. Never fails: malformed
/// tokens degrade to "no match" for the affected values.
pub fn filter(records: &[Record], raw: &str, ctx: &FilterContext) -> FilterOutcome {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return FilterOutcome::default();
    }

    let effective = build_query(trimmed, ctx);
    let parsed = parse(&effective, ctx.logic_mode);

    let matched: Vec<Record> = records
        .iter()
        .filter(|r| eval::matches(r, &parsed, &ctx.active_columns))
        .cloned()
        .collect();
    let matched_ids = matched.iter().map(|r| r.id).collect();
    let tokens = parsed.tokens.iter().map(badge).collect();

    FilterOutcome {
        matched,
        matched_ids,
        tokens,
    }
}

fn build_query(raw: &str, ctx: &FilterContext) -> String {
    let modifier = match ctx.match_mode {
        MatchMode::Contains => "",
        MatchMode::Starts => "<",
        MatchMode::Exact => "=",
    };
    let prefix = if ctx.logic_mode == Mode::And { "& " } else { "" };
    let words: Vec<String> = raw
        .split_whitespace()
        .map(|w| format!("{modifier}{w}"))
        .collect();
    format!("{prefix}{}", words.join(" "))
}

fn badge(token: &Token) -> TokenBadge {
    let category = if token.negate {
        TokenCategory::Negated
    } else {
        match &token.kind {
            TokenKind::Date(_) => TokenCategory::Date,
            TokenKind::Numeric(_) => TokenCategory::Numeric,
            TokenKind::Fuzzy => TokenCategory::Fuzzy,
            TokenKind::Wildcard => TokenCategory::Wildcard,
            TokenKind::Phrase => TokenCategory::Phrase,
            _ => TokenCategory::Plain,
        }
    };
    TokenBadge {
        raw: token.raw.clone(),
        negate: token.negate,
        category,
    }
}
