use std::path::PathBuf;

use clap::Parser;

use crate::query::{MatchMode, Mode};
use crate::records::DateFormat;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Search query. Supports negation (!word), phrases ("a b"), whole
    /// words ('word), regexes (/pat/), fuzzy (~word), wildcards (a*e),
    /// column scoping (word@Col1,Col2), numeric ranges (10..100, >=5) and
    /// date filters (@today, >2024-01-01, 01/01/2024..31/12/2024).
    pub query: String,

    /// Path to a CSV or JSON file holding the records
    #[clap(short, long)]
    pub input: PathBuf,

    /// Comma-separated columns to search (default: every column)
    #[clap(short, long)]
    pub columns: Option<String>,

    /// Combination mode when the query has no & / && prefix
    #[clap(long, value_enum)]
    pub logic: Option<Mode>,

    /// Match behavior applied to every word of the query
    #[clap(long = "match", value_enum)]
    pub match_mode: Option<MatchMode>,

    /// Date display locale for table output
    #[clap(long, value_enum)]
    pub date_format: Option<DateFormat>,

    /// Path to a YAML preferences file
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Only print the number of matching records
    #[clap(long, default_value = "false")]
    pub count: bool,

    /// Only print the ids of matching records
    #[clap(long, default_value = "false")]
    pub ids: bool,

    /// Print the parsed token badges before the results
    #[clap(long, default_value = "false")]
    pub badges: bool,

    /// Render results as an aligned text table instead of JSON
    #[clap(long, default_value = "false")]
    pub table: bool,
}
