use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod query;
mod records;
mod source;

use config::Config;
use query::FilterContext;

pub fn parse_columns(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();
    let config = Config::load(args.config.as_deref())?;

    let records = source::load(&args.input)?;
    let columns = records::infer_columns(&records);
    for col in &columns {
        log::debug!("column {} [{}]", col.id, col.ty.short_label());
    }

    let active_columns = match &args.columns {
        Some(raw) => parse_columns(raw),
        None => columns
            .iter()
            .map(|c| c.id.clone())
            .filter(|id| !config.hidden_columns.contains(id))
            .collect(),
    };

    let ctx = FilterContext {
        active_columns,
        logic_mode: args.logic.unwrap_or(config.logic_mode),
        match_mode: args.match_mode.unwrap_or(config.match_mode),
    };

    let outcome = query::filter(&records, &args.query, &ctx);

    if args.badges {
        for badge in &outcome.tokens {
            println!("{}", serde_json::to_string(badge)?);
        }
    }

    if args.count {
        println!("{} records matched", outcome.matched.len());
        return Ok(());
    }

    if args.ids {
        let ids: Vec<String> = outcome.matched_ids.iter().map(u64::to_string).collect();
        println!("{}", ids.join(","));
        return Ok(());
    }

    if args.table {
        let date_format = args.date_format.unwrap_or(config.date_format);
        print_table(&outcome.matched, &ctx.active_columns, date_format);
        return Ok(());
    }

    println!("{}", serde_json::to_string_pretty(&outcome.matched)?);
    Ok(())
}

fn print_table(matched: &[records::Record], columns: &[String], fmt: records::DateFormat) {
    let mut widths: Vec<usize> = columns.iter().map(String::len).collect();
    let rows: Vec<Vec<String>> = matched
        .iter()
        .map(|record| {
            columns
                .iter()
                .enumerate()
                .map(|(i, col)| {
                    let cell = record
                        .fields
                        .get(col)
                        .map(|v| records::format_value(v, col, fmt))
                        .unwrap_or_default();
                    widths[i] = widths[i].max(cell.chars().count());
                    cell
                })
                .collect()
        })
        .collect();

    let header: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| format!("{col:<width$}", width = widths[i]))
        .collect();
    println!("{}", header.join("  "));

    for row in rows {
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{cell:<width$}", width = widths[i]))
            .collect();
        println!("{}", line.join("  "));
    }
}
