//! Fundamentals scorer: re-scores an existing table against its own population
//! and optionally prints a blended ranking.
//!
//! Usage example (CLI):
//! ```bash
//! fundamentals_score ./sp500_scored.json --top 20 --metric "P/E Ratio" --metric ROE
//! ```
#![warn(missing_docs)]
mod args;

use std::path::{Path, PathBuf};

use clap::Parser;
use fundamentals_common::ranking::{self, RankedEntry};
use fundamentals_common::scoring::score_table;
use fundamentals_common::{metric, FundamentalsError, Result, Table};
use log::info;

use crate::args::Args;

/// Result of one scoring run.
#[derive(Debug)]
struct Report {
    scored: usize,
    output: PathBuf,
    ranking: Vec<RankedEntry>,
}

fn main() -> Result<(), FundamentalsError> {
    init_logger();
    let args = Args::parse();
    let report = run(&args)?;

    for (place, entry) in report.ranking.iter().enumerate() {
        info!(
            "#{:<3} {:<8} total {:>7.1}  avg {:>5.1}",
            place + 1,
            entry.symbol,
            entry.total,
            entry.average
        );
    }
    info!("Scores added for {} metrics. Saved to {}", report.scored, report.output.display());
    Ok(())
}

fn run(args: &Args) -> Result<Report> {
    let input = PathBuf::from(args.input.trim());
    let output = args
        .output
        .as_deref()
        .map(|o| PathBuf::from(o.trim()))
        .unwrap_or_else(|| default_output(&input));

    let metrics = if args.metrics.is_empty() {
        ranking::default_metrics()
    } else {
        for name in &args.metrics {
            if !metric::find(name).is_some_and(|m| m.scored) {
                return Err(FundamentalsError::Format(format!("Unknown scored metric: {name}")));
            }
        }
        args.metrics.clone()
    };

    let mut table = Table::load(&input)?;
    let scored = score_table(&mut table);
    table.save(&output)?;

    let ranking = match args.top {
        Some(top) => ranking::rank(&table, &metrics, args.search.as_deref(), top),
        None => Vec::new(),
    };
    Ok(Report { scored, output, ranking })
}

/// Overwrite a JSON input in place; write a `.json` sibling for a symbol list.
fn default_output(input: &Path) -> PathBuf {
    if input.extension().is_some_and(|e| e.eq_ignore_ascii_case("json")) {
        input.to_path_buf()
    } else {
        input.with_extension("json")
    }
}

fn init_logger() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
}
