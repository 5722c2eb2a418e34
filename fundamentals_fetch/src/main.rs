//! Fundamentals fetcher: pulls per-symbol fundamentals from the quote service,
//! scores them against the fetched population and writes the table as JSON.
//!
//! Usage example (CLI):
//! ```bash
//! fundamentals_fetch --input ./sp500_companies.json --output ./sp500_scored.json
//! ```
//!
//! The input is either a JSON table with a `Symbol` column or a text file with
//! symbols separated by commas, spaces, or new lines. See `orchestrator` for
//! the per-symbol error policy.
#![warn(missing_docs)]
mod args;
mod orchestrator;

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use clap::Parser;
use fundamentals_common::scoring::score_table;
use fundamentals_common::{FundamentalsError, QuoteClient, Result, Table};
use log::{debug, error, info};

use crate::args::{default_output, normalize_path, Args};
use crate::orchestrator::Orchestrator;

fn main() -> Result<(), FundamentalsError> {
    init_logger();
    let args = Args::parse();
    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            info!("Ctrl+C received. Finishing after the current symbol...");
            shutdown.store(true, Ordering::SeqCst);
        })
        .map_err(|e| FundamentalsError::Format(format!("Error setting Ctrl+C handler: {e}")))?;
    }

    let input = normalize_path(&args.input);
    let output = args
        .output
        .as_deref()
        .map(normalize_path)
        .unwrap_or_else(|| default_output(&input));

    let mut table = Table::load(&input)?;
    info!("Loaded {} symbols from {}", table.len(), input.display());

    let client = QuoteClient::connect(Duration::from_secs(args.timeout_secs))?;
    let mut orchestrator = Orchestrator::new(client, Duration::from_millis(args.delay_ms), shutdown);
    let summary = match orchestrator.run(&mut table) {
        Ok(summary) => summary,
        Err(e) => {
            error!("Aborting run: {e}");
            return Err(e);
        }
    };
    info!(
        "Fetched {} symbols, {} failed, {} skipped{}",
        summary.fetched,
        summary.failed,
        summary.skipped,
        if summary.interrupted { " (interrupted)" } else { "" }
    );
    debug!("Token acquired {} time(s)", orchestrator.client().session().acquisitions());

    let scored = if args.no_score { 0 } else { score_table(&mut table) };
    table.save(&output)?;
    info!("Scores added for {} metrics. Saved to {}", scored, output.display());
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
