//! Sequential fetch loop over the symbol universe.
//!
//! One symbol is fetched, extracted and recorded at a time. Per-symbol errors
//! leave that symbol's fetched metrics absent and the run continues; an auth
//! error before the client ever held a token aborts the run, since no later
//! fetch could succeed either.
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread;
use std::time::Duration;

use chrono::Utc;
use fundamentals_common::client::{HttpTransport, QuoteClient};
use fundamentals_common::metric::METRICS;
use fundamentals_common::payload::{extract_metrics, MetricValues};
use fundamentals_common::symbols::validate_symbol;
use fundamentals_common::{FundamentalsError, Result, Security, Table};
use log::{info, warn};

/// Outcome counts of one fetch pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Symbols fetched and recorded.
    pub fetched: usize,
    /// Symbols whose fetch or parse failed.
    pub failed: usize,
    /// Blank or placeholder symbols skipped without a request.
    pub skipped: usize,
    /// `true` when Ctrl+C stopped the pass early.
    pub interrupted: bool,
}

/// Drives `QuoteClient` over every row of a table.
pub struct Orchestrator<T: HttpTransport> {
    client: QuoteClient<T>,
    delay: Duration,
    shutdown: Arc<AtomicBool>,
}

impl<T: HttpTransport> Orchestrator<T> {
    /// Orchestrator pausing `delay` between fetches and stopping when `shutdown` is set.
    pub fn new(client: QuoteClient<T>, delay: Duration, shutdown: Arc<AtomicBool>) -> Self {
        Self { client, delay, shutdown }
    }

    /// Underlying client.
    pub fn client(&self) -> &QuoteClient<T> {
        &self.client
    }

    /// Fetch every symbol of `table` in order, recording raw values in place.
    pub fn run(&mut self, table: &mut Table) -> Result<RunSummary> {
        let total = table.len();
        let mut summary = RunSummary::default();

        for index in 0..total {
            if self.shutdown.load(Ordering::Relaxed) {
                warn!("Interrupted after {index}/{total} symbols");
                // unfetched rows must not keep values from a previous run
                table.securities[index..].iter_mut().for_each(Security::clear_fetched);
                summary.interrupted = true;
                break;
            }
            let security = &mut table.securities[index];
            let position = format!("[{}/{}]", index + 1, total);

            let symbol = match validate_symbol(&security.symbol).map(str::to_string) {
                Ok(symbol) => symbol,
                Err(e) => {
                    warn!("{position} Skipped: {e}");
                    security.clear_fetched();
                    summary.skipped += 1;
                    continue;
                }
            };

            match self.fetch_metrics(&symbol) {
                Ok(values) => {
                    security.record_fetch(&values, Utc::now());
                    summary.fetched += 1;
                    info!("{position} Retrieved data for {symbol}");
                }
                Err(e @ FundamentalsError::Auth(_)) if !self.client.has_authenticated() => {
                    return Err(e);
                }
                Err(e) => {
                    security.clear_fetched();
                    summary.failed += 1;
                    warn!("{position} Failed for {symbol}: {e}");
                }
            }

            if index + 1 < total && !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
        }
        Ok(summary)
    }

    fn fetch_metrics(&mut self, symbol: &str) -> Result<MetricValues> {
        let payload = self.client.fetch(symbol)?;
        extract_metrics(&payload, &METRICS)
    }
}
