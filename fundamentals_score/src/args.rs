//! Command-line arguments for the scorer.
use clap::Parser;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about = "Add percentile-based scores to a fundamentals table.", long_about = None)]
pub struct Args {
    /// JSON table with raw fundamental data, or a symbol list.
    pub input: String,

    /// Path for the scored output. Defaults to overwriting a JSON input, or a
    /// `.json` sibling of any other input.
    #[clap(long)]
    pub output: Option<String>,

    /// Print the top N securities of the blended ranking.
    #[clap(long)]
    pub top: Option<usize>,

    /// Only rank securities whose symbol, name, sector or industry contains this text.
    #[clap(long)]
    pub search: Option<String>,

    /// Metric to include in the blended ranking; repeat for several. Defaults to all scored metrics.
    #[clap(long = "metric")]
    pub metrics: Vec<String>,
}
