//! Command-line arguments for the fundamentals fetcher.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use std::path::{Path, PathBuf};

use clap::Parser;

/// Input used when `--input` is not given.
pub const DEFAULT_INPUT: &str = "sp500_companies.json";

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Universe to fetch: a `.json` table with a `Symbol` column, or a text
    /// file with symbols separated by commas, spaces, or new lines.
    #[clap(long, default_value = DEFAULT_INPUT)]
    pub input: String,

    /// Output table. Defaults to `<input stem>_with_financials.json` next to the input.
    #[clap(long)]
    pub output: Option<String>,

    /// Pause between two symbol fetches, in milliseconds.
    #[clap(long, default_value_t = 1000)]
    pub delay_ms: u64,

    /// Timeout of each HTTP request, in seconds.
    #[clap(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Write raw values only, without score columns.
    #[clap(long)]
    pub no_score: bool,
}

/// Normalize a CLI-provided path string by trimming whitespace and matching quotes.
///
/// This allows passing Windows paths in quotes without breaking parsing.
pub fn normalize_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let no_quotes = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    PathBuf::from(no_quotes)
}

/// `<stem>_with_financials.json` beside `input`.
pub fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "fundamentals".to_string());
    input.with_file_name(format!("{stem}_with_financials.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_matching_quotes() {
        assert_eq!(normalize_path("  \"C:\\data\\sp500.json\" "), PathBuf::from("C:\\data\\sp500.json"));
        assert_eq!(normalize_path("\"half"), PathBuf::from("\"half"));
    }

    #[test]
    fn output_defaults_next_to_input() {
        assert_eq!(
            default_output(Path::new("data/universe.txt")),
            PathBuf::from("data/universe_with_financials.json")
        );
    }

    #[test]
    fn parses_flags() {
        let args = Args::parse_from(["fundamentals_fetch", "--input", "u.txt", "--delay-ms", "0", "--no-score"]);
        assert_eq!(args.input, "u.txt");
        assert_eq!(args.delay_ms, 0);
        assert_eq!(args.timeout_secs, 10);
        assert!(args.no_score);
        assert!(args.output.is_none());
    }
}
