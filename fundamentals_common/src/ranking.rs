//! Blended ranking across score columns.
//!
//! Each security's selected scores are summed, with a neutral 50 standing in
//! for an absent score, and securities are ordered by that total.
use crate::metric;
use crate::table::{Security, Table};

/// Score used when a security has no score for a selected metric.
pub const SCORE_FALLBACK: f64 = 50.0;
/// Preserved columns searched in addition to the symbol.
pub const SEARCH_COLUMNS: [&str; 4] = ["Shortname", "Longname", "Sector", "Industry"];

/// One line of the blended ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    /// Security symbol.
    pub symbol: String,
    /// Per-metric scores used, fallback applied, in selection order.
    pub scores: Vec<(String, f64)>,
    /// Sum of `scores`.
    pub total: f64,
    /// `total` divided by the number of selected metrics.
    pub average: f64,
}

/// Rank `table` over `metrics`, keeping securities that match `search` and
/// returning at most `top` entries. An empty selection ranks nothing.
pub fn rank(table: &Table, metrics: &[String], search: Option<&str>, top: usize) -> Vec<RankedEntry> {
    if metrics.is_empty() {
        return Vec::new();
    }
    let needle = search.map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty());

    let mut entries: Vec<RankedEntry> = table
        .securities
        .iter()
        .filter(|s| needle.as_deref().is_none_or(|n| matches_search(s, n)))
        .map(|s| blend(s, metrics))
        .collect();

    entries.sort_by(|a, b| b.total.total_cmp(&a.total).then_with(|| a.symbol.cmp(&b.symbol)));
    entries.truncate(top);
    entries
}

/// Names of every scored metric.
pub fn default_metrics() -> Vec<String> {
    metric::scored().map(|m| m.name.to_string()).collect()
}

fn blend(security: &Security, metrics: &[String]) -> RankedEntry {
    let scores: Vec<(String, f64)> = metrics
        .iter()
        .map(|m| (m.clone(), security.score(m).unwrap_or(SCORE_FALLBACK)))
        .collect();
    let total: f64 = scores.iter().map(|(_, s)| s).sum();
    RankedEntry {
        symbol: security.symbol.clone(),
        average: total / scores.len() as f64,
        scores,
        total,
    }
}

fn matches_search(security: &Security, needle: &str) -> bool {
    security.symbol.to_lowercase().contains(needle)
        || SEARCH_COLUMNS.iter().any(|column| {
            security
                .extra
                .get(*column)
                .and_then(|v| v.as_str())
                .is_some_and(|v| v.to_lowercase().contains(needle))
        })
}
