//! Static metric specifications.
//!
//! Each `MetricSpec` names a column, says whether a larger value ranks better,
//! whether it is log-transformed before ranking, and where the value lives in a
//! quote summary payload. The table is loaded once and never mutated.
use strum_macros::{Display, EnumString};

/// Ranking direction of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Direction {
    /// Larger raw values receive larger scores.
    HigherIsBetter,
    /// Smaller raw values receive larger scores.
    LowerIsBetter,
}

/// Transform applied to raw values before ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Transform {
    /// Rank raw values as they are.
    None,
    /// Drop values `<= 0`, rank the natural log of the rest.
    Log,
}

/// Immutable description of one metric column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricSpec {
    /// Column name, e.g. `P/E Ratio`.
    pub name: &'static str,
    /// Ranking direction.
    pub direction: Direction,
    /// Pre-ranking transform.
    pub transform: Transform,
    /// Keys locating the value inside the quote summary. Empty for columns
    /// supplied by the input table instead of the quote service.
    pub path: &'static [&'static str],
    /// Whether a `<name> Score` column is produced.
    pub scored: bool,
}

impl MetricSpec {
    /// `true` when the value comes from the quote service.
    pub fn is_fetched(&self) -> bool {
        !self.path.is_empty()
    }

    /// Name of the score column derived from this metric.
    pub fn score_column(&self) -> String {
        score_column(self.name)
    }
}

const fn spec(
    name: &'static str,
    direction: Direction,
    transform: Transform,
    path: &'static [&'static str],
    scored: bool,
) -> MetricSpec {
    MetricSpec { name, direction, transform, path, scored }
}

/// Every metric known to the pipeline, in output column order.
pub static METRICS: [MetricSpec; 11] = {
    use Direction::{HigherIsBetter, LowerIsBetter};
    [
        spec("Marketcap", HigherIsBetter, Transform::Log, &["summaryDetail", "marketCap"], true),
        spec("Ebitda", HigherIsBetter, Transform::Log, &["financialData", "ebitda"], true),
        spec("Revenuegrowth", HigherIsBetter, Transform::None, &["financialData", "revenueGrowth"], true),
        spec("Weight", HigherIsBetter, Transform::None, &[], true),
        spec("P/B Ratio", LowerIsBetter, Transform::None, &["defaultKeyStatistics", "priceToBook"], true),
        spec("P/E Ratio", LowerIsBetter, Transform::None, &["summaryDetail", "trailingPE"], true),
        spec("Dividend Yield", HigherIsBetter, Transform::None, &["summaryDetail", "dividendYield"], true),
        spec("EPS", HigherIsBetter, Transform::None, &["defaultKeyStatistics", "trailingEps"], true),
        spec("Revenue", HigherIsBetter, Transform::None, &["financialData", "totalRevenue"], false),
        spec("Net Income", HigherIsBetter, Transform::None, &["financialData", "netIncomeToCommon"], false),
        spec("ROE", HigherIsBetter, Transform::None, &["financialData", "returnOnEquity"], true),
    ]
};

/// Look up a metric by exact column name.
pub fn find(name: &str) -> Option<&'static MetricSpec> {
    METRICS.iter().find(|m| m.name == name)
}

/// Metrics pulled from the quote service.
pub fn fetched() -> impl Iterator<Item = &'static MetricSpec> {
    METRICS.iter().filter(|m| m.is_fetched())
}

/// Metrics that receive a score column.
pub fn scored() -> impl Iterator<Item = &'static MetricSpec> {
    METRICS.iter().filter(|m| m.scored)
}

/// Score column name for a metric name.
pub fn score_column(name: &str) -> String {
    format!("{name} Score")
}
