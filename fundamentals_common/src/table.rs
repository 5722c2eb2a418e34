//! The batch table: one `Security` per symbol, raw metric values and scores.
//!
//! Tables are stored as a JSON array of flat rows keyed by column name. The
//! `Symbol` column is required; known metric columns are coerced to numbers;
//! every other column is carried through untouched. Score columns are never
//! read back, they are regenerated for the current population.
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::FundamentalsError;
use crate::metric::{self, METRICS};
use crate::payload::MetricValues;
use crate::result::Result;
use crate::scoring::coerce_numeric;
use crate::symbols::{SymbolList, SymbolParser};

/// Column holding the unique symbol identifier.
pub const SYMBOL_COLUMN: &str = "Symbol";
/// Column holding the time of the last successful fetch.
pub const FETCHED_AT_COLUMN: &str = "Fetched At";

/// One row of the batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Security {
    /// Symbol text as found in the input, not yet validated.
    pub symbol: String,
    /// Raw metric values by metric name; every metric has an entry.
    pub raw: BTreeMap<String, Option<f64>>,
    /// Scores by metric name, filled by the scoring pass.
    pub scores: BTreeMap<String, Option<f64>>,
    /// Time of the last successful fetch.
    pub fetched_at: Option<DateTime<Utc>>,
    /// Input columns the pipeline does not interpret, in input order.
    pub extra: Map<String, Value>,
}

impl Security {
    /// Security with every metric column initialised empty.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            raw: METRICS.iter().map(|m| (m.name.to_string(), None)).collect(),
            scores: BTreeMap::new(),
            fetched_at: None,
            extra: Map::new(),
        }
    }

    /// Raw value of `metric`.
    pub fn raw(&self, metric: &str) -> Option<f64> {
        self.raw.get(metric).copied().flatten()
    }

    /// Score of `metric`.
    pub fn score(&self, metric: &str) -> Option<f64> {
        self.scores.get(metric).copied().flatten()
    }

    /// Replace every fetched metric with the values of a successful fetch.
    pub fn record_fetch(&mut self, values: &MetricValues, at: DateTime<Utc>) {
        for spec in metric::fetched() {
            let value = values.get(spec.name).copied().flatten();
            self.raw.insert(spec.name.to_string(), value);
        }
        self.fetched_at = Some(at);
    }

    /// Mark every fetched metric absent after a failed fetch.
    ///
    /// Values from a previous run are dropped too; input-supplied metrics stay.
    pub fn clear_fetched(&mut self) {
        for spec in metric::fetched() {
            self.raw.insert(spec.name.to_string(), None);
        }
        self.fetched_at = None;
    }

    fn from_row(row: Map<String, Value>) -> Self {
        let mut security = Security::new(String::new());
        for (column, cell) in row {
            if column == SYMBOL_COLUMN {
                security.symbol = match cell {
                    Value::String(s) => s,
                    Value::Null => String::new(),
                    other => other.to_string(),
                };
            } else if column == FETCHED_AT_COLUMN {
                security.fetched_at = cell
                    .as_str()
                    .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                    .map(|t| t.with_timezone(&Utc));
            } else if metric::find(&column).is_some() {
                security.raw.insert(column, coerce_numeric(&cell));
            } else if !is_score_column(&column) {
                security.extra.insert(column, cell);
            }
        }
        security
    }

    fn to_row(&self) -> Map<String, Value> {
        let mut row = Map::new();
        row.insert(SYMBOL_COLUMN.to_string(), Value::String(self.symbol.clone()));
        for (column, cell) in &self.extra {
            row.insert(column.clone(), cell.clone());
        }
        for spec in METRICS.iter() {
            row.insert(spec.name.to_string(), number_cell(self.raw(spec.name)));
        }
        for spec in metric::scored() {
            row.insert(spec.score_column(), number_cell(self.score(spec.name)));
        }
        row.insert(
            FETCHED_AT_COLUMN.to_string(),
            self.fetched_at
                .map(|t| Value::String(t.to_rfc3339()))
                .unwrap_or(Value::Null),
        );
        row
    }
}

fn is_score_column(column: &str) -> bool {
    column
        .strip_suffix(" Score")
        .is_some_and(|name| metric::find(name).is_some())
}

fn number_cell(value: Option<f64>) -> Value {
    value
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// The batch of securities processed and scored together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Rows in input order.
    pub securities: Vec<Security>,
}

impl Table {
    /// Table with one empty row per symbol.
    pub fn from_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { securities: symbols.into_iter().map(Security::new).collect() }
    }

    /// Build a table from flat JSON rows. Every row needs a `Symbol` column.
    pub fn from_rows(rows: Vec<Map<String, Value>>) -> Result<Self> {
        let mut securities = Vec::with_capacity(rows.len());
        for (index, row) in rows.into_iter().enumerate() {
            if !row.contains_key(SYMBOL_COLUMN) {
                return Err(FundamentalsError::Format(format!(
                    "Expected a column named '{SYMBOL_COLUMN}' containing ticker symbols (row {})",
                    index + 1
                )));
            }
            securities.push(Security::from_row(row));
        }
        Ok(Self { securities })
    }

    /// Parse a JSON array of rows.
    pub fn read_json<R: Read>(reader: R) -> Result<Self> {
        let rows: Vec<Map<String, Value>> = serde_json::from_reader(reader)?;
        Self::from_rows(rows)
    }

    /// Load a table file: `.json` is read as rows, anything else as a symbol list.
    pub fn load(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        if is_json(path) {
            Self::read_json(reader)
        } else {
            Ok(Self::from_symbols(SymbolList::parse_from_reader(reader)?))
        }
    }

    /// Rows in output column order.
    pub fn to_rows(&self) -> Vec<Map<String, Value>> {
        self.securities.iter().map(Security::to_row).collect()
    }

    /// Write the table as pretty-printed JSON rows.
    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, &self.to_rows())?;
        Ok(())
    }

    /// Write the table to `path`, replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_json(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Raw column of `metric` across the batch, in row order.
    pub fn column(&self, metric: &str) -> Vec<Option<f64>> {
        self.securities.iter().map(|s| s.raw(metric)).collect()
    }

    /// Store a score column computed over this batch.
    pub fn set_scores(&mut self, metric: &str, scores: Vec<Option<f64>>) {
        for (security, score) in self.securities.iter_mut().zip(scores) {
            security.scores.insert(metric.to_string(), score);
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.securities.len()
    }

    /// `true` when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.securities.is_empty()
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(value: Value) -> Vec<Map<String, Value>> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn missing_metric_columns_start_empty() {
        let table = Table::from_rows(rows(json!([{ "Symbol": "AAPL" }]))).unwrap();
        let security = &table.securities[0];
        assert_eq!(security.raw.len(), METRICS.len());
        assert!(security.raw.values().all(Option::is_none));
    }

    #[test]
    fn missing_symbol_column_is_rejected() {
        let err = Table::from_rows(rows(json!([{ "Name": "Apple" }]))).unwrap_err();
        assert!(matches!(err, FundamentalsError::Format(_)));
    }

    #[test]
    fn metric_cells_are_coerced_and_extras_kept() {
        let table = Table::from_rows(rows(json!([
            { "Symbol": "MSFT", "Sector": "Technology", "Weight": "6.1", "P/E Ratio": "n/a", "ROE Score": 99.0 }
        ])))
        .unwrap();
        let security = &table.securities[0];
        assert_eq!(security.raw("Weight"), Some(6.1));
        assert_eq!(security.raw("P/E Ratio"), None);
        assert_eq!(security.extra.get("Sector"), Some(&json!("Technology")));
        assert!(!security.extra.contains_key("ROE Score"));
        assert_eq!(security.score("ROE"), None);
    }

    #[test]
    fn clear_fetched_keeps_input_supplied_metrics() {
        let mut security = Security::new("JPM");
        security.raw.insert("Weight".into(), Some(1.2));
        security.raw.insert("EPS".into(), Some(4.0));
        security.clear_fetched();
        assert_eq!(security.raw("Weight"), Some(1.2));
        assert_eq!(security.raw("EPS"), None);
    }

    #[test]
    fn record_fetch_overwrites_previous_values() {
        let mut security = Security::new("V");
        security.raw.insert("EPS".into(), Some(1.0));
        security.raw.insert("ROE".into(), Some(0.3));
        let values: MetricValues = [("EPS".to_string(), Some(9.5))].into_iter().collect();
        security.record_fetch(&values, Utc::now());
        assert_eq!(security.raw("EPS"), Some(9.5));
        assert_eq!(security.raw("ROE"), None);
        assert!(security.fetched_at.is_some());
    }

    #[test]
    fn output_row_has_symbol_first_and_score_columns() {
        let mut table = Table::from_symbols(["AAPL"]);
        table.securities[0].extra.insert("Sector".into(), json!("Technology"));
        table.set_scores("EPS", vec![Some(100.0)]);
        let row = &table.to_rows()[0];
        let columns: Vec<_> = row.keys().map(String::as_str).collect();
        assert_eq!(columns[0], SYMBOL_COLUMN);
        assert_eq!(columns[1], "Sector");
        assert_eq!(row["EPS Score"], json!(100.0));
        assert_eq!(row["P/E Ratio Score"], Value::Null);
        assert!(row.contains_key(FETCHED_AT_COLUMN));
        assert!(!row.contains_key("Revenue Score"));
    }

    #[test]
    fn numeric_symbol_cell_is_stringified() {
        let table = Table::from_rows(rows(json!([{ "Symbol": 700 }, { "Symbol": null }]))).unwrap();
        assert_eq!(table.securities[0].symbol, "700");
        assert_eq!(table.securities[1].symbol, "");
    }
}
