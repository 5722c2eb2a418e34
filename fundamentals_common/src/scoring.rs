//! Population-relative 0-100 scores.
//!
//! A score only means something relative to the batch it was computed with:
//! re-scoring a different population changes every score, even for unchanged
//! raw values. The engine is pure and runs once per metric after fetching.
use serde_json::Value;

use crate::metric::{self, Direction, MetricSpec, Transform};
use crate::table::Table;

/// Coerce a table cell to a finite number.
///
/// Numbers and numeric strings are accepted; everything else is absent.
pub fn coerce_numeric(cell: &Value) -> Option<f64> {
    match cell {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

/// Apply the metric's transform. Log masks values `<= 0` before taking `ln`.
pub fn prepare(values: &[Option<f64>], transform: Transform) -> Vec<Option<f64>> {
    values
        .iter()
        .map(|v| {
            let v = v.filter(|x| x.is_finite())?;
            match transform {
                Transform::None => Some(v),
                Transform::Log if v > 0.0 => Some(v.ln()),
                Transform::Log => None,
            }
        })
        .collect()
}

/// Fractional rank of every present value with average-rank tie handling.
///
/// Present values are sorted ascending with their positions retained; each
/// run of equal values gets the mean of the 1-based ranks it occupies, divided
/// by the number of present values. Absent inputs stay absent.
pub fn percentile_ranks(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut present: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|x| (i, x)))
        .collect();
    present.sort_by(|a, b| a.1.total_cmp(&b.1));

    let count = present.len() as f64;
    let mut ranks = vec![None; values.len()];
    let mut start = 0;
    while start < present.len() {
        let mut end = start + 1;
        while end < present.len() && present[end].1 == present[start].1 {
            end += 1;
        }
        // positions start..end hold ranks start+1..=end
        let average = (start + 1 + end) as f64 / 2.0;
        for &(index, _) in &present[start..end] {
            ranks[index] = Some(average / count);
        }
        start = end;
    }
    ranks
}

/// Flip fractions for lower-is-better metrics.
pub fn apply_direction(fractions: &[Option<f64>], direction: Direction) -> Vec<Option<f64>> {
    fractions
        .iter()
        .map(|f| match direction {
            Direction::HigherIsBetter => *f,
            Direction::LowerIsBetter => f.map(|x| 1.0 - x),
        })
        .collect()
}

/// Scale a fraction to 0-100 and round to one decimal, ties to even.
pub fn round_score(fraction: f64) -> f64 {
    (fraction * 100.0 * 10.0).round_ties_even() / 10.0
}

/// Score one raw column against the batch it belongs to.
pub fn score_column(values: &[Option<f64>], spec: &MetricSpec) -> Vec<Option<f64>> {
    let prepared = prepare(values, spec.transform);
    let fractions = apply_direction(&percentile_ranks(&prepared), spec.direction);
    fractions.into_iter().map(|f| f.map(round_score)).collect()
}

/// Score every scored metric over the whole table. Returns the number of
/// metrics scored.
pub fn score_table(table: &mut Table) -> usize {
    let mut count = 0;
    for spec in metric::scored() {
        let scores = score_column(&table.column(spec.name), spec);
        table.set_scores(spec.name, scores);
        count += 1;
    }
    count
}
