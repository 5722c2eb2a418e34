//! Metric extraction from quote summary payloads.
//!
//! The payload is kept as an untyped `serde_json::Value` tree. Extraction is
//! total over that tree: a missing key, a null or an unexpected node type at
//! any depth yields an absent value. The only failure is a payload without the
//! `quoteSummary.result` wrapper, which means the whole fetch was meaningless.
use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::FundamentalsError;
use crate::metric::MetricSpec;
use crate::result::Result;

/// Flat mapping of metric name to optional raw value.
pub type MetricValues = BTreeMap<String, Option<f64>>;

/// Return the first entry of `quoteSummary.result`.
///
/// Fails with `Parse` when the wrapper is missing, not an array, or empty.
/// An error description attached by the service is included in the message.
pub fn quote_summary(payload: &Value) -> Result<&Value> {
    let wrapper = payload.get("quoteSummary");
    match wrapper.and_then(|w| w.get("result")).and_then(Value::as_array) {
        Some(result) if !result.is_empty() => Ok(&result[0]),
        _ => {
            let detail = wrapper
                .and_then(|w| w.get("error"))
                .and_then(|e| e.get("description"))
                .and_then(Value::as_str);
            Err(FundamentalsError::Parse(match detail {
                Some(d) => format!("No quote summary returned ({d})"),
                None => "No quote summary returned".to_string(),
            }))
        }
    }
}

/// Extract every fetched metric in `specs` from `payload`.
pub fn extract_metrics<'a, I>(payload: &Value, specs: I) -> Result<MetricValues>
where
    I: IntoIterator<Item = &'a MetricSpec>,
{
    let summary = quote_summary(payload)?;
    Ok(specs
        .into_iter()
        .filter(|spec| spec.is_fetched())
        .map(|spec| (spec.name.to_string(), extract_value(summary, spec.path)))
        .collect())
}

/// Follow `path` from `node` and read the leaf as a number.
pub fn extract_value(node: &Value, path: &[&str]) -> Option<f64> {
    let leaf = path
        .iter()
        .try_fold(node, |current, key| current.as_object()?.get(*key))?;
    leaf_number(leaf)
}

/// Interpret a leaf node.
///
/// Objects are read as `{"raw": number, "fmt": string}`: `raw` first, then
/// `fmt`. Each field may be a finite number or a formatted string such as
/// `"1,234.5"` or `"3.2%"`.
pub fn leaf_number(leaf: &Value) -> Option<f64> {
    match leaf {
        Value::Object(fields) => structured_number(fields),
        other => field_number(other),
    }
}

fn structured_number(fields: &Map<String, Value>) -> Option<f64> {
    ["raw", "fmt"]
        .iter()
        .filter_map(|key| fields.get(*key))
        .find_map(field_number)
}

fn field_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_formatted(s),
        _ => None,
    }
}

/// Parse a formatted number after stripping thousands separators and percent signs.
pub fn parse_formatted(text: &str) -> Option<f64> {
    let cleaned: String = text.chars().filter(|c| *c != ',' && *c != '%').collect();
    cleaned.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::{self, METRICS};
    use serde_json::json;
    use test_case::test_case;

    fn wrap(summary: Value) -> Value {
        json!({ "quoteSummary": { "result": [summary], "error": null } })
    }

    #[test]
    fn reads_raw_field_of_structured_leaf() {
        let payload = wrap(json!({
            "summaryDetail": { "trailingPE": { "raw": 28.4, "fmt": "28.40" } }
        }));
        let values = extract_metrics(&payload, &METRICS).unwrap();
        assert_eq!(values["P/E Ratio"], Some(28.4));
    }

    #[test]
    fn falls_back_to_fmt_when_raw_missing() {
        let payload = wrap(json!({
            "financialData": { "totalRevenue": { "fmt": "1,234,567" } },
            "summaryDetail": { "dividendYield": { "fmt": "0.52%" } }
        }));
        let values = extract_metrics(&payload, &METRICS).unwrap();
        assert_eq!(values["Revenue"], Some(1_234_567.0));
        assert_eq!(values["Dividend Yield"], Some(0.52));
    }

    #[test]
    fn unparseable_fmt_is_absent() {
        let payload = wrap(json!({ "summaryDetail": { "trailingPE": { "fmt": "Infinity" } } }));
        let values = extract_metrics(&payload, &METRICS).unwrap();
        assert_eq!(values["P/E Ratio"], None);

        let payload = wrap(json!({ "summaryDetail": { "trailingPE": { "fmt": "N/A" } } }));
        let values = extract_metrics(&payload, &METRICS).unwrap();
        assert_eq!(values["P/E Ratio"], None);
    }

    #[test]
    fn bare_number_leaf_is_used_directly() {
        let payload = wrap(json!({ "defaultKeyStatistics": { "trailingEps": 6.13 } }));
        let values = extract_metrics(&payload, &METRICS).unwrap();
        assert_eq!(values["EPS"], Some(6.13));
    }

    #[test_case(json!({}) ; "module missing")]
    #[test_case(json!({ "summaryDetail": null }) ; "module null")]
    #[test_case(json!({ "summaryDetail": [1, 2] }) ; "module is array")]
    #[test_case(json!({ "summaryDetail": { "trailingPE": null } }) ; "leaf null")]
    #[test_case(json!({ "summaryDetail": { "trailingPE": {} } }) ; "leaf empty object")]
    #[test_case(json!({ "summaryDetail": { "trailingPE": true } }) ; "leaf boolean")]
    #[test_case(json!({ "summaryDetail": "oops" }) ; "module is string")]
    #[test_case(json!(42) ; "summary is number")]
    fn shape_mismatch_is_absent_not_error(summary: Value) {
        let values = extract_metrics(&wrap(summary), &METRICS).unwrap();
        assert_eq!(values["P/E Ratio"], None);
        assert!(values.values().all(Option::is_none));
    }

    #[test_case(json!({}) ; "no wrapper")]
    #[test_case(json!({ "quoteSummary": {} }) ; "no result")]
    #[test_case(json!({ "quoteSummary": { "result": null } }) ; "null result")]
    #[test_case(json!({ "quoteSummary": { "result": [] } }) ; "empty result")]
    #[test_case(json!([]) ; "top level array")]
    fn missing_wrapper_is_parse_error(payload: Value) {
        let err = extract_metrics(&payload, &METRICS).unwrap_err();
        assert!(matches!(err, FundamentalsError::Parse(_)));
        assert!(err.to_string().contains("No quote summary returned"));
    }

    #[test]
    fn service_error_description_is_reported() {
        let payload = json!({
            "quoteSummary": { "result": null, "error": { "code": "Not Found", "description": "Quote not found for symbol: ZZZZ" } }
        });
        let err = quote_summary(&payload).unwrap_err();
        assert!(err.to_string().contains("Quote not found for symbol: ZZZZ"));
    }

    #[test]
    fn only_fetched_metrics_are_returned() {
        let values = extract_metrics(&wrap(json!({})), &METRICS).unwrap();
        assert_eq!(values.len(), metric::fetched().count());
        assert!(!values.contains_key("Weight"));
    }

    #[test]
    fn non_finite_raw_falls_through_to_fmt() {
        // serde_json cannot carry NaN, so a non-numeric raw exercises the same branch.
        let leaf = json!({ "raw": "n/a", "fmt": "12.5" });
        assert_eq!(leaf_number(&leaf), Some(12.5));
    }

    #[test]
    fn extract_value_walks_nested_objects() {
        let node = json!({ "a": { "b": { "c": { "raw": 1.5 } } } });
        assert_eq!(extract_value(&node, &["a", "b", "c"]), Some(1.5));
        assert_eq!(extract_value(&node, &["a", "x", "c"]), None);
    }
}
