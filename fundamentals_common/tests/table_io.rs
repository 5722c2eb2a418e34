use std::fs;

use fundamentals_common::scoring::score_table;
use fundamentals_common::{FundamentalsError, Table};
use serde_json::{json, Value};

#[test]
fn symbol_list_file_becomes_empty_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("universe.txt");
    fs::write(&path, "AAPL, MSFT\nGOOGL\n\n").unwrap();

    let table = Table::load(&path).unwrap();
    let symbols: Vec<_> = table.securities.iter().map(|s| s.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["AAPL", "MSFT", "GOOGL"]);
    assert!(table.securities.iter().all(|s| s.raw.values().all(Option::is_none)));
}

#[test]
fn scored_table_survives_a_save_and_rescore() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("sp500.json");
    fs::write(
        &input,
        json!([
            { "Symbol": "AAA", "Sector": "Energy", "Marketcap": 100, "P/E Ratio": 10 },
            { "Symbol": "BBB", "Sector": "Utilities", "Marketcap": 1000, "P/E Ratio": 20 },
            { "Symbol": "CCC", "Sector": "Financials", "Marketcap": 10000, "P/E Ratio": null, "P/E Ratio Score": 12.3 }
        ])
        .to_string(),
    )
    .unwrap();

    let mut table = Table::load(&input).unwrap();
    assert_eq!(score_table(&mut table), 9);
    let output = dir.path().join("scored.json");
    table.save(&output).unwrap();

    let rows: Vec<Value> = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    let marketcap: Vec<_> = rows.iter().map(|r| r["Marketcap Score"].clone()).collect();
    assert_eq!(marketcap, vec![json!(33.3), json!(66.7), json!(100.0)]);
    let pe: Vec<_> = rows.iter().map(|r| r["P/E Ratio Score"].clone()).collect();
    assert_eq!(pe, vec![json!(50.0), json!(0.0), Value::Null]);
    assert_eq!(rows[1]["Sector"], json!("Utilities"));

    let reloaded = Table::load(&output).unwrap();
    assert_eq!(reloaded.securities[2].score("P/E Ratio"), None);
    assert_eq!(reloaded.securities[0].raw("Marketcap"), Some(100.0));
}

#[test]
fn json_without_symbol_column_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, r#"[{"Ticker": "AAPL"}]"#).unwrap();

    assert!(matches!(Table::load(&path), Err(FundamentalsError::Format(_))));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Table::load(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, FundamentalsError::Io(_)));
}
