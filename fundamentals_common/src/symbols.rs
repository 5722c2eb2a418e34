//! Symbol validation and symbol-list parsing.

use std::io::BufRead;

use crate::error::FundamentalsError;
use crate::result::Result;

/// Placeholder written by spreadsheet tools for empty cells.
const PLACEHOLDER: &str = "nan";

/// Trim `raw` and reject blank or placeholder symbols.
///
/// Runs before any network call so an invalid row never costs a request.
pub fn validate_symbol(raw: &str) -> Result<&str> {
    let symbol = raw.trim();
    if symbol.is_empty() || symbol.eq_ignore_ascii_case(PLACEHOLDER) {
        return Err(FundamentalsError::InvalidSymbol(raw.to_string()));
    }
    Ok(symbol)
}

/// Trait providing list parsing for symbols.
pub trait SymbolParser {
    /// Parses symbols from a buffered reader.
    ///
    /// Symbols may be separated by commas, whitespace or new lines. Empty
    /// fragments are skipped; order and duplicates are preserved.
    fn parse_from_reader<R: BufRead>(reader: R) -> Result<Vec<String>>;
}

/// Plain-text symbol list, one or more symbols per line.
pub struct SymbolList;

impl SymbolParser for SymbolList {
    fn parse_from_reader<R: BufRead>(reader: R) -> Result<Vec<String>> {
        let mut symbols = Vec::new();

        for line_result in reader.lines() {
            let line = line_result.map_err(FundamentalsError::Io)?;
            symbols.extend(
                line.split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            );
        }
        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use test_case::test_case;

    #[test_case("" ; "empty")]
    #[test_case("   " ; "blank")]
    #[test_case("nan" ; "placeholder")]
    #[test_case(" NaN " ; "placeholder mixed case")]
    fn rejects_invalid(raw: &str) {
        assert!(matches!(validate_symbol(raw), Err(FundamentalsError::InvalidSymbol(_))));
    }

    #[test]
    fn trims_valid_symbol() {
        assert_eq!(validate_symbol("  BRK-B\t").unwrap(), "BRK-B");
    }

    #[test]
    fn parses_mixed_separators() {
        let input = "AAPL, MSFT\nGOOGL  NVDA,,\n\nJPM\n";
        let symbols = SymbolList::parse_from_reader(Cursor::new(input)).unwrap();
        assert_eq!(symbols, vec!["AAPL", "MSFT", "GOOGL", "NVDA", "JPM"]);
    }
}
