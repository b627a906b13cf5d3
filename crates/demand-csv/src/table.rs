//! Raw CSV table: header resolution and cell-level value parsing.

use csv::StringRecord;
use demand_core::{Error, Result, SchemaProblem, Table};

use crate::date::parse_day_first;

/// Delimiters that indicate the file was not exported as comma-separated.
const FOREIGN_DELIMITERS: [char; 3] = [';', '\t', '|'];

/// A decoded CSV document: trimmed headers and records of equal width.
#[derive(Debug)]
pub(crate) struct RawTable {
  headers: Vec<String>,
  records: Vec<StringRecord>,
}

/// A resolved column: its position and the header name the source used.
#[derive(Debug, Clone)]
pub(crate) struct Column {
  pub index: usize,
  pub name:  String,
}

impl RawTable {
  /// Decode `input`. Anything that prevents reading a rectangular table
  /// with a header row is a [`Error::DataFormat`].
  pub(crate) fn read(input: &[u8], origin: &str) -> Result<Self> {
    let format_error = |message: String| Error::DataFormat {
      origin: origin.to_owned(),
      message,
    };

    let input = input.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(input);
    let mut reader = csv::ReaderBuilder::new()
      .has_headers(true)
      .trim(csv::Trim::All)
      .from_reader(input);

    let headers: Vec<String> = reader
      .headers()
      .map_err(|e| format_error(e.to_string()))?
      .iter()
      .map(str::to_owned)
      .collect();

    if headers.iter().all(String::is_empty) {
      return Err(format_error("missing header row".into()));
    }
    if headers.len() == 1
      && let Some(delimiter) =
        headers[0].chars().find(|c| FOREIGN_DELIMITERS.contains(c))
    {
      return Err(format_error(format!(
        "unexpected delimiter {delimiter:?}; expected comma-separated values"
      )));
    }
    // A column name is never a date or a number.
    if headers.iter().any(|h| looks_like_data(h)) {
      return Err(format_error(format!(
        "missing header row: first line looks like data ({})",
        headers.join(",")
      )));
    }

    let records = reader
      .records()
      .collect::<std::result::Result<Vec<_>, _>>()
      .map_err(|e| format_error(e.to_string()))?;

    tracing::debug!(
      origin,
      columns = headers.len(),
      rows = records.len(),
      "decoded csv"
    );
    Ok(Self { headers, records })
  }

  /// Find the first header matching any of `aliases`, case-insensitively.
  /// Aliases are tried in order, so earlier names win.
  pub(crate) fn column(&self, aliases: &[&str]) -> Option<Column> {
    aliases.iter().find_map(|alias| {
      self
        .headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(alias))
        .map(|index| Column {
          index,
          name: self.headers[index].clone(),
        })
    })
  }

  /// Records with their 1-based data row number.
  pub(crate) fn rows(&self) -> impl Iterator<Item = (usize, &StringRecord)> {
    self.records.iter().enumerate().map(|(i, r)| (i + 1, r))
  }

  pub(crate) fn len(&self) -> usize { self.records.len() }
}

fn looks_like_data(header: &str) -> bool {
  header.parse::<f64>().is_ok_and(f64::is_finite)
    || parse_day_first(header).is_some()
}

// ─── Cell helpers ────────────────────────────────────────────────────────────

/// The trimmed cell under `column`, or `None` when blank.
pub(crate) fn cell<'a>(
  record: &'a StringRecord,
  column: &Column,
) -> Option<&'a str> {
  record.get(column.index).filter(|v| !v.is_empty())
}

/// Reads typed values out of one table, tagging failures with the table,
/// column, and row they came from.
pub(crate) struct CellReader {
  pub table: Table,
}

impl CellReader {
  pub(crate) fn invalid(
    &self,
    column: &Column,
    row: usize,
    value: &str,
  ) -> Error {
    Error::schema(self.table, SchemaProblem::InvalidValue {
      column: column.name.clone(),
      row,
      value: value.to_owned(),
    })
  }

  pub(crate) fn date(
    &self,
    record: &StringRecord,
    column: &Column,
    row: usize,
  ) -> Result<chrono::NaiveDate> {
    let raw = record.get(column.index).unwrap_or_default();
    parse_day_first(raw).ok_or_else(|| {
      Error::schema(self.table, SchemaProblem::UnparseableDate {
        column: column.name.clone(),
        row,
        value: raw.to_owned(),
      })
    })
  }

  /// A finite, non-negative number.
  pub(crate) fn amount(
    &self,
    column: &Column,
    row: usize,
    value: &str,
  ) -> Result<f64> {
    value
      .parse::<f64>()
      .ok()
      .filter(|v| v.is_finite() && *v >= 0.0)
      .ok_or_else(|| self.invalid(column, row, value))
  }

  /// A non-negative whole number. `"12.0"` is accepted as 12, since
  /// spreadsheet exports often write counts as floats.
  pub(crate) fn count(
    &self,
    column: &Column,
    row: usize,
    value: &str,
  ) -> Result<u64> {
    if let Ok(n) = value.parse::<u64>() {
      return Ok(n);
    }
    let amount = self.amount(column, row, value)?;
    if amount.fract() != 0.0 || amount > u64::MAX as f64 {
      return Err(self.invalid(column, row, value));
    }
    Ok(amount as u64)
  }

  pub(crate) fn label<T: std::str::FromStr>(
    &self,
    column: &Column,
    row: usize,
    value: &str,
  ) -> Result<T> {
    normalize_label(value)
      .parse()
      .map_err(|_| self.invalid(column, row, value))
  }
}

/// Reduce a display label such as `"🔴 High"` or `"🚨 Recruit Now"` to its
/// snake_case identifier (`"high"`, `"recruit_now"`).
pub(crate) fn normalize_label(value: &str) -> String {
  value
    .chars()
    .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '_')
    .collect::<String>()
    .split_whitespace()
    .collect::<Vec<_>>()
    .join("_")
    .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn read(input: &str) -> Result<RawTable> {
    RawTable::read(input.as_bytes(), "test")
  }

  #[test]
  fn resolves_aliases_case_insensitively() {
    let table = read("DS,Yhat\n2025-01-01,10\n").unwrap();
    let period = table.column(&["period", "ds"]).unwrap();
    assert_eq!(period.index, 0);
    assert_eq!(period.name, "DS");
    assert!(table.column(&["state"]).is_none());
  }

  #[test]
  fn earlier_alias_wins() {
    let table = read("ds,date\n2025-01-01,01-01-2025\n").unwrap();
    assert_eq!(table.column(&["date", "ds"]).unwrap().name, "date");
  }

  #[test]
  fn empty_input_is_a_format_error() {
    assert!(matches!(read(""), Err(Error::DataFormat { .. })));
  }

  #[test]
  fn semicolon_file_is_a_format_error() {
    let err = read("ds;yhat\n2025-01-01;10\n").unwrap_err();
    let Error::DataFormat { message, .. } = err else {
      panic!("expected DataFormat")
    };
    assert!(message.contains("delimiter"), "{message}");
  }

  #[test]
  fn headerless_file_is_a_format_error() {
    let err = read("2025-01-01,1000\n2025-02-01,2000\n").unwrap_err();
    assert!(matches!(err, Error::DataFormat { .. }));
  }

  #[test]
  fn headerless_file_with_text_column_is_a_format_error() {
    let err = read("01-01-2025,Bihar,10,20\n02-01-2025,Goa,5,5\n").unwrap_err();
    let Error::DataFormat { message, .. } = err else {
      panic!("expected DataFormat")
    };
    assert!(message.contains("missing header row"), "{message}");
  }

  #[test]
  fn text_headers_that_mention_numbers_are_accepted() {
    let table = read("state,bio_age_5_17,nan_count\nBihar,1,0\n").unwrap();
    assert_eq!(table.len(), 1);
  }

  #[test]
  fn ragged_rows_are_a_format_error() {
    assert!(matches!(
      read("a,b\n1,2\n3\n"),
      Err(Error::DataFormat { .. })
    ));
  }

  #[test]
  fn bom_and_whitespace_are_stripped() {
    let table = read("\u{feff} ds , yhat \n 2025-01-01 , 5 \n").unwrap();
    let column = table.column(&["ds"]).unwrap();
    let (_, record) = table.rows().next().unwrap();
    assert_eq!(cell(record, &column), Some("2025-01-01"));
  }

  #[test]
  fn counts_accept_float_exports() {
    let reader = CellReader {
      table: Table::Biometric,
    };
    let column = Column {
      index: 0,
      name:  "bio_age_5_17".into(),
    };
    assert_eq!(reader.count(&column, 1, "12").unwrap(), 12);
    assert_eq!(reader.count(&column, 1, "12.0").unwrap(), 12);
    assert!(reader.count(&column, 1, "12.5").is_err());
    assert!(reader.count(&column, 1, "-3").is_err());
    assert!(reader.amount(&column, 1, "NaN").is_err());
  }

  #[test]
  fn labels_are_normalised() {
    assert_eq!(normalize_label("🔴 High"), "high");
    assert_eq!(normalize_label("🚨 Recruit Now"), "recruit_now");
    assert_eq!(normalize_label("recruit_now"), "recruit_now");
  }
}
