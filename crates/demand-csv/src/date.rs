//! Day-first date parsing.
//!
//! Accepted shapes (separator `-`, `/` or `.`; an optional time part after a
//! space or `T` is ignored):
//!
//! | Input          | Reading                          |
//! |----------------|----------------------------------|
//! | `2025-01-05`   | year first, unambiguous          |
//! | `05/01/2025`   | day first: 5 January 2025        |
//! | `05-01-25`     | day first, two-digit year → 2025 |
//! | `2025-01`      | month, first day                 |
//! | `01/2025`      | month, first day                 |
//! | `20250105`     | compact year first               |

use chrono::{Datelike as _, NaiveDate};

/// Tried in order. Two-digit years come first: `%Y` would otherwise read
/// `05-01-25` as year 25.
const FORMATS: &[&str] = &[
  "%d-%m-%y", "%d/%m/%y", "%d.%m.%y", "%d-%m-%Y", "%d/%m/%Y", "%d.%m.%Y",
  "%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d",
];

pub(crate) fn parse_day_first(value: &str) -> Option<NaiveDate> {
  let date = strip_time(value.trim());
  if date.len() == 8 && date.bytes().all(|b| b.is_ascii_digit()) {
    let dashed = format!("{}-{}-{}", &date[..4], &date[4..6], &date[6..]);
    return parse_with_formats(&dashed);
  }

  let separators = date.matches(['-', '/', '.']).count();
  match separators {
    2 => parse_with_formats(date),
    // Month only: pin the day to the first, on whichever side it belongs.
    1 => {
      let sep = date.chars().find(|c| matches!(c, '-' | '/' | '.'))?;
      parse_with_formats(&format!("{date}{sep}01"))
        .or_else(|| parse_with_formats(&format!("01{sep}{date}")))
    }
    _ => None,
  }
}

fn parse_with_formats(value: &str) -> Option<NaiveDate> {
  FORMATS
    .iter()
    .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
    .filter(|d| d.year() >= 1000)
}

fn strip_time(value: &str) -> &str {
  let cut = value.find([' ', 'T']).unwrap_or(value.len());
  &value[..cut]
}
