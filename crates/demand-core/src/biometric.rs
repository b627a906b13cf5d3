//! Historical biometric-update observations, one per (date, state).

use chrono::NaiveDate;
use serde::Serialize;

/// A single observation. `total_updates` is computed on construction and is
/// always the sum of the two age buckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BiometricRecord {
  date:          NaiveDate,
  state:         String,
  age_5_17:      u64,
  age_18_plus:   u64,
  total_updates: u64,
}

impl BiometricRecord {
  /// Build a record; an absent bucket counts as zero.
  pub fn new(
    date: NaiveDate,
    state: impl Into<String>,
    age_5_17: Option<u64>,
    age_18_plus: Option<u64>,
  ) -> Self {
    let age_5_17 = age_5_17.unwrap_or(0);
    let age_18_plus = age_18_plus.unwrap_or(0);
    Self {
      date,
      state: state.into(),
      age_5_17,
      age_18_plus,
      total_updates: age_5_17.saturating_add(age_18_plus),
    }
  }

  pub fn date(&self) -> NaiveDate { self.date }

  pub fn state(&self) -> &str { &self.state }

  pub fn age_5_17(&self) -> u64 { self.age_5_17 }

  pub fn age_18_plus(&self) -> u64 { self.age_18_plus }

  pub fn total_updates(&self) -> u64 { self.total_updates }
}

/// The normalised biometric table together with the name of the date column
/// that was actually used (the source may call it `date` or `ds`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BiometricTable {
  pub date_column: String,
  pub records:     Vec<BiometricRecord>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn total_is_sum_of_buckets() {
    let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let record = BiometricRecord::new(date, "X", Some(10), Some(20));
    assert_eq!(record.total_updates(), 30);
    assert_eq!(
      record.total_updates(),
      record.age_5_17() + record.age_18_plus()
    );
  }

  #[test]
  fn absent_bucket_counts_as_zero() {
    let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let child_only = BiometricRecord::new(date, "X", Some(7), None);
    assert_eq!(child_only.age_18_plus(), 0);
    assert_eq!(child_only.total_updates(), 7);

    let neither = BiometricRecord::new(date, "X", None, None);
    assert_eq!(neither.total_updates(), 0);
  }
}
