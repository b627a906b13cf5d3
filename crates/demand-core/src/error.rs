//! Error types for `demand-core`.
//!
//! Every failure of a load is one of a small set of kinds. Callers that need
//! a machine-readable report use [`Error::kind`] and [`Error::subject`]; the
//! `Display` impl is the human-readable message.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// Which of the two input tables a schema problem was found in.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display,
  strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Table {
  Forecast,
  Biometric,
}

/// What exactly is wrong with a table that was otherwise readable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaProblem {
  #[error("missing required column(s): {}", .0.join(", "))]
  MissingColumns(Vec<String>),

  #[error("row {row}: unparseable date {value:?} in column {column:?}")]
  UnparseableDate {
    column: String,
    row:    usize,
    value:  String,
  },

  #[error("row {row}: invalid value {value:?} in column {column:?}")]
  InvalidValue {
    column: String,
    row:    usize,
    value:  String,
  },

  #[error("period {0} appears more than once")]
  DuplicatePeriod(NaiveDate),
}

#[derive(Debug, Error)]
pub enum Error {
  /// The source could not be reached, was refused, or does not exist.
  #[error("data unavailable from {origin}: {reason} (hint: {hint})")]
  DataUnavailable {
    origin: String,
    reason: String,
    hint:   String,
  },

  /// The bytes were fetched but are not a usable CSV table.
  #[error("malformed data from {origin}: {message}")]
  DataFormat { origin: String, message: String },

  #[error("{table} table: {problem}")]
  Schema {
    table:   Table,
    problem: SchemaProblem,
  },

  /// A ratio was requested whose denominator is zero.
  #[error("child share is undefined for state {state:?}: no updates recorded")]
  DivisionUndefined { state: String },

  #[error("invalid configuration: {0}")]
  InvalidConfig(String),
}

/// Machine-readable discriminant of an [`Error`].
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display,
  strum::IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
  DataUnavailable,
  DataFormat,
  Schema,
  DivisionUndefined,
  InvalidConfig,
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::DataUnavailable { .. } => ErrorKind::DataUnavailable,
      Self::DataFormat { .. } => ErrorKind::DataFormat,
      Self::Schema { .. } => ErrorKind::Schema,
      Self::DivisionUndefined { .. } => ErrorKind::DivisionUndefined,
      Self::InvalidConfig(_) => ErrorKind::InvalidConfig,
    }
  }

  /// The offending source, column(s), or state, if the error names one.
  pub fn subject(&self) -> Option<String> {
    match self {
      Self::DataUnavailable { origin, .. } | Self::DataFormat { origin, .. } => {
        Some(origin.clone())
      }
      Self::Schema { problem, .. } => match problem {
        SchemaProblem::MissingColumns(columns) => Some(columns.join(", ")),
        SchemaProblem::UnparseableDate { column, .. }
        | SchemaProblem::InvalidValue { column, .. } => Some(column.clone()),
        SchemaProblem::DuplicatePeriod(_) => None,
      },
      Self::DivisionUndefined { state } => Some(state.clone()),
      Self::InvalidConfig(_) => None,
    }
  }

  pub fn schema(table: Table, problem: SchemaProblem) -> Self {
    Self::Schema { table, problem }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
