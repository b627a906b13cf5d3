//! CSV codec for the demand pipeline.
//!
//! Decodes the two input tables into [`demand_core`] input types. Pure
//! synchronous; no HTTP dependencies.
//!
//! Pipeline:
//!   raw bytes
//!     └─ RawTable::read()      → headers + records (format errors)
//!          └─ resolve columns  → accepted aliases (schema errors)
//!               └─ per-row     → typed values, day-first dates
//!
//! # Quick start
//!
//! ```no_run
//! let csv = b"ds,yhat\n2025-01-01,1000\n";
//! let rows = demand_csv::parse_forecast(csv, "forecast.csv").unwrap();
//! assert_eq!(rows.len(), 1);
//! ```

mod biometric;
mod date;
mod forecast;
mod table;

use demand_core::{Result, biometric::BiometricTable, forecast::ForecastInput};

/// Decode the forecast table. Rows come back sorted by period; duplicate
/// periods are rejected.
///
/// `origin` names the source in error messages.
pub fn parse_forecast(input: &[u8], origin: &str) -> Result<Vec<ForecastInput>> {
  forecast::decode(input, origin)
}

/// Decode the biometric table, keeping source row order. The returned table
/// records which date column was used.
pub fn parse_biometric(input: &[u8], origin: &str) -> Result<BiometricTable> {
  biometric::decode(input, origin)
}

