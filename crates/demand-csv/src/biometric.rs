//! Biometric table decoding.

use demand_core::{
  Error, Result, SchemaProblem, Table,
  biometric::{BiometricRecord, BiometricTable},
};

use crate::table::{CellReader, RawTable, cell};

/// Accepted date column names, in order of preference.
const DATE: &[&str] = &["date", "ds"];
const STATE: &[&str] = &["state"];
const AGE_5_17: &[&str] = &["bio_age_5_17", "age_5_17_count", "age_5_17"];
const AGE_18_PLUS: &[&str] =
  &["bio_age_17_", "age_18plus_count", "age_18_plus", "bio_age_18_plus"];

pub(crate) fn decode(input: &[u8], origin: &str) -> Result<BiometricTable> {
  let table = RawTable::read(input, origin)?;

  let date = table.column(DATE);
  let state = table.column(STATE);
  let child = table.column(AGE_5_17);
  let adult = table.column(AGE_18_PLUS);

  let (Some(date), Some(state), Some(child), Some(adult)) =
    (date.clone(), state.clone(), child.clone(), adult.clone())
  else {
    let missing = [
      (date.is_none(), "date (or ds)"),
      (state.is_none(), "state"),
      (child.is_none(), "age_5_17_count (or bio_age_5_17)"),
      (adult.is_none(), "age_18plus_count (or bio_age_17_)"),
    ]
    .into_iter()
    .filter_map(|(absent, name)| absent.then(|| name.to_owned()))
    .collect();
    return Err(Error::schema(
      Table::Biometric,
      SchemaProblem::MissingColumns(missing),
    ));
  };

  let reader = CellReader {
    table: Table::Biometric,
  };
  let mut records = Vec::with_capacity(table.len());
  for (row, record) in table.rows() {
    let on = reader.date(record, &date, row)?;
    let region = cell(record, &state)
      .ok_or_else(|| reader.invalid(&state, row, ""))?;
    let age_5_17 = cell(record, &child)
      .map(|v| reader.count(&child, row, v))
      .transpose()?;
    let age_18_plus = cell(record, &adult)
      .map(|v| reader.count(&adult, row, v))
      .transpose()?;
    records.push(BiometricRecord::new(on, region, age_5_17, age_18_plus));
  }

  Ok(BiometricTable {
    date_column: date.name,
    records,
  })
}
