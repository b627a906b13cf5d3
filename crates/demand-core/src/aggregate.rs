//! Group-by reductions over the biometric table.
//!
//! Every reduction takes an explicit [`StateFilter`]; aggregating a subset of
//! states is the same as aggregating only that subset's rows.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result, biometric::BiometricRecord};

// ─── Filter ──────────────────────────────────────────────────────────────────

/// Which states an aggregation covers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StateFilter {
  #[default]
  All,
  Only(BTreeSet<String>),
}

impl StateFilter {
  /// Interpret a user selection against the known states. An empty
  /// selection, or one that names every known state, means no filtering.
  pub fn from_selection<I, S>(selection: I, known: &[&str]) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let selected: BTreeSet<String> =
      selection.into_iter().map(Into::into).collect();
    if selected.is_empty()
      || known.iter().all(|state| selected.contains(*state))
    {
      Self::All
    } else {
      Self::Only(selected)
    }
  }

  pub fn matches(&self, state: &str) -> bool {
    match self {
      Self::All => true,
      Self::Only(states) => states.contains(state),
    }
  }
}

// ─── Temporal ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateTotal {
  pub date:          NaiveDate,
  pub total_updates: u64,
}

/// Sum `total_updates` per date and keep the `k` largest. Equal totals keep
/// ascending date order.
pub fn temporal_top_k(
  records: &[BiometricRecord],
  filter: &StateFilter,
  k: usize,
) -> Vec<DateTotal> {
  let mut by_date: BTreeMap<NaiveDate, u64> = BTreeMap::new();
  for record in records.iter().filter(|r| filter.matches(r.state())) {
    let total = by_date.entry(record.date()).or_default();
    *total = total.saturating_add(record.total_updates());
  }

  let mut totals: Vec<DateTotal> = by_date
    .into_iter()
    .map(|(date, total_updates)| DateTotal {
      date,
      total_updates,
    })
    .collect();
  // Stable sort: ties stay in ascending date order.
  totals.sort_by(|a, b| b.total_updates.cmp(&a.total_updates));
  totals.truncate(k);
  totals
}

// ─── Spatial ─────────────────────────────────────────────────────────────────

/// Share of updates in the 5–17 bucket, or an explicit marker when the state
/// has no updates at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildShare {
  /// Percentage rounded to one decimal place.
  Percent(f64),
  Undefined,
}

impl ChildShare {
  pub fn from_counts(age_5_17: u64, total: u64) -> Self {
    if total == 0 {
      return Self::Undefined;
    }
    let pct = age_5_17 as f64 / total as f64 * 100.0;
    Self::Percent((pct * 10.0).round() / 10.0)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateAggregate {
  pub state:       String,
  pub age_5_17:    u64,
  pub age_18_plus: u64,
  pub total:       u64,
  pub child_share: ChildShare,
}

impl StateAggregate {
  /// The child share as a number, or [`Error::DivisionUndefined`] for a state
  /// with zero updates.
  pub fn child_pct(&self) -> Result<f64> {
    match self.child_share {
      ChildShare::Percent(pct) => Ok(pct),
      ChildShare::Undefined => Err(Error::DivisionUndefined {
        state: self.state.clone(),
      }),
    }
  }
}

/// Per-state sums, ranked by descending total. Equal totals are ordered by
/// state name. The full ranking is returned; slicing is up to the caller.
pub fn spatial_ranking(
  records: &[BiometricRecord],
  filter: &StateFilter,
) -> Vec<StateAggregate> {
  let mut by_state: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
  for record in records.iter().filter(|r| filter.matches(r.state())) {
    let (child, adult) = by_state.entry(record.state()).or_default();
    *child = child.saturating_add(record.age_5_17());
    *adult = adult.saturating_add(record.age_18_plus());
  }

  let mut ranking: Vec<StateAggregate> = by_state
    .into_iter()
    .map(|(state, (age_5_17, age_18_plus))| {
      let total = age_5_17.saturating_add(age_18_plus);
      StateAggregate {
        state: state.to_owned(),
        age_5_17,
        age_18_plus,
        total,
        child_share: ChildShare::from_counts(age_5_17, total),
      }
    })
    .collect();
  ranking.sort_by(|a, b| b.total.cmp(&a.total));
  ranking
}

// ─── Age groups ──────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
  Deserialize, strum::Display, strum::EnumString, strum::EnumIter,
)]
pub enum AgeGroup {
  #[serde(rename = "5_17")]
  #[strum(to_string = "5-17", serialize = "5_17")]
  Age5To17,
  #[serde(rename = "18_plus")]
  #[strum(to_string = "18+", serialize = "18_plus")]
  Age18Plus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgeGroupTotal {
  pub group: AgeGroup,
  pub total: u64,
}

/// Sum each selected age bucket over the filtered rows, in the order the
/// groups were given. Duplicate groups are reported once.
pub fn age_breakdown(
  records: &[BiometricRecord],
  filter: &StateFilter,
  groups: &[AgeGroup],
) -> Vec<AgeGroupTotal> {
  let mut seen = BTreeSet::new();
  groups
    .iter()
    .filter(|group| seen.insert(**group))
    .map(|&group| {
      let total = records
        .iter()
        .filter(|r| filter.matches(r.state()))
        .map(|r| match group {
          AgeGroup::Age5To17 => r.age_5_17(),
          AgeGroup::Age18Plus => r.age_18_plus(),
        })
        .fold(0u64, u64::saturating_add);
      AgeGroupTotal { group, total }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator as _;

  use super::*;

  fn day(d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(2025, 1, d).unwrap() }

  fn row(d: u32, state: &str, child: u64, adult: u64) -> BiometricRecord {
    BiometricRecord::new(day(d), state, Some(child), Some(adult))
  }

  fn only(states: &[&str]) -> StateFilter {
    StateFilter::Only(states.iter().map(|s| s.to_string()).collect())
  }

  #[test]
  fn spatial_scenario() {
    let records = vec![row(1, "X", 10, 20), row(1, "Y", 5, 5)];
    let ranking = spatial_ranking(&records, &StateFilter::All);

    assert_eq!(ranking.len(), 2);
    assert_eq!(ranking[0].state, "X");
    assert_eq!(ranking[0].total, 30);
    assert_eq!(ranking[0].child_share, ChildShare::Percent(33.3));
    assert_eq!(ranking[1].state, "Y");
    assert_eq!(ranking[1].total, 10);
    assert_eq!(ranking[1].child_pct().unwrap(), 50.0);
  }

  #[test]
  fn zero_total_state_is_marked_undefined() {
    let records = vec![row(1, "Z", 0, 0), row(1, "X", 1, 1)];
    let ranking = spatial_ranking(&records, &StateFilter::All);
    let z = ranking.iter().find(|a| a.state == "Z").unwrap();
    assert_eq!(z.child_share, ChildShare::Undefined);
    assert!(matches!(
      z.child_pct(),
      Err(Error::DivisionUndefined { state }) if state == "Z"
    ));
  }

  #[test]
  fn filtered_totals_are_additive() {
    let records = vec![
      row(1, "A", 3, 4),
      row(2, "B", 10, 0),
      row(2, "A", 1, 1),
      row(3, "C", 0, 8),
      row(4, "B", 2, 2),
    ];
    let subsets: [&[&str]; 4] = [&["A"], &["A", "B"], &["C"], &["B", "C"]];
    for subset in subsets {
      let filter = only(subset);
      let expected: u64 = records
        .iter()
        .filter(|r| subset.contains(&r.state()))
        .map(|r| r.total_updates())
        .sum();

      let spatial: u64 = spatial_ranking(&records, &filter)
        .iter()
        .map(|a| a.total)
        .sum();
      let temporal: u64 = temporal_top_k(&records, &filter, usize::MAX)
        .iter()
        .map(|d| d.total_updates)
        .sum();
      assert_eq!(spatial, expected, "spatial {subset:?}");
      assert_eq!(temporal, expected, "temporal {subset:?}");
    }
  }

  #[test]
  fn top_k_ties_keep_earlier_date_first() {
    let records = vec![
      row(5, "A", 10, 0),
      row(2, "A", 4, 6),
      row(9, "A", 50, 0),
      row(7, "B", 0, 10),
    ];
    let top = temporal_top_k(&records, &StateFilter::All, 10);
    let dates: Vec<NaiveDate> = top.iter().map(|d| d.date).collect();
    assert_eq!(dates, vec![day(9), day(2), day(5), day(7)]);
  }

  #[test]
  fn top_k_truncates_to_k() {
    let records: Vec<BiometricRecord> =
      (1..=20).map(|d| row(d, "A", d as u64, 0)).collect();
    let top = temporal_top_k(&records, &StateFilter::All, 10);
    assert_eq!(top.len(), 10);
    assert_eq!(top[0].date, day(20));
    assert_eq!(top[9].date, day(11));
  }

  #[test]
  fn ranking_sorted_by_total_descending() {
    let records = vec![row(1, "A", 1, 1), row(1, "B", 9, 9), row(2, "C", 5, 0)];
    let states: Vec<String> = spatial_ranking(&records, &StateFilter::All)
      .into_iter()
      .map(|a| a.state)
      .collect();
    assert_eq!(states, vec!["B", "C", "A"]);
  }

  #[test]
  fn selection_of_all_or_none_means_no_filter() {
    let known = ["A", "B"];
    assert_eq!(
      StateFilter::from_selection(Vec::<String>::new(), &known),
      StateFilter::All
    );
    assert_eq!(
      StateFilter::from_selection(["B", "A"], &known),
      StateFilter::All
    );
    assert_eq!(StateFilter::from_selection(["A"], &known), only(&["A"]));
  }

  #[test]
  fn age_breakdown_respects_selection() {
    let records = vec![row(1, "A", 3, 4), row(1, "B", 10, 20)];
    let all: Vec<AgeGroup> = AgeGroup::iter().collect();

    let totals = age_breakdown(&records, &StateFilter::All, &all);
    assert_eq!(totals[0].total, 13);
    assert_eq!(totals[1].total, 24);

    let adults = age_breakdown(&records, &only(&["A"]), &[AgeGroup::Age18Plus]);
    assert_eq!(adults, vec![AgeGroupTotal {
      group: AgeGroup::Age18Plus,
      total: 4,
    }]);

    assert!(age_breakdown(&records, &StateFilter::All, &[]).is_empty());
  }

  #[test]
  fn age_group_labels() {
    assert_eq!("5-17".parse::<AgeGroup>().unwrap(), AgeGroup::Age5To17);
    assert_eq!("18_plus".parse::<AgeGroup>().unwrap(), AgeGroup::Age18Plus);
    assert_eq!(AgeGroup::Age18Plus.to_string(), "18+");
  }
}
