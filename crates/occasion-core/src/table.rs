//! Tidied event tables: one row per (timestep, entity) as produced by the
//! simulator output reader.
//!
//! Both tables are validated on construction and kept in timestep order
//! (stable, so rows sharing a timestep keep their input order). Everything
//! downstream assumes these invariants and does no further checking.

use crate::id::UnitId;
use crate::time::{SimTime, Tstep};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Schema violations detected when building a table.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("row {row}: empty state label")]
    EmptyState { row: usize },
    #[error("row {row}: empty transition name")]
    EmptyName { row: usize },
    #[error("row {row}: duplicate entry for unit {unit} state '{state}' at timestep {tstep}")]
    DuplicatePlace {
        row: usize,
        unit: UnitId,
        state: String,
        tstep: Tstep,
    },
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// Token count of one unit in one state at one sampled timestep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceRow {
    pub tstep: Tstep,
    pub time: SimTime,
    pub unit: UnitId,
    pub state: String,
    pub count: u32,
}

/// Firing count of one coloured transition instance at one sampled timestep.
///
/// `unit` is `None` when the column could not be attributed to a firing
/// unit upstream. `neighbour2` is only set for two-neighbour rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRow {
    pub tstep: Tstep,
    pub time: SimTime,
    pub name: String,
    pub unit: Option<UnitId>,
    pub neighbour: UnitId,
    pub neighbour2: Option<UnitId>,
    pub count: u32,
}

/// First time, last time and sampling interval of a table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub start: SimTime,
    pub stop: SimTime,
    /// Difference between the first two distinct times. `None` if the
    /// table covers a single instant.
    pub step: Option<f64>,
}

// ---------------------------------------------------------------------------
// PlaceTable
// ---------------------------------------------------------------------------

/// Validated occupancy table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceTable {
    rows: Vec<PlaceRow>,
}

impl PlaceTable {
    /// Validate and order `rows`.
    ///
    /// Fails on an empty state label or on two rows for the same
    /// `(unit, state, tstep)`.
    pub fn new(mut rows: Vec<PlaceRow>) -> Result<Self, TableError> {
        for (row, r) in rows.iter().enumerate() {
            if r.state.is_empty() {
                return Err(TableError::EmptyState { row });
            }
        }

        rows.sort_by_key(|r| r.tstep);

        let mut seen: HashMap<(UnitId, &str), Tstep> = HashMap::new();
        for (row, r) in rows.iter().enumerate() {
            if let Some(&previous) = seen.get(&(r.unit, r.state.as_str()))
                && previous == r.tstep
            {
                return Err(TableError::DuplicatePlace {
                    row,
                    unit: r.unit,
                    state: r.state.clone(),
                    tstep: r.tstep,
                });
            }
            seen.insert((r.unit, r.state.as_str()), r.tstep);
        }

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[PlaceRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<PlaceRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keep only rows whose state is in `names`.
    pub fn filter_by_name<S: AsRef<str>>(&self, names: &[S]) -> PlaceTable {
        let wanted: BTreeSet<&str> = names.iter().map(|n| n.as_ref()).collect();
        PlaceTable {
            rows: self
                .rows
                .iter()
                .filter(|r| wanted.contains(r.state.as_str()))
                .cloned()
                .collect(),
        }
    }

    /// Time span and sampling interval covered by the table.
    pub fn time_range(&self) -> Option<TimeRange> {
        time_range(self.rows.iter().map(|r| r.time))
    }

    /// Total token count per state at each sampled time, in time order.
    pub fn sums_by_state(&self) -> BTreeMap<String, Vec<(SimTime, u64)>> {
        let mut totals: BTreeMap<&str, BTreeMap<SimTime, u64>> = BTreeMap::new();
        for r in &self.rows {
            *totals
                .entry(r.state.as_str())
                .or_default()
                .entry(r.time)
                .or_insert(0) += u64::from(r.count);
        }
        totals
            .into_iter()
            .map(|(state, series)| (state.to_string(), series.into_iter().collect()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// TransitionTable
// ---------------------------------------------------------------------------

/// Validated transition-firing table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionTable {
    rows: Vec<TransitionRow>,
}

impl TransitionTable {
    /// Validate and order `rows`. Transition names are checked for
    /// presence only; decoding happens when the rows are consumed.
    pub fn new(mut rows: Vec<TransitionRow>) -> Result<Self, TableError> {
        for (row, r) in rows.iter().enumerate() {
            if r.name.is_empty() {
                return Err(TableError::EmptyName { row });
            }
        }
        rows.sort_by_key(|r| r.tstep);
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[TransitionRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keep only rows whose transition name is in `names`.
    pub fn filter_by_name<S: AsRef<str>>(&self, names: &[S]) -> TransitionTable {
        let wanted: BTreeSet<&str> = names.iter().map(|n| n.as_ref()).collect();
        TransitionTable {
            rows: self
                .rows
                .iter()
                .filter(|r| wanted.contains(r.name.as_str()))
                .cloned()
                .collect(),
        }
    }

    pub fn time_range(&self) -> Option<TimeRange> {
        time_range(self.rows.iter().map(|r| r.time))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Number the distinct values of `times` in order of first appearance.
///
/// Used to derive the `tstep` column for sources that only record time.
pub fn assign_timesteps(times: &[SimTime]) -> Vec<Tstep> {
    let mut steps: HashMap<SimTime, Tstep> = HashMap::new();
    times
        .iter()
        .map(|time| {
            let next = steps.len() as Tstep;
            *steps.entry(*time).or_insert(next)
        })
        .collect()
}

fn time_range(times: impl Iterator<Item = SimTime>) -> Option<TimeRange> {
    let distinct: BTreeSet<SimTime> = times.collect();
    let mut iter = distinct.iter();
    let start = *iter.next()?;
    let step = iter.next().map(|second| second.as_f64() - start.as_f64());
    let stop = *distinct.last()?;
    Some(TimeRange { start, stop, step })
}
