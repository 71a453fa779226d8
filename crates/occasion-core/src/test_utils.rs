//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::id::UnitId;
use crate::occasion::Occasion;
use crate::table::{PlaceRow, PlaceTable, TransitionRow, TransitionTable};
use crate::time::{SimTime, Tstep};

// ===========================================================================
// Time helpers
// ===========================================================================

/// Sampling interval used by every fixture.
pub const TIME_PER_STEP: f64 = 0.1;

pub fn time(v: f64) -> SimTime {
    SimTime::new(v).expect("fixture times are finite")
}

/// Time of a sampled step, computed the way a decimal CSV value parses
/// (`51 -> 5.1`, not `51 * 0.1`).
pub fn step_time(tstep: Tstep) -> SimTime {
    time(tstep as f64 / 10.0)
}

pub fn occ(unit: u32, state: &str, t: f64) -> Occasion {
    Occasion::new(UnitId(unit), state, time(t))
}

// ===========================================================================
// Row builders
// ===========================================================================

/// One place row per count, at consecutive steps starting from 0.
pub fn place_series(unit: u32, state: &str, counts: &[u32]) -> Vec<PlaceRow> {
    counts
        .iter()
        .enumerate()
        .map(|(i, &count)| PlaceRow {
            tstep: i as Tstep,
            time: step_time(i as Tstep),
            unit: UnitId(unit),
            state: state.to_string(),
            count,
        })
        .collect()
}

/// Rows for a unit holding `from` until `switch_at`, then `to`, over
/// `0..=last_step`. `switch_at == None` keeps the unit in `from`.
pub fn switching_unit(
    unit: u32,
    from: &str,
    to: &str,
    switch_at: Option<Tstep>,
    last_step: Tstep,
) -> Vec<PlaceRow> {
    let switched = |step: Tstep| switch_at.is_some_and(|s| step >= s);
    let from_counts: Vec<u32> = (0..=last_step).map(|s| u32::from(!switched(s))).collect();
    let to_counts: Vec<u32> = (0..=last_step).map(|s| u32::from(switched(s))).collect();
    let mut rows = place_series(unit, from, &from_counts);
    rows.extend(place_series(unit, to, &to_counts));
    rows
}

pub fn transition_row(
    tstep: Tstep,
    name: &str,
    unit: Option<u32>,
    neighbour: u32,
    neighbour2: Option<u32>,
    count: u32,
) -> TransitionRow {
    TransitionRow {
        tstep,
        time: step_time(tstep),
        name: name.to_string(),
        unit: unit.map(UnitId),
        neighbour: UnitId(neighbour),
        neighbour2: neighbour2.map(UnitId),
        count,
    }
}

// ===========================================================================
// Ring run: six units, follow one neighbour a -> b
// ===========================================================================

pub const RING_UNITS: u32 = 6;
pub const RING_LAST_STEP: Tstep = 70;

/// `(unit, neighbour, tstep)` of every attributed firing in the ring run.
pub const RING_FIRINGS: [(u32, u32, Tstep); 5] =
    [(5, 0, 20), (4, 5, 30), (3, 4, 40), (2, 3, 51), (1, 2, 61)];

/// Unit 0 switches at step 11, but its column could not be attributed.
pub const RING_UNATTRIBUTED_STEP: Tstep = 11;

fn ring_switch_step(unit: u32) -> Option<Tstep> {
    if unit == 0 {
        return Some(RING_UNATTRIBUTED_STEP);
    }
    RING_FIRINGS
        .iter()
        .find(|(u, _, _)| *u == unit)
        .map(|&(_, _, step)| step)
}

/// Occupancy of states `a` and `b` for the ring run.
pub fn ring_run_places() -> PlaceTable {
    let rows = (0..RING_UNITS)
        .flat_map(|u| switching_unit(u, "a", "b", ring_switch_step(u), RING_LAST_STEP))
        .collect();
    PlaceTable::new(rows).expect("ring fixture places are valid")
}

/// Firing counts of `f1ab` for every (unit, ring neighbour) pair at every
/// step, plus one unattributed column.
pub fn ring_run_transitions() -> TransitionTable {
    let mut rows = Vec::new();
    for step in 0..=RING_LAST_STEP {
        for unit in 0..RING_UNITS {
            let left = (unit + RING_UNITS - 1) % RING_UNITS;
            let right = (unit + 1) % RING_UNITS;
            for neighbour in [left, right] {
                let fired = RING_FIRINGS.contains(&(unit, neighbour, step));
                rows.push(transition_row(
                    step,
                    "f1ab",
                    Some(unit),
                    neighbour,
                    None,
                    u32::from(fired),
                ));
            }
        }
        let unattributed = u32::from(step == RING_UNATTRIBUTED_STEP);
        rows.push(transition_row(step, "f1ab", None, 1, None, unattributed));
    }
    TransitionTable::new(rows).expect("ring fixture transitions are valid")
}

// ===========================================================================
// Pair run: five units, follow two neighbours a -> b
// ===========================================================================

pub const PAIR_LAST_STEP: Tstep = 40;

/// `(unit, neighbour, neighbour2, tstep)` of every firing in the pair run.
pub const PAIR_FIRINGS: [(u32, u32, u32, Tstep); 3] =
    [(2, 0, 1, 15), (3, 1, 2, 25), (4, 2, 3, 35)];

/// Units 0 and 1 start in `b`; 2, 3 and 4 start in `a` and switch when
/// both preceding units hold `b`.
pub fn pair_run_places() -> PlaceTable {
    let mut rows = Vec::new();
    for unit in 0..2 {
        rows.extend(place_series(unit, "a", &[0; PAIR_LAST_STEP as usize + 1]));
        rows.extend(place_series(unit, "b", &[1; PAIR_LAST_STEP as usize + 1]));
    }
    for &(unit, _, _, step) in &PAIR_FIRINGS {
        rows.extend(switching_unit(unit, "a", "b", Some(step), PAIR_LAST_STEP));
    }
    PlaceTable::new(rows).expect("pair fixture places are valid")
}

pub fn pair_run_transitions() -> TransitionTable {
    let mut rows = Vec::new();
    for step in 0..=PAIR_LAST_STEP {
        for &(unit, n1, n2, fire_step) in &PAIR_FIRINGS {
            let count = u32::from(step == fire_step);
            rows.push(transition_row(step, "f2ab", Some(unit), n1, Some(n2), count));
        }
    }
    TransitionTable::new(rows).expect("pair fixture transitions are valid")
}
