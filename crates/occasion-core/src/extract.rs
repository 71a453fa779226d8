//! Event extraction from tidied tables.
//!
//! Two event streams feed the causal graph builder:
//!
//! - **Place-increase events** -- timesteps at which a unit's token count in
//!   a state rose above its previous value ([`place_increase_events`]).
//! - **Fired events** -- timesteps at which a transition instance fired at
//!   least once ([`fired_events`]).

use crate::id::UnitId;
use crate::table::{PlaceRow, PlaceTable, TransitionRow, TransitionTable};
use crate::time::{SimTime, Tstep};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

// ---------------------------------------------------------------------------
// Place events
// ---------------------------------------------------------------------------

/// A unit's count in `state` rose at `tstep`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceEvent {
    pub tstep: Tstep,
    pub time: SimTime,
    pub unit: UnitId,
    pub state: String,
}

impl From<&PlaceRow> for PlaceEvent {
    fn from(row: &PlaceRow) -> Self {
        Self {
            tstep: row.tstep,
            time: row.time,
            unit: row.unit,
            state: row.state.clone(),
        }
    }
}

/// Rows at which a `(unit, state)` count strictly increased over the
/// previous row for the same pair, sorted by `(time, state, unit)`.
///
/// The first row of each pair is compared against an implicit zero, so a
/// positive initial marking counts as an increase. Decreases and unchanged
/// counts never produce an event.
pub fn place_increase_events(places: &PlaceTable) -> Vec<PlaceEvent> {
    let mut previous: HashMap<(UnitId, &str), u32> = HashMap::new();
    let mut events = Vec::new();

    for row in places.rows() {
        let prev = previous.insert((row.unit, row.state.as_str()), row.count);
        if row.count > prev.unwrap_or(0) {
            events.push(PlaceEvent::from(row));
        }
    }

    events.sort_by(|a, b| {
        (a.time, &a.state, a.unit).cmp(&(b.time, &b.state, b.unit))
    });
    events
}

/// Every row sampled at a timestep where at least one `(unit, state)`
/// count changed, sorted by `(time, state, unit)`.
///
/// The first row of each pair counts as a change. Useful for thinning a
/// long run down to the frames where something happened.
pub fn place_changed_events(places: &PlaceTable) -> Vec<PlaceRow> {
    let mut previous: HashMap<(UnitId, &str), u32> = HashMap::new();
    let mut changed: BTreeSet<Tstep> = BTreeSet::new();

    for row in places.rows() {
        let prev = previous.insert((row.unit, row.state.as_str()), row.count);
        if prev != Some(row.count) {
            changed.insert(row.tstep);
        }
    }

    let mut rows: Vec<PlaceRow> = places
        .rows()
        .iter()
        .filter(|r| changed.contains(&r.tstep))
        .cloned()
        .collect();
    rows.sort_by(|a, b| {
        (a.time, &a.state, a.unit).cmp(&(b.time, &b.state, b.unit))
    });
    rows
}

// ---------------------------------------------------------------------------
// Fired events
// ---------------------------------------------------------------------------

/// The neighbour units whose state satisfied a firing guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Neighbours {
    /// Single-neighbour rule (e.g. follow one neighbour).
    One(UnitId),
    /// Two-neighbour rule (e.g. follow when both neighbours agree).
    Two(UnitId, UnitId),
}

impl Neighbours {
    pub fn arity(&self) -> usize {
        match self {
            Neighbours::One(_) => 1,
            Neighbours::Two(_, _) => 2,
        }
    }

    /// Neighbour units in column order.
    pub fn units(&self) -> impl Iterator<Item = UnitId> {
        let (first, second) = match *self {
            Neighbours::One(n) => (n, None),
            Neighbours::Two(n1, n2) => (n1, Some(n2)),
        };
        std::iter::once(first).chain(second)
    }
}

/// A transition instance that fired at least once during a sampled step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiredEvent {
    pub tstep: Tstep,
    pub time: SimTime,
    /// Undecoded transition name, `{prefix}{input}{output}`.
    pub name: String,
    /// Firing unit; `None` when the upstream column could not be attributed.
    pub unit: Option<UnitId>,
    pub neighbours: Neighbours,
    /// Number of firings folded into this sample. Advisory only.
    pub count: u32,
}

impl From<&TransitionRow> for FiredEvent {
    fn from(row: &TransitionRow) -> Self {
        let neighbours = match row.neighbour2 {
            Some(n2) => Neighbours::Two(row.neighbour, n2),
            None => Neighbours::One(row.neighbour),
        };
        Self {
            tstep: row.tstep,
            time: row.time,
            name: row.name.clone(),
            unit: row.unit,
            neighbours,
            count: row.count,
        }
    }
}

/// Rows with a positive firing count, sorted by `(time, unit)`.
///
/// Rows without a firing unit sort after attributed rows at the same time.
/// Counts above one are passed through untouched.
pub fn fired_events(transitions: &TransitionTable) -> Vec<FiredEvent> {
    let mut events: Vec<FiredEvent> = transitions
        .rows()
        .iter()
        .filter(|r| r.count > 0)
        .map(FiredEvent::from)
        .collect();
    events.sort_by_key(|e| (e.time, e.unit.is_none(), e.unit));
    events
}
