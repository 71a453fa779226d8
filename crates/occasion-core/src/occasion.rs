use crate::id::UnitId;
use crate::time::SimTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A unit entering a state at a specific time.
///
/// `time` is `None` when no upstream event could be matched for a cause
/// (see [`PlaceEventIndex::resolve`](crate::index::PlaceEventIndex::resolve)).
/// Such occasions are kept in the graph rather than rejected; all of them
/// for the same `(unit, state)` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Occasion {
    pub unit: UnitId,
    pub state: String,
    pub time: Option<SimTime>,
}

impl Occasion {
    pub fn new(unit: UnitId, state: impl Into<String>, time: SimTime) -> Self {
        Self {
            unit,
            state: state.into(),
            time: Some(time),
        }
    }

    /// An occasion whose time could not be determined.
    pub fn undefined(unit: UnitId, state: impl Into<String>) -> Self {
        Self {
            unit,
            state: state.into(),
            time: None,
        }
    }

    pub fn has_defined_time(&self) -> bool {
        self.time.is_some()
    }
}

/// Renders as `{state}{unit}@{time}`, e.g. `a1@4.1`, with `nan` for an
/// undefined time.
impl fmt::Display for Occasion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.time {
            Some(time) => write!(f, "{}{}@{}", self.state, self.unit, time),
            None => write!(f, "{}{}@nan", self.state, self.unit),
        }
    }
}
