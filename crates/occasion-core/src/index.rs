//! Time-sorted lookup of place-increase events by `(unit, state)`.

use crate::extract::PlaceEvent;
use crate::id::UnitId;
use crate::time::SimTime;
use std::collections::HashMap;

/// Which rule matched an upstream event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    /// Latest event strictly before the query time.
    Before,
    /// Event at exactly the query time.
    Coincident,
    /// Earliest event no later than one sampling step after the query time.
    WithinStep,
}

/// Place-increase event times grouped per unit and state.
///
/// Each key holds a sorted, de-duplicated vector of times so every lookup
/// is a binary search.
#[derive(Debug, Clone, Default)]
pub struct PlaceEventIndex {
    times: HashMap<UnitId, HashMap<String, Vec<SimTime>>>,
    len: usize,
}

impl PlaceEventIndex {
    pub fn new(events: &[PlaceEvent]) -> Self {
        let mut times: HashMap<UnitId, HashMap<String, Vec<SimTime>>> = HashMap::new();
        for event in events {
            times
                .entry(event.unit)
                .or_default()
                .entry(event.state.clone())
                .or_default()
                .push(event.time);
        }

        let mut len = 0;
        for per_unit in times.values_mut() {
            for series in per_unit.values_mut() {
                series.sort_unstable();
                series.dedup();
                len += series.len();
            }
        }

        Self { times, len }
    }

    /// Number of distinct `(unit, state, time)` entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// All indexed event times for `(unit, state)`, ascending.
    pub fn times(&self, unit: UnitId, state: &str) -> &[SimTime] {
        self.times
            .get(&unit)
            .and_then(|per_unit| per_unit.get(state))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Find the upstream event for `(unit, state)` relative to `time`.
    ///
    /// Tried in order:
    /// 1. the latest event strictly before `time`;
    /// 2. an event at exactly `time`;
    /// 3. the earliest event at or before `time + time_per_step`.
    ///
    /// Returns `None` when no tier matches.
    pub fn resolve(
        &self,
        unit: UnitId,
        state: &str,
        time: SimTime,
        time_per_step: f64,
    ) -> Option<(SimTime, MatchTier)> {
        let series = self.times(unit, state);
        let split = series.partition_point(|t| *t < time);

        if split > 0 {
            return Some((series[split - 1], MatchTier::Before));
        }

        // Nothing earlier, so every remaining candidate is at or after `time`
        // and the earliest one is at `split`.
        let next = *series.get(split)?;
        if next == time {
            return Some((next, MatchTier::Coincident));
        }
        let limit = time.checked_add(time_per_step)?;
        (next <= limit).then_some((next, MatchTier::WithinStep))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(v: f64) -> SimTime {
        SimTime::new(v).unwrap()
    }

    fn event(unit: u32, state: &str, time: f64) -> PlaceEvent {
        PlaceEvent {
            tstep: (time * 10.0).round() as u64,
            time: t(time),
            unit: UnitId(unit),
            state: state.to_string(),
        }
    }

    #[test]
    fn times_are_sorted_per_key() {
        let index = PlaceEventIndex::new(&[
            event(0, "a", 4.0),
            event(0, "a", 0.0),
            event(0, "b", 2.0),
            event(1, "a", 0.0),
        ]);
        assert_eq!(index.times(UnitId(0), "a"), &[t(0.0), t(4.0)]);
        assert_eq!(index.times(UnitId(0), "b"), &[t(2.0)]);
        assert!(index.times(UnitId(2), "a").is_empty());
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn strictly_before_wins() {
        let index = PlaceEventIndex::new(&[
            event(0, "a", 0.0),
            event(0, "a", 1.0),
            event(0, "a", 2.0),
            event(0, "a", 3.0),
        ]);
        assert_eq!(
            index.resolve(UnitId(0), "a", t(2.0), 0.1),
            Some((t(1.0), MatchTier::Before))
        );
    }

    #[test]
    fn coincident_when_nothing_earlier() {
        let index = PlaceEventIndex::new(&[event(0, "b", 2.0), event(0, "b", 2.05)]);
        assert_eq!(
            index.resolve(UnitId(0), "b", t(2.0), 0.1),
            Some((t(2.0), MatchTier::Coincident))
        );
    }

    #[test]
    fn within_one_step_after() {
        let index = PlaceEventIndex::new(&[event(0, "b", 2.5), event(0, "b", 2.55)]);
        assert_eq!(
            index.resolve(UnitId(0), "b", t(2.4), 0.2),
            Some((t(2.5), MatchTier::WithinStep))
        );
    }

    #[test]
    fn step_window_is_closed() {
        let index = PlaceEventIndex::new(&[event(0, "b", 3.0)]);
        assert_eq!(
            index.resolve(UnitId(0), "b", t(2.0), 1.0),
            Some((t(3.0), MatchTier::WithinStep))
        );
    }

    #[test]
    fn beyond_one_step_is_unresolved() {
        let index = PlaceEventIndex::new(&[event(0, "b", 3.0)]);
        assert_eq!(index.resolve(UnitId(0), "b", t(2.0), 0.5), None);
        assert_eq!(index.resolve(UnitId(0), "c", t(2.0), 0.5), None);
    }
}
