//! Loading a complete run directory into core tables.
//!
//! A run directory holds:
//!
//! - `places.{ron,json,toml}` -- list of [`PlaceRecord`] (required)
//! - `transitions.{ron,json,toml}` -- list of [`TransitionRecord`] (required)
//! - `analysis.{ron,json,toml}` -- [`AnalysisConfig`] (optional)
//!
//! TOML list files keep their rows under a `places` or `transitions` key.

use std::path::Path;

use occasion_core::builder::{BuildConfig, CausalGraphBuilder, Reconstruction};
use occasion_core::extract::{self, FiredEvent, PlaceEvent};
use occasion_core::id::UnitId;
use occasion_core::table::{PlaceRow, PlaceTable, TransitionRow, TransitionTable, assign_timesteps};
use occasion_core::time::{SimTime, Tstep};
use tracing::debug;

use crate::loader::{
    DataLoadError, deserialize_file, deserialize_list, find_data_file, require_data_file,
};
use crate::schema::{AnalysisConfig, PlaceRecord, TransitionRecord};

/// Tables and settings of one simulation run, ready for reconstruction.
#[derive(Debug, Clone)]
pub struct RunData {
    pub places: PlaceTable,
    pub transitions: TransitionTable,
    pub analysis: AnalysisConfig,
    /// Effective build settings: the configured step, or the one inferred
    /// from the place table.
    pub config: BuildConfig,
}

impl RunData {
    pub fn place_events(&self) -> Vec<PlaceEvent> {
        extract::place_increase_events(&self.places)
    }

    pub fn fired_events(&self) -> Vec<FiredEvent> {
        extract::fired_events(&self.transitions)
    }

    /// Run the full reconstruction over this run's tables.
    pub fn reconstruct(&self) -> Result<Reconstruction, DataLoadError> {
        let builder = CausalGraphBuilder::new(&self.place_events(), self.config)?;
        Ok(builder.build(&self.fired_events())?)
    }
}

/// Load a run directory.
pub fn load_run(dir: &Path) -> Result<RunData, DataLoadError> {
    let analysis: AnalysisConfig = match find_data_file(dir, "analysis")? {
        Some(path) => deserialize_file(&path)?,
        None => AnalysisConfig::default(),
    };

    let places_path = require_data_file(dir, "places")?;
    let records: Vec<PlaceRecord> = deserialize_list(&places_path, "places")?;
    let mut places =
        places_from_records(records, analysis.drop_non_coloured_sums, &places_path)?;

    let transitions_path = require_data_file(dir, "transitions")?;
    let records: Vec<TransitionRecord> = deserialize_list(&transitions_path, "transitions")?;
    let mut transitions = transitions_from_records(records, &transitions_path)?;

    if !analysis.place_names.is_empty() {
        places = places.filter_by_name(&analysis.place_names);
    }
    if !analysis.transition_names.is_empty() {
        transitions = transitions.filter_by_name(&analysis.transition_names);
    }

    let time_per_step = match analysis.time_per_step {
        Some(step) => step,
        None => places
            .time_range()
            .and_then(|range| range.step)
            .ok_or_else(|| DataLoadError::MissingTimeStep {
                dir: dir.to_path_buf(),
            })?,
    };
    let config = BuildConfig::new(time_per_step)?;

    debug!(
        dir = %dir.display(),
        places = places.len(),
        transitions = transitions.len(),
        time_per_step,
        "loaded run"
    );

    Ok(RunData {
        places,
        transitions,
        analysis,
        config,
    })
}

// ---------------------------------------------------------------------------
// Record conversion
// ---------------------------------------------------------------------------

/// Convert place records into a validated table.
///
/// Records without a unit are aggregate sums; they are dropped when
/// `drop_non_coloured_sums` is set and rejected otherwise.
pub fn places_from_records(
    records: Vec<PlaceRecord>,
    drop_non_coloured_sums: bool,
    file: &Path,
) -> Result<PlaceTable, DataLoadError> {
    let tsteps = tsteps_for(&records, |r| r.tstep, |r| r.time, file)?;
    let mut rows = Vec::with_capacity(records.len());
    let mut dropped = 0usize;

    for (record_idx, (record, tstep)) in records.into_iter().zip(tsteps).enumerate() {
        if let Some(kind) = record.kind.as_deref()
            && kind != "place"
        {
            return Err(schema_error(
                file,
                record_idx,
                format!("expected type 'place', got '{kind}'"),
            ));
        }
        let time = finite_time(record.time, file, record_idx)?;
        let Some(num) = record.num else {
            if drop_non_coloured_sums {
                dropped += 1;
                continue;
            }
            return Err(schema_error(file, record_idx, "place row has no unit number"));
        };
        rows.push(PlaceRow {
            tstep,
            time,
            unit: UnitId(num),
            state: record.name,
            count: record.count,
        });
    }

    if dropped > 0 {
        debug!(file = %file.display(), dropped, "dropped uncoloured place sums");
    }
    Ok(PlaceTable::new(rows)?)
}

/// Convert transition records into a validated table.
pub fn transitions_from_records(
    records: Vec<TransitionRecord>,
    file: &Path,
) -> Result<TransitionTable, DataLoadError> {
    let tsteps = tsteps_for(&records, |r| r.tstep, |r| r.time, file)?;
    let mut rows = Vec::with_capacity(records.len());

    for (record_idx, (record, tstep)) in records.into_iter().zip(tsteps).enumerate() {
        let time = finite_time(record.time, file, record_idx)?;
        let neighbour = record
            .neighbour
            .ok_or_else(|| schema_error(file, record_idx, "transition row has no neighbour"))?;
        rows.push(TransitionRow {
            tstep,
            time,
            name: record.name,
            unit: record.unit.map(UnitId),
            neighbour: UnitId(neighbour),
            neighbour2: record.neighbour2.map(UnitId),
            count: record.count,
        });
    }

    Ok(TransitionTable::new(rows)?)
}

/// Recorded sample indices, or indices numbered from the distinct times
/// when any record lacks one.
fn tsteps_for<R>(
    records: &[R],
    tstep: impl Fn(&R) -> Option<u64>,
    time: impl Fn(&R) -> f64,
    file: &Path,
) -> Result<Vec<Tstep>, DataLoadError> {
    if let Some(recorded) = records.iter().map(&tstep).collect::<Option<Vec<_>>>() {
        return Ok(recorded);
    }
    let times = records
        .iter()
        .enumerate()
        .map(|(idx, r)| finite_time(time(r), file, idx))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(file = %file.display(), "numbering timesteps from distinct times");
    Ok(assign_timesteps(&times))
}

fn finite_time(value: f64, file: &Path, record: usize) -> Result<SimTime, DataLoadError> {
    SimTime::new(value).map_err(|e| schema_error(file, record, e))
}

fn schema_error(file: &Path, record: usize, detail: impl ToString) -> DataLoadError {
    DataLoadError::Schema {
        file: file.to_path_buf(),
        record,
        detail: detail.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn file() -> PathBuf {
        PathBuf::from("places.json")
    }

    fn place(tstep: Option<u64>, time: f64, name: &str, num: Option<u32>, count: u32) -> PlaceRecord {
        PlaceRecord {
            tstep,
            time,
            kind: None,
            name: name.to_string(),
            num,
            count,
        }
    }

    fn transition(time: f64, unit: Option<u32>, neighbour: Option<u32>) -> TransitionRecord {
        TransitionRecord {
            tstep: None,
            time,
            name: "f1ab".to_string(),
            unit,
            neighbour,
            neighbour2: None,
            count: 1,
        }
    }

    #[test]
    fn uncoloured_sums_are_dropped() {
        let records = vec![
            place(Some(0), 0.0, "a", Some(1), 1),
            place(Some(0), 0.0, "a", None, 5),
        ];
        let table = places_from_records(records, true, &file()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].unit, UnitId(1));
    }

    #[test]
    fn uncoloured_sums_are_rejected_when_not_dropping() {
        let records = vec![
            place(Some(0), 0.0, "a", Some(1), 1),
            place(Some(0), 0.0, "a", None, 5),
        ];
        let err = places_from_records(records, false, &file()).unwrap_err();
        assert!(matches!(err, DataLoadError::Schema { record: 1, .. }));
    }

    #[test]
    fn missing_tsteps_are_numbered_from_times() {
        let records = vec![
            place(None, 0.5, "a", Some(1), 1),
            place(None, 0.0, "a", Some(2), 1),
            place(Some(9), 0.5, "a", Some(2), 0),
        ];
        let table = places_from_records(records, true, &file()).unwrap();
        let steps: Vec<(u64, f64)> = table
            .rows()
            .iter()
            .map(|r| (r.tstep, r.time.as_f64()))
            .collect();
        // Numbered in order of first appearance, then sorted by tstep.
        assert_eq!(steps, vec![(0, 0.5), (0, 0.5), (1, 0.0)]);
    }

    #[test]
    fn recorded_tsteps_are_kept() {
        let records = vec![place(Some(7), 0.7, "a", Some(1), 1)];
        let table = places_from_records(records, true, &file()).unwrap();
        assert_eq!(table.rows()[0].tstep, 7);
    }

    #[test]
    fn wrong_row_kind_is_rejected() {
        let mut record = place(Some(0), 0.0, "a", Some(1), 1);
        record.kind = Some("transition".to_string());
        let err = places_from_records(vec![record], true, &file()).unwrap_err();
        assert!(matches!(err, DataLoadError::Schema { record: 0, .. }));
    }

    #[test]
    fn non_finite_time_is_rejected() {
        let records = vec![place(Some(0), f64::NAN, "a", Some(1), 1)];
        let err = places_from_records(records, true, &file()).unwrap_err();
        assert!(matches!(err, DataLoadError::Schema { .. }));
    }

    #[test]
    fn duplicate_place_rows_surface_as_table_errors() {
        let records = vec![
            place(Some(0), 0.0, "a", Some(1), 1),
            place(Some(0), 0.0, "a", Some(1), 0),
        ];
        let err = places_from_records(records, true, &file()).unwrap_err();
        assert!(matches!(err, DataLoadError::Table(_)));
    }

    #[test]
    fn unattributed_transitions_keep_no_unit() {
        let records = vec![transition(0.0, Some(1), Some(0)), transition(0.1, None, Some(2))];
        let table = transitions_from_records(records, &file()).unwrap();
        assert_eq!(table.rows()[0].unit, Some(UnitId(1)));
        assert_eq!(table.rows()[1].unit, None);
        assert_eq!(table.rows()[1].tstep, 1);
    }

    #[test]
    fn transition_without_neighbour_is_rejected() {
        let records = vec![transition(0.0, Some(1), None)];
        let err = transitions_from_records(records, &file()).unwrap_err();
        assert!(matches!(err, DataLoadError::Schema { record: 0, .. }));
    }
}
