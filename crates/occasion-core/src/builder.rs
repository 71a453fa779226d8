//! Causal graph reconstruction from place-increase and fired events.
//!
//! # Algorithm
//!
//! 1. Every place-increase event at timestep 0 becomes a root occasion.
//! 2. Each fired event, in time order, becomes an output occasion
//!    `(unit, output_state, time)` linked from:
//!    - the firing unit's latest entry into the input state (local cause);
//!    - each neighbour's latest entry into the output state (the guard
//!      requires the neighbour to already hold the state being spread).
//!
//! Upstream entries are matched with [`PlaceEventIndex::resolve`]. When no
//! tier matches, the cause is recorded with an undefined time instead of
//! failing; the [`BuildReport`] lists every such case.

use crate::extract::{FiredEvent, PlaceEvent};
use crate::graph::CausalGraph;
use crate::id::UnitId;
use crate::index::{MatchTier, PlaceEventIndex};
use crate::occasion::Occasion;
use crate::time::{SimTime, Tstep};
use crate::transition_name::{NameError, TransitionName};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Errors and configuration
// ---------------------------------------------------------------------------

/// Errors that abort a reconstruction.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("time_per_step must be positive and finite, got {0}")]
    InvalidTimeStep(f64),
    #[error(transparent)]
    Name(#[from] NameError),
}

/// Parameters of a reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Sampling interval of the simulator output.
    pub time_per_step: f64,
}

impl BuildConfig {
    pub fn new(time_per_step: f64) -> Result<Self, BuildError> {
        let config = Self { time_per_step };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), BuildError> {
        if self.time_per_step.is_finite() && self.time_per_step > 0.0 {
            Ok(())
        } else {
            Err(BuildError::InvalidTimeStep(self.time_per_step))
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Which input of a firing a cause stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CauseRole {
    Local,
    Neighbour,
    SecondNeighbour,
}

/// A fired row dropped because its firing unit is unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFiring {
    pub tstep: Tstep,
    pub time: SimTime,
    pub name: String,
}

/// A cause for which no upstream place event was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedCause {
    pub effect: Occasion,
    /// The placeholder occasion linked in, with an undefined time.
    pub cause: Occasion,
    pub role: CauseRole,
}

/// How many causes each lookup tier matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TierCounts {
    pub before: usize,
    pub coincident: usize,
    pub within_step: usize,
}

/// Non-fatal observations made while building a graph.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// Fired rows turned into occasions.
    pub processed: usize,
    pub skipped: Vec<SkippedFiring>,
    pub unresolved: Vec<UnresolvedCause>,
    /// Rows reporting more than one firing in a sample. Each still yields a
    /// single occasion.
    pub multi_firings: usize,
    pub tiers: TierCounts,
}

impl BuildReport {
    /// True when nothing was skipped or left unresolved.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.unresolved.is_empty()
    }
}

/// A built graph together with its report.
#[derive(Debug, Clone)]
pub struct Reconstruction {
    pub graph: CausalGraph,
    pub report: BuildReport,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Reconstructs causal graphs against one indexed set of place events.
#[derive(Debug, Clone)]
pub struct CausalGraphBuilder {
    index: PlaceEventIndex,
    roots: Vec<Occasion>,
    config: BuildConfig,
}

impl CausalGraphBuilder {
    /// Index `place_events` for cause lookup. Events at timestep 0 become
    /// the roots, in the order given.
    pub fn new(place_events: &[PlaceEvent], config: BuildConfig) -> Result<Self, BuildError> {
        config.validate()?;
        let roots = place_events
            .iter()
            .filter(|e| e.tstep == 0)
            .map(|e| Occasion::new(e.unit, e.state.clone(), e.time))
            .collect();
        Ok(Self {
            index: PlaceEventIndex::new(place_events),
            roots,
            config,
        })
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn index(&self) -> &PlaceEventIndex {
        &self.index
    }

    /// Build the causal graph for `fired`.
    ///
    /// Rows are processed in `(time, unit)` order regardless of input order.
    /// Fails only on a malformed transition name.
    pub fn build(&self, fired: &[FiredEvent]) -> Result<Reconstruction, BuildError> {
        let mut graph = CausalGraph::new();
        let mut report = BuildReport::default();

        for root in &self.roots {
            graph.add_occasion(root.clone());
        }

        let mut ordered: Vec<&FiredEvent> = fired.iter().collect();
        ordered.sort_by_key(|e| (e.time, e.unit.is_none(), e.unit));

        for event in ordered {
            let name = TransitionName::decode(&event.name)?;

            let Some(unit) = event.unit else {
                warn!(
                    tstep = event.tstep,
                    time = %event.time,
                    transition = %event.name,
                    "fired row has no firing unit; skipping"
                );
                report.skipped.push(SkippedFiring {
                    tstep: event.tstep,
                    time: event.time,
                    name: event.name.clone(),
                });
                continue;
            };

            if event.count > 1 {
                debug!(
                    tstep = event.tstep,
                    unit = %unit,
                    count = event.count,
                    "multiple firings in one sample; recording one occasion"
                );
                report.multi_firings += 1;
            }

            let output_state = name.output_label();
            let output = Occasion::new(unit, output_state.clone(), event.time);
            graph.add_occasion(output.clone());

            let local = self.resolve_cause(
                unit,
                &name.input_label(),
                &output,
                CauseRole::Local,
                &mut report,
            );
            graph.add_cause(local, output.clone());

            for (position, neighbour) in event.neighbours.units().enumerate() {
                let role = if position == 0 {
                    CauseRole::Neighbour
                } else {
                    CauseRole::SecondNeighbour
                };
                let cause = self.resolve_cause(neighbour, &output_state, &output, role, &mut report);
                graph.add_cause(cause, output.clone());
            }

            report.processed += 1;
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            processed = report.processed,
            skipped = report.skipped.len(),
            unresolved = report.unresolved.len(),
            "causal graph built"
        );

        Ok(Reconstruction { graph, report })
    }

    fn resolve_cause(
        &self,
        unit: UnitId,
        state: &str,
        effect: &Occasion,
        role: CauseRole,
        report: &mut BuildReport,
    ) -> Occasion {
        // Output occasions are always built with a defined time.
        let time = effect.time.unwrap_or(SimTime::ZERO);

        match self.index.resolve(unit, state, time, self.config.time_per_step) {
            Some((found, tier)) => {
                match tier {
                    MatchTier::Before => report.tiers.before += 1,
                    MatchTier::Coincident => report.tiers.coincident += 1,
                    MatchTier::WithinStep => report.tiers.within_step += 1,
                }
                Occasion::new(unit, state, found)
            }
            None => {
                let cause = Occasion::undefined(unit, state);
                warn!(
                    effect = %effect,
                    cause = %cause,
                    ?role,
                    "no upstream place event found; linking undefined occasion"
                );
                report.unresolved.push(UnresolvedCause {
                    effect: effect.clone(),
                    cause: cause.clone(),
                    role,
                });
                cause
            }
        }
    }
}

/// Build a causal graph in one call, discarding the report.
pub fn generate_causal_graph(
    place_events: &[PlaceEvent],
    fired_events: &[FiredEvent],
    time_per_step: f64,
) -> Result<CausalGraph, BuildError> {
    let builder = CausalGraphBuilder::new(place_events, BuildConfig::new(time_per_step)?)?;
    Ok(builder.build(fired_events)?.graph)
}
