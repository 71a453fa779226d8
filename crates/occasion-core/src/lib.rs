//! Occasion Core -- causal reconstruction of agent-based network simulations.
//!
//! A stochastic simulation of units adopting their neighbours' states
//! produces two sampled time series: per-unit token counts for each state
//! (places) and per-instance firing counts for each transition. This crate
//! turns those series into a causal graph of *occasions* -- a unit entering
//! a state at a time -- with an edge from every earlier occasion that
//! enabled a later one.
//!
//! # Pipeline
//!
//! 1. **Tables** -- validated, tidied rows ([`table::PlaceTable`],
//!    [`table::TransitionTable`]).
//! 2. **Extraction** -- place-increase events and fired events
//!    ([`extract`]).
//! 3. **Reconstruction** -- matching each firing against earlier place
//!    events ([`builder::CausalGraphBuilder`]).
//! 4. **Queries** -- grouping occasions for display ([`query`]).
//!
//! ```rust,ignore
//! let place_events = extract::place_increase_events(&places);
//! let fired = extract::fired_events(&transitions);
//! let graph = builder::generate_causal_graph(&place_events, &fired, 0.1)?;
//! ```
//!
//! # Key Types
//!
//! - [`occasion::Occasion`] -- `(unit, state, time)` value; time may be
//!   undefined when no cause could be matched.
//! - [`graph::CausalGraph`] -- slot-map backed DAG with value-keyed nodes.
//! - [`index::PlaceEventIndex`] -- per `(unit, state)` sorted event times.
//! - [`transition_name::TransitionName`] -- decoded
//!   `{prefix}{input}{output}` transition name.
//!
//! No I/O happens here; see the `occasion-data` crate for loading tables.

pub mod builder;
pub mod extract;
pub mod graph;
pub mod id;
pub mod index;
pub mod occasion;
pub mod query;
pub mod table;
pub mod time;
pub mod transition_name;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
