//! Read-only views over a causal graph, used by plotting and grouping code.

use crate::graph::CausalGraph;
use crate::id::UnitId;
use crate::occasion::Occasion;
use std::collections::{BTreeMap, BTreeSet};

/// Every distinct state label carried by an occasion in the graph.
pub fn extract_state_names(graph: &CausalGraph) -> BTreeSet<String> {
    graph
        .occasions()
        .map(|(_, occasion)| occasion.state.clone())
        .collect()
}

/// Every distinct unit appearing in the graph.
pub fn extract_unit_numbers(graph: &CausalGraph) -> BTreeSet<UnitId> {
    graph.occasions().map(|(_, occasion)| occasion.unit).collect()
}

/// Occasions grouped by state, each list in graph insertion order.
pub fn index_by_state(graph: &CausalGraph) -> BTreeMap<String, Vec<Occasion>> {
    let mut index: BTreeMap<String, Vec<Occasion>> = BTreeMap::new();
    for (_, occasion) in graph.occasions() {
        index
            .entry(occasion.state.clone())
            .or_default()
            .push(occasion.clone());
    }
    index
}
