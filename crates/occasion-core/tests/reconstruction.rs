//! End-to-end reconstruction tests.
//!
//! These tests run the full pipeline -- tables, event extraction, causal
//! graph building and queries -- over complete fixture runs and compare
//! against fixed node and edge lists.

use occasion_core::builder::{BuildConfig, CausalGraphBuilder, generate_causal_graph};
use occasion_core::extract::{fired_events, place_increase_events};
use occasion_core::graph::CausalGraph;
use occasion_core::id::UnitId;
use occasion_core::occasion::Occasion;
use occasion_core::query::{extract_state_names, extract_unit_numbers, index_by_state};
use occasion_core::test_utils::*;

fn ring_graph() -> CausalGraph {
    let place_events = place_increase_events(&ring_run_places());
    let fired = fired_events(&ring_run_transitions());
    generate_causal_graph(&place_events, &fired, TIME_PER_STEP).unwrap()
}

fn node_list(graph: &CausalGraph) -> Vec<Occasion> {
    graph.occasions().map(|(_, o)| o.clone()).collect()
}

fn edge_labels(graph: &CausalGraph) -> String {
    let pairs: Vec<String> = graph
        .cause_pairs()
        .map(|(cause, effect)| format!("({cause}, {effect})"))
        .collect();
    format!("[{}]", pairs.join(", "))
}

// ===========================================================================
// Ring run: six units following one neighbour
// ===========================================================================

#[test]
fn ring_run_reproduces_node_list() {
    let graph = ring_graph();

    let desired = vec![
        occ(0, "a", 0.0),
        occ(1, "a", 0.0),
        occ(2, "a", 0.0),
        occ(3, "a", 0.0),
        occ(4, "a", 0.0),
        occ(5, "a", 0.0),
        occ(5, "b", 2.0),
        occ(0, "b", 1.1),
        occ(4, "b", 3.0),
        occ(3, "b", 4.0),
        occ(2, "b", 5.1),
        occ(1, "b", 6.1),
    ];
    assert_eq!(node_list(&graph), desired);
}

#[test]
fn ring_run_reproduces_edge_list() {
    let graph = ring_graph();
    assert_eq!(
        edge_labels(&graph),
        "[(a1@0.0, b1@6.1), (a2@0.0, b2@5.1), (a3@0.0, b3@4.0), (a4@0.0, b4@3.0), \
         (a5@0.0, b5@2.0), (b5@2.0, b4@3.0), (b0@1.1, b5@2.0), (b4@3.0, b3@4.0), \
         (b3@4.0, b2@5.1), (b2@5.1, b1@6.1)]"
    );
}

#[test]
fn ring_run_is_acyclic_and_time_increases_along_edges() {
    let graph = ring_graph();
    assert!(graph.is_acyclic());
    for (cause, effect) in graph.cause_pairs() {
        assert!(cause.time.unwrap() < effect.time.unwrap(), "{cause} -> {effect}");
    }
}

#[test]
fn ring_run_report_lists_unattributed_row() {
    let place_events = place_increase_events(&ring_run_places());
    let fired = fired_events(&ring_run_transitions());
    let builder =
        CausalGraphBuilder::new(&place_events, BuildConfig::new(TIME_PER_STEP).unwrap()).unwrap();
    let reconstruction = builder.build(&fired).unwrap();

    let report = &reconstruction.report;
    assert_eq!(report.processed, RING_FIRINGS.len());
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].tstep, RING_UNATTRIBUTED_STEP);
    assert!(report.unresolved.is_empty());
    assert_eq!(report.tiers.before, 2 * RING_FIRINGS.len());
}

#[test]
fn ring_run_roots_are_initial_marking() {
    let graph = ring_graph();
    let roots: Vec<String> = graph.roots().map(|(_, o)| o.to_string()).collect();
    // b0@1.1 has no recorded firing, so it also appears as a root.
    assert_eq!(
        roots,
        vec!["a0@0.0", "a1@0.0", "a2@0.0", "a3@0.0", "a4@0.0", "a5@0.0", "b0@1.1"]
    );
}

#[test]
fn ring_run_queries() {
    let graph = ring_graph();

    let states: Vec<String> = extract_state_names(&graph).into_iter().collect();
    assert_eq!(states, vec!["a", "b"]);

    let units: Vec<UnitId> = extract_unit_numbers(&graph).into_iter().collect();
    assert_eq!(units, (0..6).map(UnitId).collect::<Vec<_>>());

    let by_state = index_by_state(&graph);
    assert_eq!(by_state["a"].len(), 6);
    let b_labels: Vec<String> = by_state["b"].iter().map(|o| o.to_string()).collect();
    assert_eq!(
        b_labels,
        vec!["b5@2.0", "b0@1.1", "b4@3.0", "b3@4.0", "b2@5.1", "b1@6.1"]
    );
}

// ===========================================================================
// Pair run: five units following two neighbours
// ===========================================================================

#[test]
fn pair_run_nodes_and_arity() {
    let place_events = place_increase_events(&pair_run_places());
    let fired = fired_events(&pair_run_transitions());
    let graph = generate_causal_graph(&place_events, &fired, TIME_PER_STEP).unwrap();

    let labels: Vec<String> = graph.occasions().map(|(_, o)| o.to_string()).collect();
    assert_eq!(
        labels,
        vec!["a2@0.0", "a3@0.0", "a4@0.0", "b0@0.0", "b1@0.0", "b2@1.5", "b3@2.5", "b4@3.5"]
    );

    for &(unit, _, _, step) in &PAIR_FIRINGS {
        let output = Occasion::new(UnitId(unit), "b", step_time(step));
        let id = graph.id_of(&output).unwrap();
        assert_eq!(graph.in_degree(id), 3, "{output}");
    }

    let b3 = graph.id_of(&occ(3, "b", 2.5)).unwrap();
    let causes: Vec<String> = graph.causes_of(b3).map(|o| o.to_string()).collect();
    assert_eq!(causes, vec!["a3@0.0", "b1@0.0", "b2@1.5"]);
    assert!(graph.is_acyclic());
}

#[test]
fn node_link_export_serialises_ring_run() {
    let export = ring_graph().to_node_link();
    assert_eq!(export.nodes.len(), 12);
    assert_eq!(export.links.len(), 10);

    let json = serde_json::to_value(&export).unwrap();
    assert_eq!(json["nodes"][7]["label"], "b0@1.1");
    assert_eq!(json["nodes"][7]["unit"], 0);
    assert_eq!(json["nodes"][7]["state"], "b");
    assert_eq!(json["links"][0]["source"], 1);
}
