use crate::id::*;
use crate::occasion::Occasion;
use serde::{Deserialize, Serialize};
use slotmap::{SecondaryMap, SlotMap};
use std::collections::{HashMap, VecDeque};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("cycle detected in causal graph")]
    CycleDetected,
}

// ---------------------------------------------------------------------------
// Core data structures
// ---------------------------------------------------------------------------

/// Adjacency lists for a single occasion, tracking incoming and outgoing edges.
#[derive(Debug, Clone, Default)]
struct NodeAdjacency {
    /// Edges whose effect is this occasion (its causes).
    inputs: Vec<CauseId>,
    /// Edges whose cause is this occasion (its effects).
    outputs: Vec<CauseId>,
}

/// A directed cause -> effect link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CauseEdge {
    pub from: OccasionId,
    pub to: OccasionId,
}

// ---------------------------------------------------------------------------
// CausalGraph
// ---------------------------------------------------------------------------

/// Directed graph of occasions and the earlier occasions that enabled them.
///
/// Nodes are identified by value: adding an [`Occasion`] that is already
/// present returns the existing [`OccasionId`]. Adding the same cause twice
/// is likewise a no-op. Nothing is ever removed, so slot-map iteration
/// order is insertion order.
#[derive(Debug, Clone, Default)]
pub struct CausalGraph {
    nodes: SlotMap<OccasionId, Occasion>,
    edges: SlotMap<CauseId, CauseEdge>,
    adjacency: SecondaryMap<OccasionId, NodeAdjacency>,
    lookup: HashMap<Occasion, OccasionId>,
}

impl CausalGraph {
    /// Create a new, empty causal graph.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Add an occasion, or return the id of the equal occasion already present.
    ///
    /// # Examples
    ///
    /// ```
    /// use occasion_core::graph::CausalGraph;
    /// use occasion_core::id::UnitId;
    /// use occasion_core::occasion::Occasion;
    /// use occasion_core::time::SimTime;
    ///
    /// let mut graph = CausalGraph::new();
    /// let a = graph.add_occasion(Occasion::new(UnitId(0), "a", SimTime::ZERO));
    /// let b = graph.add_occasion(Occasion::new(UnitId(0), "a", SimTime::ZERO));
    /// assert_eq!(a, b);
    /// assert_eq!(graph.node_count(), 1);
    /// ```
    pub fn add_occasion(&mut self, occasion: Occasion) -> OccasionId {
        if let Some(&id) = self.lookup.get(&occasion) {
            return id;
        }
        let id = self.nodes.insert(occasion.clone());
        self.adjacency.insert(id, NodeAdjacency::default());
        self.lookup.insert(occasion, id);
        id
    }

    /// Record that `cause` enabled `effect`, adding either occasion if needed.
    pub fn add_cause(&mut self, cause: Occasion, effect: Occasion) -> CauseId {
        let from = self.add_occasion(cause);
        let to = self.add_occasion(effect);
        self.connect(from, to)
    }

    /// Link two existing occasions. Returns the existing edge if they are
    /// already linked.
    fn connect(&mut self, from: OccasionId, to: OccasionId) -> CauseId {
        if let Some(existing) = self.outputs(from).iter().copied().find(|&eid| {
            self.edges.get(eid).is_some_and(|e| e.to == to)
        }) {
            return existing;
        }

        let edge_id = self.edges.insert(CauseEdge { from, to });
        if let Some(adj) = self.adjacency.get_mut(from) {
            adj.outputs.push(edge_id);
        }
        if let Some(adj) = self.adjacency.get_mut(to) {
            adj.inputs.push(edge_id);
        }
        edge_id
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Look up the id of an occasion by value.
    pub fn id_of(&self, occasion: &Occasion) -> Option<OccasionId> {
        self.lookup.get(occasion).copied()
    }

    pub fn contains(&self, occasion: &Occasion) -> bool {
        self.lookup.contains_key(occasion)
    }

    pub fn occasion(&self, id: OccasionId) -> Option<&Occasion> {
        self.nodes.get(id)
    }

    pub fn edge(&self, id: CauseId) -> Option<&CauseEdge> {
        self.edges.get(id)
    }

    /// Edges coming into an occasion (its causes).
    pub fn inputs(&self, id: OccasionId) -> &[CauseId] {
        self.adjacency
            .get(id)
            .map(|adj| adj.inputs.as_slice())
            .unwrap_or(&[])
    }

    /// Edges leaving an occasion (its effects).
    pub fn outputs(&self, id: OccasionId) -> &[CauseId] {
        self.adjacency
            .get(id)
            .map(|adj| adj.outputs.as_slice())
            .unwrap_or(&[])
    }

    pub fn in_degree(&self, id: OccasionId) -> usize {
        self.inputs(id).len()
    }

    /// Occasions that directly caused `id`, in the order they were linked.
    pub fn causes_of(&self, id: OccasionId) -> impl Iterator<Item = &Occasion> {
        self.inputs(id)
            .iter()
            .filter_map(|&eid| self.edges.get(eid))
            .filter_map(|e| self.nodes.get(e.from))
    }

    /// Occasions directly caused by `id`, in the order they were linked.
    pub fn effects_of(&self, id: OccasionId) -> impl Iterator<Item = &Occasion> {
        self.outputs(id)
            .iter()
            .filter_map(|&eid| self.edges.get(eid))
            .filter_map(|e| self.nodes.get(e.to))
    }

    /// Occasions with no causes.
    pub fn roots(&self) -> impl Iterator<Item = (OccasionId, &Occasion)> {
        self.nodes
            .iter()
            .filter(|(id, _)| self.inputs(*id).is_empty())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all occasions in insertion order.
    pub fn occasions(&self) -> impl Iterator<Item = (OccasionId, &Occasion)> {
        self.nodes.iter()
    }

    /// Iterate over all edge IDs and their data, in creation order.
    pub fn edges(&self) -> impl Iterator<Item = (CauseId, &CauseEdge)> {
        self.edges.iter()
    }

    /// Iterate over `(cause, effect)` pairs grouped by cause, causes in
    /// insertion order and each cause's effects in the order they were
    /// linked.
    pub fn cause_pairs(&self) -> impl Iterator<Item = (&Occasion, &Occasion)> {
        self.nodes.iter().flat_map(move |(id, cause)| {
            self.effects_of(id).map(move |effect| (cause, effect))
        })
    }

    // -----------------------------------------------------------------------
    // Topological sort (Kahn's algorithm)
    // -----------------------------------------------------------------------

    /// Order occasions so every cause precedes its effects.
    ///
    /// Ties are broken by insertion order. Returns an error if the graph
    /// contains a cycle.
    pub fn topological_order(&self) -> Result<Vec<OccasionId>, GraphError> {
        let mut in_degree: SecondaryMap<OccasionId, usize> = SecondaryMap::new();
        for (id, _) in &self.nodes {
            in_degree.insert(id, self.in_degree(id));
        }

        let mut queue: VecDeque<OccasionId> = in_degree
            .iter()
            .filter(|&(_, &deg)| deg == 0)
            .map(|(id, _)| id)
            .collect();

        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(id) = queue.pop_front() {
            order.push(id);
            for &eid in self.outputs(id) {
                let Some(edge) = self.edges.get(eid) else {
                    continue;
                };
                if let Some(deg) = in_degree.get_mut(edge.to) {
                    *deg -= 1;
                    if *deg == 0 {
                        queue.push_back(edge.to);
                    }
                }
            }
        }

        if order.len() != self.nodes.len() {
            return Err(GraphError::CycleDetected);
        }
        Ok(order)
    }

    pub fn is_acyclic(&self) -> bool {
        self.topological_order().is_ok()
    }

    // -----------------------------------------------------------------------
    // Export
    // -----------------------------------------------------------------------

    /// Flatten into a serialisable node/link list for plotting tools.
    pub fn to_node_link(&self) -> NodeLinkGraph {
        let mut position: SecondaryMap<OccasionId, usize> = SecondaryMap::new();
        let mut nodes = Vec::with_capacity(self.nodes.len());
        for (idx, (id, occasion)) in self.nodes.iter().enumerate() {
            position.insert(id, idx);
            nodes.push(NodeLinkOccasion {
                label: occasion.to_string(),
                occasion: occasion.clone(),
            });
        }

        let links = self
            .nodes
            .keys()
            .flat_map(|id| self.outputs(id).iter())
            .filter_map(|&eid| self.edges.get(eid))
            .filter_map(|e| {
                Some(NodeLink {
                    source: *position.get(e.from)?,
                    target: *position.get(e.to)?,
                })
            })
            .collect();

        NodeLinkGraph { nodes, links }
    }
}

/// An occasion in a [`NodeLinkGraph`], with its display label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLinkOccasion {
    pub label: String,
    #[serde(flatten)]
    pub occasion: Occasion,
}

/// A cause -> effect link between two positions in [`NodeLinkGraph::nodes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeLink {
    pub source: usize,
    pub target: usize,
}

/// Serialisable snapshot of a [`CausalGraph`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLinkGraph {
    pub nodes: Vec<NodeLinkOccasion>,
    pub links: Vec<NodeLink>,
}
