//! Weighted directed multigraph construction.
//!
//! # Overview
//!
//! A [`WeightedGraph`] is built once from an externally supplied vertex list
//! and edge list through [`GraphBuilder`], validated, and then never mutated.
//! Both index engines and the baseline calculator read it concurrently.
//!
//! ## Multigraph Semantics
//!
//! Parallel edges between the same ordered pair are kept as distinct
//! petgraph edges, and self-loops are allowed. Per-pair aggregation happens
//! at query time ([`WeightedGraph::edge_weight_sum`],
//! [`WeightedGraph::neighbours`]), never at construction.
//!
//! ## Iteration Order
//!
//! Vertices are stored in insertion order, so `NodeIndex(i)` is the `i`-th
//! declared vertex. Every query that returns several vertices returns them in
//! this order, which makes scoring and rank tie-breaking reproducible.
//!
//! ## Content Hash
//!
//! The graph carries a BLAKE3 hash over its vertex list and edge multiset.
//! Two graphs built from the same description have the same hash.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, HashMap, HashSet};

use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
};
use tracing::{debug, instrument};

use crate::error::IndexError;

// ---------------------------------------------------------------------------
// GraphBuilder
// ---------------------------------------------------------------------------

/// Collects vertices and edges before validation.
#[derive(Debug, Default, Clone)]
pub struct GraphBuilder {
    vertices: Vec<String>,
    edges: Vec<(String, String, f64)>,
}

impl GraphBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a vertex. Declaration order is the graph's iteration order.
    pub fn add_vertex(&mut self, id: impl Into<String>) -> &mut Self {
        self.vertices.push(id.into());
        self
    }

    /// Declare a directed edge `source → target`.
    pub fn add_edge(
        &mut self,
        source: impl Into<String>,
        target: impl Into<String>,
        weight: f64,
    ) -> &mut Self {
        self.edges.push((source.into(), target.into(), weight));
        self
    }

    /// Validate the collected description and build the graph.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::MalformedGraph`] if a vertex is declared twice,
    /// an edge references an undeclared vertex, or an edge weight is
    /// negative or not finite.
    #[instrument(skip_all)]
    pub fn build(self) -> Result<WeightedGraph, IndexError> {
        let mut graph = DiGraph::<String, f64>::with_capacity(self.vertices.len(), self.edges.len());
        let mut node_map: HashMap<String, NodeIndex> = HashMap::with_capacity(self.vertices.len());

        for id in &self.vertices {
            if node_map.contains_key(id) {
                return Err(IndexError::MalformedGraph(format!(
                    "vertex '{id}' declared more than once"
                )));
            }
            let idx = graph.add_node(id.clone());
            node_map.insert(id.clone(), idx);
        }

        for (source, target, weight) in &self.edges {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(IndexError::MalformedGraph(format!(
                    "edge {source} -> {target} has invalid weight {weight}"
                )));
            }
            let Some(&from) = node_map.get(source) else {
                return Err(IndexError::MalformedGraph(format!(
                    "edge {source} -> {target} references unknown vertex '{source}'"
                )));
            };
            let Some(&to) = node_map.get(target) else {
                return Err(IndexError::MalformedGraph(format!(
                    "edge {source} -> {target} references unknown vertex '{target}'"
                )));
            };
            graph.add_edge(from, to, *weight);
        }

        let content_hash = compute_content_hash(&self.vertices, &self.edges);
        debug!(
            vertices = graph.node_count(),
            edges = graph.edge_count(),
            %content_hash,
            "graph built"
        );

        Ok(WeightedGraph {
            graph,
            node_map,
            content_hash,
        })
    }
}

// ---------------------------------------------------------------------------
// WeightedGraph
// ---------------------------------------------------------------------------

/// An immutable weighted directed multigraph with string vertex ids.
///
/// Nodes are vertex ids; edge weights are non-negative finite reals. An edge
/// `A → B` with weight `w` means "A sends `w` to B" (trade volume, energy
/// flow, ...), so B's incoming weight is its exposure.
#[derive(Debug, Clone)]
pub struct WeightedGraph {
    graph: DiGraph<String, f64>,
    node_map: HashMap<String, NodeIndex>,
    content_hash: String,
}

/// A distinct neighbour of a vertex with the summed weight of every parallel
/// edge between the two in the requested direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbour {
    /// Node index of the neighbour.
    pub index: NodeIndex,
    /// Sum of the weights of all parallel edges to/from the neighbour.
    pub weight: f64,
}

impl WeightedGraph {
    /// Build a graph from explicit vertex and edge slices.
    ///
    /// # Errors
    ///
    /// Same as [`GraphBuilder::build`].
    pub fn from_parts(vertices: &[&str], edges: &[(&str, &str, f64)]) -> Result<Self, IndexError> {
        let mut builder = GraphBuilder::new();
        for v in vertices {
            builder.add_vertex(*v);
        }
        for (s, t, w) in edges {
            builder.add_edge(*s, *t, *w);
        }
        builder.build()
    }

    /// The underlying petgraph storage (read-only).
    #[must_use]
    pub const fn inner(&self) -> &DiGraph<String, f64> {
        &self.graph
    }

    /// Return the number of vertices.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of edges, counting parallel edges separately.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// BLAKE3 content hash of the vertex list and edge multiset.
    #[must_use]
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    /// Return `true` if `id` is a vertex of this graph.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.node_map.contains_key(id)
    }

    /// Look up the `NodeIndex` for a vertex id.
    #[must_use]
    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }

    /// Return the vertex id for a node.
    #[must_use]
    pub fn vertex_id(&self, idx: NodeIndex) -> Option<&str> {
        self.graph.node_weight(idx).map(String::as_str)
    }

    /// All vertex ids in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = &str> + '_ {
        self.graph.node_weights().map(String::as_str)
    }

    /// Every edge as `(source, target, weight)` in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, f64)> + '_ {
        self.graph.edge_references().map(|e| {
            (
                self.graph[e.source()].as_str(),
                self.graph[e.target()].as_str(),
                *e.weight(),
            )
        })
    }

    /// Every edge whose target is `v` as `(source, weight)`.
    ///
    /// Self-loops and each parallel edge are yielded separately. Unknown
    /// vertices yield nothing.
    #[must_use]
    pub fn edges_into(&self, v: &str) -> Vec<(&str, f64)> {
        self.incident(v, Direction::Incoming)
    }

    /// Every edge whose source is `v` as `(target, weight)`.
    #[must_use]
    pub fn edges_out_of(&self, v: &str) -> Vec<(&str, f64)> {
        self.incident(v, Direction::Outgoing)
    }

    /// Sum of the weights of all parallel edges `u → v` (0 if none).
    #[must_use]
    pub fn edge_weight_sum(&self, u: &str, v: &str) -> f64 {
        let (Some(from), Some(to)) = (self.node_index(u), self.node_index(v)) else {
            return 0.0;
        };
        self.graph
            .edges_connecting(from, to)
            .map(|e| *e.weight())
            .sum()
    }

    /// Distinct neighbours of `idx` other than itself, in vertex order.
    ///
    /// With [`Direction::Incoming`] these are the sources of edges into
    /// `idx`; with [`Direction::Outgoing`] the targets of edges out of it.
    /// Parallel edges are folded into one neighbour whose weight is their
    /// sum. Self-loops are excluded.
    #[must_use]
    pub fn neighbours(&self, idx: NodeIndex, direction: Direction) -> Vec<Neighbour> {
        let mut folded: BTreeMap<NodeIndex, f64> = BTreeMap::new();
        for edge in self.graph.edges_directed(idx, direction) {
            let other = match direction {
                Direction::Incoming => edge.source(),
                Direction::Outgoing => edge.target(),
            };
            if other == idx {
                continue;
            }
            *folded.entry(other).or_insert(0.0) += *edge.weight();
        }
        folded
            .into_iter()
            .map(|(index, weight)| Neighbour { index, weight })
            .collect()
    }

    /// Number of self-loop edges.
    #[must_use]
    pub fn self_loop_count(&self) -> usize {
        self.graph
            .edge_references()
            .filter(|e| e.source() == e.target())
            .count()
    }

    /// Number of edges that duplicate an earlier edge's ordered endpoint pair.
    #[must_use]
    pub fn parallel_edge_count(&self) -> usize {
        let mut seen: HashSet<(NodeIndex, NodeIndex)> = HashSet::new();
        self.graph
            .edge_references()
            .filter(|e| !seen.insert((e.source(), e.target())))
            .count()
    }

    fn incident(&self, v: &str, direction: Direction) -> Vec<(&str, f64)> {
        let Some(idx) = self.node_index(v) else {
            return Vec::new();
        };
        let mut out: Vec<(NodeIndex, f64)> = self
            .graph
            .edges_directed(idx, direction)
            .map(|e| {
                let other = match direction {
                    Direction::Incoming => e.source(),
                    Direction::Outgoing => e.target(),
                };
                (other, *e.weight())
            })
            .collect();
        // petgraph walks adjacency lists newest-first; report in vertex order.
        out.sort_by_key(|(other, _)| *other);
        out.into_iter()
            .filter_map(|(other, w)| self.vertex_id(other).map(|id| (id, w)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Compute a BLAKE3 hash of the vertex list and edge multiset.
///
/// Edges are hashed in sorted order, so insertion order does not matter.
fn compute_content_hash(vertices: &[String], edges: &[(String, String, f64)]) -> String {
    let mut hasher = blake3::Hasher::new();
    for v in vertices {
        hasher.update(b"v\x00");
        hasher.update(v.as_bytes());
        hasher.update(b"\x00");
    }
    let mut sorted: Vec<&(String, String, f64)> = edges.iter().collect();
    sorted.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then_with(|| a.1.cmp(&b.1))
            .then_with(|| a.2.total_cmp(&b.2))
    });
    for (source, target, weight) in sorted {
        hasher.update(b"e\x00");
        hasher.update(source.as_bytes());
        hasher.update(b"\x00");
        hasher.update(target.as_bytes());
        hasher.update(b"\x00");
        hasher.update(&weight.to_bits().to_le_bytes());
    }
    format!("blake3:{}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> WeightedGraph {
        WeightedGraph::from_parts(
            &["A", "B", "C"],
            &[
                ("A", "B", 1.0),
                ("A", "B", 2.5),
                ("C", "B", 4.0),
                ("B", "B", 0.5),
            ],
        )
        .expect("valid graph")
    }

    #[test]
    fn empty_graph_has_stable_hash() {
        let g = GraphBuilder::new().build().expect("empty graph");
        assert_eq!(g.node_count(), 0);
        assert_eq!(g.edge_count(), 0);
        assert!(g.content_hash().starts_with("blake3:"));
    }

    #[test]
    fn vertices_keep_insertion_order() {
        let g = WeightedGraph::from_parts(&["3", "1", "2"], &[]).expect("valid graph");
        let ids: Vec<&str> = g.vertices().collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
    }

    #[test]
    fn parallel_edges_stay_distinct() {
        let g = abc();
        assert_eq!(g.edge_count(), 4);
        assert_eq!(g.parallel_edge_count(), 1);
        assert_eq!(g.self_loop_count(), 1);

        let into_b = g.edges_into("B");
        assert_eq!(into_b.len(), 4);
        assert_eq!(into_b.iter().filter(|(s, _)| *s == "A").count(), 2);
    }

    #[test]
    fn edges_iterate_in_insertion_order() {
        let g = abc();
        let all: Vec<(&str, &str, f64)> = g.edges().collect();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0], ("A", "B", 1.0));
        assert_eq!(all[3], ("B", "B", 0.5));
    }

    #[test]
    fn edges_out_of_lists_targets() {
        let g = abc();
        let out_a = g.edges_out_of("A");
        assert_eq!(out_a.len(), 2);
        assert!(out_a.iter().all(|(t, _)| *t == "B"));
        assert!(g.edges_out_of("missing").is_empty());
    }

    #[test]
    fn edge_weight_sum_folds_parallel_edges() {
        let g = abc();
        assert!((g.edge_weight_sum("A", "B") - 3.5).abs() < 1e-12);
        assert!((g.edge_weight_sum("B", "B") - 0.5).abs() < 1e-12);
        assert!(g.edge_weight_sum("B", "A").abs() < f64::EPSILON);
        assert!(g.edge_weight_sum("A", "nope").abs() < f64::EPSILON);
    }

    #[test]
    fn neighbours_fold_and_skip_self_loops() {
        let g = abc();
        let b = g.node_index("B").expect("B");
        let incoming = g.neighbours(b, Direction::Incoming);
        let ids: Vec<&str> = incoming
            .iter()
            .filter_map(|n| g.vertex_id(n.index))
            .collect();
        assert_eq!(ids, vec!["A", "C"]);
        assert!((incoming[0].weight - 3.5).abs() < 1e-12);
        assert!((incoming[1].weight - 4.0).abs() < 1e-12);

        assert!(g.neighbours(b, Direction::Outgoing).is_empty());
    }

    #[test]
    fn unknown_endpoint_is_malformed() {
        let err = WeightedGraph::from_parts(&["A"], &[("A", "Z", 1.0)]).unwrap_err();
        assert!(matches!(err, IndexError::MalformedGraph(ref m) if m.contains("'Z'")));
    }

    #[test]
    fn negative_weight_is_malformed() {
        let err = WeightedGraph::from_parts(&["A", "B"], &[("A", "B", -1.0)]).unwrap_err();
        assert!(matches!(err, IndexError::MalformedGraph(_)));
    }

    #[test]
    fn non_finite_weight_is_malformed() {
        for w in [f64::NAN, f64::INFINITY] {
            let err = WeightedGraph::from_parts(&["A", "B"], &[("A", "B", w)]).unwrap_err();
            assert!(matches!(err, IndexError::MalformedGraph(_)));
        }
    }

    #[test]
    fn duplicate_vertex_is_malformed() {
        let err = WeightedGraph::from_parts(&["A", "A"], &[]).unwrap_err();
        assert!(matches!(err, IndexError::MalformedGraph(_)));
    }

    #[test]
    fn content_hash_changes_with_edges() {
        let empty = WeightedGraph::from_parts(&["A", "B"], &[]).expect("graph");
        let one = WeightedGraph::from_parts(&["A", "B"], &[("A", "B", 1.0)]).expect("graph");
        let heavier = WeightedGraph::from_parts(&["A", "B"], &[("A", "B", 2.0)]).expect("graph");
        assert_ne!(empty.content_hash(), one.content_hash());
        assert_ne!(one.content_hash(), heavier.content_hash());

        let again = WeightedGraph::from_parts(&["A", "B"], &[("A", "B", 1.0)]).expect("graph");
        assert_eq!(one.content_hash(), again.content_hash());
    }

    #[test]
    fn content_hash_ignores_edge_order() {
        let forward = WeightedGraph::from_parts(
            &["A", "B", "C"],
            &[("A", "B", 1.0), ("B", "C", 2.0), ("A", "B", 3.0)],
        )
        .expect("graph");
        let shuffled = WeightedGraph::from_parts(
            &["A", "B", "C"],
            &[("A", "B", 3.0), ("A", "B", 1.0), ("B", "C", 2.0)],
        )
        .expect("graph");
        assert_eq!(forward.content_hash(), shuffled.content_hash());

        let reversed = WeightedGraph::from_parts(
            &["A", "B", "C"],
            &[("B", "A", 1.0), ("B", "C", 2.0), ("A", "B", 3.0)],
        )
        .expect("graph");
        assert_ne!(forward.content_hash(), reversed.content_hash());
    }
}
