//! Summary statistics for a weighted graph.
//!
//! - **node_count** / **edge_count**: parallel edges counted separately.
//! - **self_loop_count**: edges whose source is their target.
//! - **parallel_edge_count**: edges repeating an earlier ordered pair.
//! - **total_weight**: sum of every edge weight.
//! - **density**: distinct ordered pairs `u ≠ v` with at least one edge,
//!   divided by `n * (n - 1)`. Zero for graphs with fewer than 2 vertices.
//! - **isolated_node_count**: vertices with no edge to or from another vertex.
//! - **max_in_weight** / **max_out_weight**: largest summed incoming/outgoing
//!   weight over all vertices, self-loops included.

use std::collections::HashSet;

use petgraph::{Direction, visit::EdgeRef};
use serde::Serialize;

use crate::graph::build::WeightedGraph;

/// Summary statistics for a [`WeightedGraph`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub self_loop_count: usize,
    pub parallel_edge_count: usize,
    pub total_weight: f64,
    pub density: f64,
    pub isolated_node_count: usize,
    pub max_in_weight: f64,
    pub max_out_weight: f64,
    pub content_hash: String,
}

impl GraphStats {
    /// Compute statistics for `g`.
    #[must_use]
    pub fn from_graph(g: &WeightedGraph) -> Self {
        let inner = g.inner();
        let node_count = g.node_count();

        let distinct_pairs: HashSet<_> = inner
            .edge_references()
            .filter(|e| e.source() != e.target())
            .map(|e| (e.source(), e.target()))
            .collect();

        let isolated_node_count = inner
            .node_indices()
            .filter(|&idx| {
                g.neighbours(idx, Direction::Incoming).is_empty()
                    && g.neighbours(idx, Direction::Outgoing).is_empty()
            })
            .count();

        let directed_weight = |direction| {
            inner
                .node_indices()
                .map(|idx| {
                    inner
                        .edges_directed(idx, direction)
                        .map(|e| *e.weight())
                        .sum::<f64>()
                })
                .fold(0.0_f64, f64::max)
        };

        Self {
            node_count,
            edge_count: g.edge_count(),
            self_loop_count: g.self_loop_count(),
            parallel_edge_count: g.parallel_edge_count(),
            total_weight: inner.edge_weights().sum(),
            density: compute_density(node_count, distinct_pairs.len()),
            isolated_node_count,
            max_in_weight: directed_weight(Direction::Incoming),
            max_out_weight: directed_weight(Direction::Outgoing),
            content_hash: g.content_hash().to_string(),
        }
    }
}

impl WeightedGraph {
    /// Summary statistics for this graph.
    #[must_use]
    pub fn stats(&self) -> GraphStats {
        GraphStats::from_graph(self)
    }
}

#[allow(clippy::cast_precision_loss)]
fn compute_density(node_count: usize, pair_count: usize) -> f64 {
    if node_count < 2 {
        return 0.0;
    }
    pair_count as f64 / (node_count * (node_count - 1)) as f64
}
