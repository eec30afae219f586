//! Baseline weights ("ql", the per-vertex quota).
//!
//! # Overview
//!
//! A vertex's quota is the combined weight a group of neighbours must reach
//! to count as critical for it. By default the quota is a damped share of
//! the vertex's total incoming weight:
//!
//! ```text
//! ql(v) = damping * Σ weight(e)   for every edge e with target(e) = v
//! ```
//!
//! Self-loops and every parallel edge contribute their own weight. The
//! damping constant defaults to 0.45.
//!
//! A baseline is computed once per graph and handed by reference to both
//! index engines. It has no mutating API.

use std::collections::HashMap;

use petgraph::Direction;
use tracing::{debug, instrument};

use crate::error::IndexError;
use crate::graph::WeightedGraph;

/// Default damping constant applied to incoming weight sums.
pub const DEFAULT_DAMPING: f64 = 0.45;

/// Read-only per-vertex quota map.
#[derive(Debug, Clone, PartialEq)]
pub struct Baseline {
    values: HashMap<String, f64>,
}

impl Baseline {
    /// Compute `ql(v) = damping * incoming_weight(v)` for every vertex.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::InvalidDamping`] if `damping` is negative or
    /// not finite, or if damping a finite weight sum overflows.
    /// Returns [`IndexError::MalformedGraph`] if a vertex's incoming weight
    /// sum overflows.
    #[instrument(skip(graph))]
    pub fn compute(graph: &WeightedGraph, damping: f64) -> Result<Self, IndexError> {
        if !damping.is_finite() || damping < 0.0 {
            return Err(IndexError::InvalidDamping(damping));
        }

        let inner = graph.inner();
        let mut values = HashMap::with_capacity(graph.node_count());
        for idx in inner.node_indices() {
            let raw: f64 = inner
                .edges_directed(idx, Direction::Incoming)
                .map(|e| *e.weight())
                .sum();
            if !raw.is_finite() {
                return Err(IndexError::MalformedGraph(format!(
                    "incoming weight of '{}' overflows",
                    inner[idx]
                )));
            }
            let quota = damping * raw;
            if !quota.is_finite() {
                return Err(IndexError::InvalidDamping(damping));
            }
            values.insert(inner[idx].clone(), quota);
        }

        debug!(vertices = values.len(), "baseline computed");
        Ok(Self { values })
    }

    /// The same quota for every vertex of `graph`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::BaselineMismatch`] if `quota` is negative or
    /// not finite.
    pub fn uniform(graph: &WeightedGraph, quota: f64) -> Result<Self, IndexError> {
        check_quota("*", quota)?;
        let values = graph.vertices().map(|v| (v.to_string(), quota)).collect();
        Ok(Self { values })
    }

    /// Use caller-supplied quotas.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::BaselineMismatch`] if the map's keys differ
    /// from the graph's vertex set, or a quota is negative or not finite.
    pub fn from_map(graph: &WeightedGraph, values: HashMap<String, f64>) -> Result<Self, IndexError> {
        let baseline = Self { values };
        baseline.check_matches(graph)?;
        Ok(baseline)
    }

    /// Quota of vertex `v`, if present.
    #[must_use]
    pub fn get(&self, v: &str) -> Option<f64> {
        self.values.get(v).copied()
    }

    /// Number of vertices covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Return `true` if no vertex is covered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Quotas in the graph's vertex order.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::BaselineMismatch`] if the baseline does not
    /// cover exactly the graph's vertices.
    pub fn aligned(&self, graph: &WeightedGraph) -> Result<Vec<f64>, IndexError> {
        self.check_matches(graph)?;
        Ok(graph
            .vertices()
            .map(|v| self.values.get(v).copied().unwrap_or_default())
            .collect())
    }

    /// Verify that the baseline covers exactly the vertices of `graph`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::BaselineMismatch`] on the first discrepancy.
    pub fn check_matches(&self, graph: &WeightedGraph) -> Result<(), IndexError> {
        for v in graph.vertices() {
            match self.values.get(v) {
                Some(&quota) => check_quota(v, quota)?,
                None => {
                    return Err(IndexError::BaselineMismatch(format!(
                        "no quota for vertex '{v}'"
                    )));
                }
            }
        }
        if self.values.len() != graph.node_count() {
            let mut extra: Vec<&str> = self
                .values
                .keys()
                .map(String::as_str)
                .filter(|k| !graph.contains(k))
                .collect();
            extra.sort_unstable();
            return Err(IndexError::BaselineMismatch(format!(
                "quota given for unknown vertices: {}",
                extra.join(", ")
            )));
        }
        Ok(())
    }
}

fn check_quota(v: &str, quota: f64) -> Result<(), IndexError> {
    if quota.is_finite() && quota >= 0.0 {
        Ok(())
    } else {
        Err(IndexError::BaselineMismatch(format!(
            "quota {quota} for vertex '{v}' is not a finite non-negative number"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn single_edge_damps_target_only() {
        let g = WeightedGraph::from_parts(&["A", "B"], &[("A", "B", 10.0)]).expect("graph");
        let ql = Baseline::compute(&g, DEFAULT_DAMPING).expect("baseline");
        assert!(close(ql.get("A").expect("A"), 0.0));
        assert!(close(ql.get("B").expect("B"), 4.5));
    }

    #[test]
    fn self_loop_counts_once() {
        let g = WeightedGraph::from_parts(&["v"], &[("v", "v", 3.0)]).expect("graph");
        let ql = Baseline::compute(&g, DEFAULT_DAMPING).expect("baseline");
        assert!(close(ql.get("v").expect("v"), 0.45 * 3.0));
    }

    #[test]
    fn parallel_edges_each_contribute() {
        let g = WeightedGraph::from_parts(&["A", "B"], &[("A", "B", 1.0), ("A", "B", 3.0)])
            .expect("graph");
        let ql = Baseline::compute(&g, 0.5).expect("baseline");
        assert!(close(ql.get("B").expect("B"), 2.0));
    }

    #[test]
    fn edgeless_graph_has_zero_baseline() {
        let g = WeightedGraph::from_parts(&["A", "B", "C"], &[]).expect("graph");
        let ql = Baseline::compute(&g, DEFAULT_DAMPING).expect("baseline");
        assert_eq!(ql.len(), 3);
        assert!(g.vertices().all(|v| close(ql.get(v).expect("quota"), 0.0)));
    }

    #[test]
    fn invalid_damping_rejected() {
        let g = WeightedGraph::from_parts(&["A"], &[]).expect("graph");
        for d in [-0.1, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                Baseline::compute(&g, d),
                Err(IndexError::InvalidDamping(_))
            ));
        }
    }

    #[test]
    fn overflowing_incoming_weight_is_malformed() {
        let g = WeightedGraph::from_parts(
            &["A", "B", "C"],
            &[("A", "C", f64::MAX), ("B", "C", f64::MAX)],
        )
        .expect("graph");
        let err = Baseline::compute(&g, DEFAULT_DAMPING).unwrap_err();
        assert!(matches!(err, IndexError::MalformedGraph(ref m) if m.contains("'C'")));
    }

    #[test]
    fn overflowing_damped_quota_rejects_damping() {
        let g = WeightedGraph::from_parts(&["A", "B"], &[("A", "B", f64::MAX)]).expect("graph");
        assert_eq!(
            Baseline::compute(&g, 2.0),
            Err(IndexError::InvalidDamping(2.0))
        );
        assert!(Baseline::compute(&g, 1.0).is_ok());
    }

    #[test]
    fn from_map_requires_exact_cover() {
        let g = WeightedGraph::from_parts(&["A", "B"], &[]).expect("graph");

        let missing = HashMap::from([("A".to_string(), 1.0)]);
        assert!(matches!(
            Baseline::from_map(&g, missing),
            Err(IndexError::BaselineMismatch(_))
        ));

        let extra = HashMap::from([
            ("A".to_string(), 1.0),
            ("B".to_string(), 1.0),
            ("Z".to_string(), 1.0),
        ]);
        let err = Baseline::from_map(&g, extra).unwrap_err();
        assert!(matches!(err, IndexError::BaselineMismatch(ref m) if m.contains('Z')));

        let negative = HashMap::from([("A".to_string(), 1.0), ("B".to_string(), -2.0)]);
        assert!(Baseline::from_map(&g, negative).is_err());
    }

    #[test]
    fn aligned_follows_vertex_order() {
        let g = WeightedGraph::from_parts(&["B", "A"], &[("B", "A", 2.0)]).expect("graph");
        let ql = Baseline::compute(&g, 1.0).expect("baseline");
        let v = ql.aligned(&g).expect("aligned");
        assert!(close(v[0], 0.0));
        assert!(close(v[1], 2.0));
    }
}
