//! Pivotal Index: how many neighbours can tip a vertex on their own.
//!
//! # Overview
//!
//! Uses the same critical groups as the Bundle Index. A member `u` of a
//! critical group `S` is **pivotal** in `S` when dropping it leaves the
//! group below quota:
//!
//! ```text
//! Σ_{x∈S} w(x, v) − w(u, v) < ql(v)
//! ```
//!
//! The Pivotal Index of `v` counts the distinct neighbours that are pivotal
//! in at least one critical group of size at most `order`. Where the Bundle
//! Index measures how many coalitions reach the quota, the Pivotal Index
//! measures how many neighbours hold a deciding position in one.
//!
//! With `normalize`, scores are divided by their total.

use tracing::instrument;

use crate::baseline::Baseline;
use crate::error::IndexError;
use crate::graph::WeightedGraph;
use crate::metrics::engine::{
    CancellationToken, GroupRule, IndexConfig, IndexKind, IndexResult, run_index,
};
use crate::metrics::groups::for_each_critical_group;

/// Counts neighbours that are pivotal somewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct PivotalRule;

impl GroupRule for PivotalRule {
    const KIND: IndexKind = IndexKind::Pivotal;

    #[allow(clippy::cast_precision_loss)]
    fn score(&self, weights: &[f64], quota: f64, order: usize) -> f64 {
        let mut pivotal = vec![false; weights.len()];
        for_each_critical_group(weights, quota, order, |members, sum| {
            for &m in members {
                if sum - weights[m] < quota {
                    pivotal[m] = true;
                }
            }
        });
        pivotal.iter().filter(|&&p| p).count() as f64
    }
}

/// Compute the Pivotal Index of every vertex.
///
/// # Errors
///
/// See [`run_index`].
#[instrument(skip_all)]
pub fn pivotal_index(
    graph: &WeightedGraph,
    baseline: &Baseline,
    config: &IndexConfig,
) -> Result<IndexResult, IndexError> {
    run_index(&PivotalRule, graph, baseline, config, None)
}

/// [`pivotal_index`] with a cancellation token checked between rounds.
///
/// # Errors
///
/// See [`run_index`].
pub fn pivotal_index_with_cancel(
    graph: &WeightedGraph,
    baseline: &Baseline,
    config: &IndexConfig,
    cancel: &CancellationToken,
) -> Result<IndexResult, IndexError> {
    run_index(&PivotalRule, graph, baseline, config, Some(cancel))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sole_sufficient_neighbours_are_pivotal() {
        // Each weight-1 neighbour reaches quota 1 alone; in the pair neither
        // is pivotal, but each already counted once.
        assert!((PivotalRule.score(&[1.0, 1.0], 1.0, 3) - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn light_member_is_never_pivotal() {
        // Weights 0.1 and 5 against quota 1: only the heavy one ever decides.
        assert!((PivotalRule.score(&[0.1, 5.0], 1.0, 2) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn pair_needed_makes_both_pivotal() {
        assert!((PivotalRule.score(&[1.0, 1.0], 2.0, 2) - 2.0).abs() < f64::EPSILON);
        assert!(PivotalRule.score(&[1.0, 1.0], 2.0, 1).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_group_has_no_pivots() {
        assert!(PivotalRule.score(&[], 0.0, 2).abs() < f64::EPSILON);
    }
}
