//! Bundle Index: how many critical groups can sway a vertex.
//!
//! # Overview
//!
//! For vertex `v` with quota `ql(v)`, a group of at most `order` distinct
//! neighbours is critical when their combined edge weight to `v` reaches
//! `ql(v)`. The Bundle Index counts these groups. A vertex with many
//! critical groups is exposed to many small coalitions ("bundles") of its
//! neighbours, which in a trade or energy network marks a dependent
//! importer.
//!
//! ```text
//! BI(v) = |{ S ⊆ N(v) : |S| ≤ order, Σ_{u∈S} w(u, v) ≥ ql(v) }|
//! ```
//!
//! The empty group has weight 0, so it is counted exactly when
//! `ql(v) = 0`. With `normalize`, scores are divided by their total.

use tracing::instrument;

use crate::baseline::Baseline;
use crate::error::IndexError;
use crate::graph::WeightedGraph;
use crate::metrics::engine::{
    CancellationToken, GroupRule, IndexConfig, IndexKind, IndexResult, run_index,
};
use crate::metrics::groups::for_each_critical_group;

/// Counts critical groups.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundleRule;

impl GroupRule for BundleRule {
    const KIND: IndexKind = IndexKind::Bundle;

    #[allow(clippy::cast_precision_loss)]
    fn score(&self, weights: &[f64], quota: f64, order: usize) -> f64 {
        let mut count: u64 = 0;
        for_each_critical_group(weights, quota, order, |_, _| count += 1);
        count as f64
    }
}

/// Compute the Bundle Index of every vertex.
///
/// # Errors
///
/// See [`run_index`].
#[instrument(skip_all)]
pub fn bundle_index(
    graph: &WeightedGraph,
    baseline: &Baseline,
    config: &IndexConfig,
) -> Result<IndexResult, IndexError> {
    run_index(&BundleRule, graph, baseline, config, None)
}

/// [`bundle_index`] with a cancellation token checked between rounds.
///
/// # Errors
///
/// See [`run_index`].
pub fn bundle_index_with_cancel(
    graph: &WeightedGraph,
    baseline: &Baseline,
    config: &IndexConfig,
    cancel: &CancellationToken,
) -> Result<IndexResult, IndexError> {
    run_index(&BundleRule, graph, baseline, config, Some(cancel))
}
