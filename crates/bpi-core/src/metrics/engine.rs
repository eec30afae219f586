//! Shared run loop for the Bundle and Pivotal index engines.
//!
//! # Overview
//!
//! Both indices score every vertex from the same inputs: its distinct
//! neighbours (in the configured direction) with their folded edge weights,
//! its quota from the [`Baseline`], and the maximum group size `order`. They
//! differ only in how critical groups are aggregated, which is what a
//! [`GroupRule`] supplies.
//!
//! # Rounds
//!
//! The vertex list is split into `iterations` contiguous batches that are
//! scored one after another. Batches that would be empty (more rounds than
//! vertices) are skipped. Within a round, vertices are scored in
//! parallel on a rayon pool and gathered back by vertex index, so the output
//! never depends on scheduling. A vertex's score depends only on the
//! immutable inputs, so the full result exists after the last round and
//! is the same for every valid `iterations`.
//!
//! A [`CancellationToken`] is consulted once before each round. A cancelled
//! run returns [`IndexError::Cancelled`] and no scores.
//!
//! # Output
//!
//! Returns an [`IndexResult`] whose [`ScoreMap`] lists every vertex in graph
//! order. Scores are non-negative; with `normalize` they sum to 1.

use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use petgraph::{Direction, graph::NodeIndex};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::baseline::Baseline;
use crate::error::IndexError;
use crate::graph::WeightedGraph;
use crate::metrics::normalize::normalize_scores;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for one index run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Maximum number of members in a group.
    /// Default: 2.
    pub order: usize,
    /// Number of sequential evaluation rounds.
    /// Default: 8.
    pub iterations: usize,
    /// Scale scores to sum to 1 (uniform `1/n` when all are zero).
    /// Default: true.
    pub normalize: bool,
    /// Groups are formed from in-neighbours (`true`) or out-neighbours.
    /// Default: true.
    pub incoming: bool,
    /// Worker threads per round; `None` uses the global rayon pool.
    pub threads: Option<usize>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            order: 2,
            iterations: 8,
            normalize: true,
            incoming: true,
            threads: None,
        }
    }
}

impl IndexConfig {
    /// Check the configuration before any scoring work.
    ///
    /// # Errors
    ///
    /// [`IndexError::InvalidConfiguration`] if `order` or `iterations` is 0;
    /// [`IndexError::InvalidThreadCount`] if `threads` is `Some(0)`.
    pub fn validate(&self) -> Result<(), IndexError> {
        if self.order < 1 {
            return Err(IndexError::InvalidConfiguration(format!(
                "order must be at least 1, got {}",
                self.order
            )));
        }
        if self.iterations < 1 {
            return Err(IndexError::InvalidConfiguration(format!(
                "iterations must be at least 1, got {}",
                self.iterations
            )));
        }
        if self.threads == Some(0) {
            return Err(IndexError::InvalidThreadCount);
        }
        Ok(())
    }

    const fn direction(&self) -> Direction {
        if self.incoming {
            Direction::Incoming
        } else {
            Direction::Outgoing
        }
    }
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Cooperative cancellation flag shared between a host and a running engine.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Takes effect before the next round.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Which index produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    Bundle,
    Pivotal,
}

impl IndexKind {
    /// Short tag used in headings (`BI`, `PI`).
    #[must_use]
    pub const fn abbrev(self) -> &'static str {
        match self {
            Self::Bundle => "BI",
            Self::Pivotal => "PI",
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bundle => "bundle",
            Self::Pivotal => "pivotal",
        }
    }
}

/// Per-vertex scores in graph vertex order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreMap {
    entries: Vec<(String, f64)>,
}

impl ScoreMap {
    /// Wrap `(vertex, score)` pairs. Order is taken as the tie-break order.
    #[must_use]
    pub const fn from_entries(entries: Vec<(String, f64)>) -> Self {
        Self { entries }
    }

    /// Score of vertex `v`, if present.
    #[must_use]
    pub fn get(&self, v: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(id, _)| id == v)
            .map(|(_, score)| *score)
    }

    /// `(vertex, score)` pairs in graph vertex order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.entries.iter().map(|(id, s)| (id.as_str(), *s))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all scores.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, s)| s).sum()
    }
}

/// Result of one index computation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexResult {
    /// Which index was computed.
    pub kind: IndexKind,
    /// Scores for every vertex.
    pub scores: ScoreMap,
    /// Number of evaluation rounds requested.
    pub rounds: usize,
    /// Whether scores were normalized to unit sum.
    pub normalized: bool,
}

// ---------------------------------------------------------------------------
// Rule seam
// ---------------------------------------------------------------------------

/// Aggregation rule turning a vertex's critical groups into a raw score.
pub trait GroupRule: Sync {
    /// Index produced by this rule.
    const KIND: IndexKind;

    /// Raw score of one vertex.
    ///
    /// `weights[i]` is the folded weight of the `i`-th distinct neighbour,
    /// `quota` the vertex's baseline and `order` the maximum group size.
    /// Must be non-negative and deterministic.
    fn score(&self, weights: &[f64], quota: f64, order: usize) -> f64;
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

/// Score every vertex of `graph` with `rule`.
///
/// # Errors
///
/// Configuration errors are reported before any work; then
/// [`IndexError::BaselineMismatch`], [`IndexError::ThreadPool`] or
/// [`IndexError::Cancelled`].
#[instrument(skip_all, fields(kind = R::KIND.name(), order = config.order, iterations = config.iterations))]
pub fn run_index<R: GroupRule>(
    rule: &R,
    graph: &WeightedGraph,
    baseline: &Baseline,
    config: &IndexConfig,
    cancel: Option<&CancellationToken>,
) -> Result<IndexResult, IndexError> {
    config.validate()?;
    let quotas = baseline.aligned(graph)?;

    let pool = match config.threads {
        Some(threads) => Some(
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| IndexError::ThreadPool(e.to_string()))?,
        ),
        None => None,
    };

    let n = graph.node_count();
    let direction = config.direction();
    let score_vertex = |i: usize| -> f64 {
        let weights: Vec<f64> = graph
            .neighbours(NodeIndex::new(i), direction)
            .iter()
            .map(|nb| nb.weight)
            .collect();
        rule.score(&weights, quotas[i], config.order)
    };
    let score_round = |range: Range<usize>| -> Vec<f64> {
        range.into_par_iter().map(&score_vertex).collect()
    };

    let mut raw = vec![0.0_f64; n];
    for (round, range) in round_ranges(n, config.iterations).enumerate() {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            info!(round, "index run cancelled");
            return Err(IndexError::Cancelled {
                completed: round,
                total: config.iterations,
            });
        }

        let scored = match &pool {
            Some(pool) => pool.install(|| score_round(range.clone())),
            None => score_round(range.clone()),
        };
        raw[range].copy_from_slice(&scored);
        debug!(round, vertices = scored.len(), "round scored");
    }

    if config.normalize {
        normalize_scores(&mut raw);
    }

    let entries = graph
        .vertices()
        .map(str::to_string)
        .zip(raw)
        .collect();

    Ok(IndexResult {
        kind: R::KIND,
        scores: ScoreMap::from_entries(entries),
        rounds: config.iterations,
        normalized: config.normalize,
    })
}

/// Split `0..n` into contiguous ranges of near-equal length, one per round.
///
/// Rounds beyond `n` would be empty and are not produced, so at most
/// `min(rounds, n)` ranges are yielded (one empty range for an empty graph).
/// Earlier ranges take the remainder.
fn round_ranges(n: usize, rounds: usize) -> impl Iterator<Item = Range<usize>> {
    let batches = rounds.min(n).max(1);
    let base = n / batches;
    let extra = n % batches;
    (0..batches).scan(0, move |start, r| {
        let len = base + usize::from(r < extra);
        let range = *start..*start + len;
        *start += len;
        Some(range)
    })
}
