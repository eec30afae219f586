//! Bundle and Pivotal index engines.
//!
//! # Overview
//!
//! Both indices rank vertices by how their neighbours can combine to reach
//! the vertex's quota (see [`crate::baseline`]):
//!
//! - **Bundle Index** (`bundle`): how many groups of at most `order`
//!   neighbours reach the quota?
//! - **Pivotal Index** (`pivotal`): how many neighbours are decisive in at
//!   least one such group?
//!
//! Group enumeration lives in `groups`, the shared run loop (validation,
//! rounds, rayon pool, cancellation, normalization) in `engine`. The two
//! engines share only the read-only graph and baseline, so a host may run
//! them on separate threads.
//!
//! # Usage
//!
//! ```rust
//! use bpi_core::baseline::{Baseline, DEFAULT_DAMPING};
//! use bpi_core::graph::WeightedGraph;
//! use bpi_core::metrics::{IndexConfig, bundle_index, pivotal_index};
//!
//! let g = WeightedGraph::from_parts(&["A", "B"], &[("A", "B", 10.0)])?;
//! let ql = Baseline::compute(&g, DEFAULT_DAMPING)?;
//! let cfg = IndexConfig::default();
//!
//! let bi = bundle_index(&g, &ql, &cfg)?;
//! let pi = pivotal_index(&g, &ql, &cfg)?;
//! assert_eq!(bi.scores.len(), 2);
//! assert_eq!(pi.scores.len(), 2);
//! # Ok::<(), bpi_core::IndexError>(())
//! ```

pub mod bundle;
pub mod engine;
pub mod groups;
pub mod normalize;
pub mod pivotal;

pub use bundle::{BundleRule, bundle_index, bundle_index_with_cancel};
pub use engine::{
    CancellationToken, GroupRule, IndexConfig, IndexKind, IndexResult, ScoreMap, run_index,
};
pub use pivotal::{PivotalRule, pivotal_index, pivotal_index_with_cancel};
