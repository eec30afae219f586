#![forbid(unsafe_code)]
//! bpi-core library: Bundle and Pivotal index centrality for weighted
//! directed networks.
//!
//! # Conventions
//!
//! - **Errors**: Library operations return [`IndexError`]; configuration
//!   file loading uses `anyhow::Result`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).
//! - **I/O**: Only [`config`] touches the filesystem. Graph parsing and
//!   rendering belong to the host.

pub mod baseline;
pub mod config;
pub mod error;
pub mod graph;
pub mod labels;
pub mod metrics;
pub mod rank;

pub use baseline::Baseline;
pub use error::{ErrorCode, IndexError};
pub use graph::{GraphBuilder, WeightedGraph};
pub use labels::LabelTable;
pub use metrics::{IndexConfig, IndexKind, IndexResult, ScoreMap, bundle_index, pivotal_index};
pub use rank::{RankedEntry, RankingConfig, format_ranking, rank};
