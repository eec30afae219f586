//! Graph model for index computation.
//!
//! # Overview
//!
//! The graph is a weighted, directed multigraph over string vertex ids,
//! backed by petgraph. It is built once, validated, and shared read-only by
//! the baseline calculator and both index engines.
//!
//! ## Pipeline
//!
//! ```text
//! vertex ids + (source, target, weight) edges
//!        ↓  build::GraphBuilder::build()
//! WeightedGraph (immutable, parallel edges and self-loops kept)
//!        ↓  stats::GraphStats::from_graph()
//! GraphStats (counts, density, weight extremes, content hash)
//! ```
//!
//! ## Typical Usage
//!
//! ```rust
//! use bpi_core::graph::{GraphBuilder, GraphStats};
//!
//! let mut builder = GraphBuilder::new();
//! builder.add_vertex("0").add_vertex("1");
//! builder.add_edge("0", "1", 10.0);
//! let graph = builder.build()?;
//!
//! let stats = GraphStats::from_graph(&graph);
//! assert_eq!(stats.edge_count, 1);
//! # Ok::<(), bpi_core::IndexError>(())
//! ```

pub mod build;
pub mod stats;

pub use build::{GraphBuilder, Neighbour, WeightedGraph};
pub use stats::GraphStats;
