//! Graph and label-table loading shared by the subcommands.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use bpi_core::{LabelTable, WeightedGraph};
use clap::Args;
use tracing::{debug, info};

use crate::gml::GmlDocument;

/// Label source flags, shared by every command that prints vertices.
#[derive(Args, Debug, Default, Clone)]
pub struct LabelArgs {
    /// Label file: JSON array (index i labels vertex "i"), JSON object
    /// (id → label), or one label per line.
    #[arg(long, value_name = "PATH", conflicts_with = "raw_ids")]
    pub labels: Option<PathBuf>,

    /// Show vertex ids instead of labels.
    #[arg(long)]
    pub raw_ids: bool,
}

/// A graph file after parsing.
#[derive(Debug)]
pub struct LoadedGraph {
    pub graph: WeightedGraph,
    pub document: GmlDocument,
}

/// Read and build the graph stored in the GML file at `path`.
///
/// # Errors
///
/// Fails if the file cannot be read, is not valid GML, or describes a
/// malformed graph.
pub fn load_graph(path: &Path) -> Result<LoadedGraph> {
    let src = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read graph file {}", path.display()))?;
    let document = GmlDocument::parse(&src)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    let graph = document
        .to_graph()
        .with_context(|| format!("invalid graph in {}", path.display()))?;

    info!(
        path = %path.display(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        hash = graph.content_hash(),
        "graph loaded"
    );
    Ok(LoadedGraph { graph, document })
}

/// Pick the label table for `loaded` according to `args`.
///
/// Precedence: `--raw-ids`, then `--labels`, then node labels in the GML
/// file, then vertex ids.
///
/// # Errors
///
/// Fails if the label file cannot be read or parsed.
pub fn resolve_labels(args: &LabelArgs, loaded: &LoadedGraph) -> Result<LabelTable> {
    if args.raw_ids {
        return Ok(LabelTable::identity());
    }
    if let Some(path) = &args.labels {
        return load_label_file(path);
    }
    if let Some(table) = loaded.document.labels() {
        debug!(labels = table.len(), "using node labels from graph file");
        return Ok(table);
    }
    debug!("graph file has no node labels, using vertex ids");
    Ok(LabelTable::identity())
}

/// Load a label file.
///
/// # Errors
///
/// Fails if the file cannot be read, or looks like JSON (`[` or `{`) but
/// does not parse as a string array or string map.
pub fn load_label_file(path: &Path) -> Result<LabelTable> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read label file {}", path.display()))?;
    parse_labels(&content).with_context(|| format!("failed to parse {}", path.display()))
}

fn parse_labels(content: &str) -> Result<LabelTable> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('[') {
        let list: Vec<String> =
            serde_json::from_str(content).context("expected a JSON array of strings")?;
        return Ok(LabelTable::from_indexed(list));
    }
    if trimmed.starts_with('{') {
        let map: HashMap<String, String> =
            serde_json::from_str(content).context("expected a JSON object of strings")?;
        return Ok(LabelTable::from_map(map));
    }
    Ok(LabelTable::from_indexed(
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty()),
    ))
}
