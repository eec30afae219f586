//! `bpi export`: rewrite a graph file as labeled GML.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::gml::write_gml;
use crate::input::{LabelArgs, load_graph, resolve_labels};
use crate::output::{OutputMode, pretty_kv, render_mode};

/// Arguments for `bpi export`.
#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    /// GML graph file to read.
    #[arg(value_name = "GRAPH")]
    pub graph: PathBuf,

    #[command(flatten)]
    pub labels: LabelArgs,

    /// Output GML path (defaults to stdout).
    #[arg(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ExportSummary {
    path: String,
    nodes: usize,
    edges: usize,
}

/// Execute `bpi export`.
///
/// With `--output` the GML goes to the file and a summary is rendered;
/// otherwise the GML itself is written to stdout.
///
/// # Errors
///
/// Graph, label and I/O errors.
pub fn run_export(args: &ExportArgs, output: OutputMode) -> Result<()> {
    let loaded = load_graph(&args.graph)?;
    let labels = resolve_labels(&args.labels, &loaded)?;

    let Some(path) = args.output.as_ref() else {
        let mut out = BufWriter::new(io::stdout());
        write_gml(&mut out, &loaded.graph, &labels)?;
        out.flush()?;
        return Ok(());
    };

    let mut buf = Vec::new();
    write_gml(&mut buf, &loaded.graph, &labels)?;
    let mut file = File::create(path)
        .with_context(|| format!("failed to create output file {}", path.display()))?;
    file.write_all(&buf)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), bytes = buf.len(), "graph exported");

    let summary = ExportSummary {
        path: path.display().to_string(),
        nodes: loaded.graph.node_count(),
        edges: loaded.graph.edge_count(),
    };
    render_mode(
        output,
        &summary,
        |s, w| writeln!(w, "{}\t{}\t{}", s.path, s.nodes, s.edges),
        |s, w| {
            pretty_kv(w, "exported", &s.path)?;
            pretty_kv(w, "nodes", s.nodes.to_string())?;
            pretty_kv(w, "edges", s.edges.to_string())
        },
    )
}
