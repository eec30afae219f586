//! `bpi stats`: structural summary of a graph file.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use bpi_core::graph::GraphStats;
use clap::Args;
use serde::Serialize;

use crate::input::load_graph;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `bpi stats`.
#[derive(Args, Debug, Default)]
pub struct StatsArgs {
    /// GML graph file.
    #[arg(value_name = "GRAPH")]
    pub graph: PathBuf,
}

/// Report payload for `bpi stats`.
#[derive(Debug, Serialize)]
pub struct StatsReport {
    pub graph: String,
    #[serde(flatten)]
    pub stats: GraphStats,
}

/// Execute `bpi stats`.
///
/// # Errors
///
/// Graph loading errors.
pub fn run_stats(args: &StatsArgs, output: OutputMode) -> Result<()> {
    let loaded = load_graph(&args.graph)?;
    let report = StatsReport {
        graph: args.graph.display().to_string(),
        stats: loaded.graph.stats(),
    };
    render_mode(output, &report, render_stats_text, render_stats_pretty)
}

fn stat_rows(s: &GraphStats) -> [(&'static str, String); 10] {
    [
        ("nodes", s.node_count.to_string()),
        ("edges", s.edge_count.to_string()),
        ("self_loops", s.self_loop_count.to_string()),
        ("parallel_edges", s.parallel_edge_count.to_string()),
        ("isolated_nodes", s.isolated_node_count.to_string()),
        ("total_weight", format!("{:.3}", s.total_weight)),
        ("density", format!("{:.4}", s.density)),
        ("max_in_weight", format!("{:.3}", s.max_in_weight)),
        ("max_out_weight", format!("{:.3}", s.max_out_weight)),
        ("content_hash", s.content_hash.clone()),
    ]
}

fn render_stats_text(report: &StatsReport, w: &mut dyn Write) -> std::io::Result<()> {
    for (key, value) in stat_rows(&report.stats) {
        writeln!(w, "{key}\t{value}")?;
    }
    Ok(())
}

fn render_stats_pretty(report: &StatsReport, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Graph {}", report.graph))?;
    for (key, value) in stat_rows(&report.stats) {
        pretty_kv(w, &key.replace('_', " "), value)?;
    }
    Ok(())
}
