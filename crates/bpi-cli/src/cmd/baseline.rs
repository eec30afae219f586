//! `bpi baseline`: per-vertex quota ("ql") for a graph file.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use bpi_core::Baseline;
use bpi_core::config::AnalysisConfig;
use clap::Args;
use serde::Serialize;

use crate::input::{LabelArgs, load_graph, resolve_labels};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `bpi baseline`.
#[derive(Args, Debug, Default)]
pub struct BaselineArgs {
    /// GML graph file.
    #[arg(value_name = "GRAPH")]
    pub graph: PathBuf,

    #[command(flatten)]
    pub labels: LabelArgs,

    /// Damping constant applied to incoming weight.
    #[arg(long)]
    pub damping: Option<f64>,

    /// Decimal places for quotas.
    #[arg(long)]
    pub precision: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct QuotaRow {
    pub vertex: String,
    pub label: String,
    pub quota: f64,
}

/// Report payload for `bpi baseline`.
#[derive(Debug, Serialize)]
pub struct BaselineReport {
    pub graph: String,
    pub damping: f64,
    pub total: f64,
    pub vertices: Vec<QuotaRow>,
    #[serde(skip)]
    precision: usize,
}

/// Execute `bpi baseline`.
///
/// # Errors
///
/// Graph, label and damping errors.
pub fn run_baseline(args: &BaselineArgs, config: &AnalysisConfig, output: OutputMode) -> Result<()> {
    let damping = args.damping.unwrap_or(config.baseline.damping);
    let precision = args.precision.unwrap_or(config.ranking.precision);

    let loaded = load_graph(&args.graph)?;
    let labels = resolve_labels(&args.labels, &loaded)?;
    let baseline = Baseline::compute(&loaded.graph, damping)?;

    let vertices = loaded
        .graph
        .vertices()
        .zip(baseline.aligned(&loaded.graph)?)
        .map(|(v, quota)| {
            Ok(QuotaRow {
                vertex: v.to_string(),
                label: labels.resolve(v)?.to_string(),
                quota,
            })
        })
        .collect::<Result<Vec<_>, bpi_core::IndexError>>()?;

    let report = BaselineReport {
        graph: args.graph.display().to_string(),
        damping,
        total: vertices.iter().map(|r| r.quota).sum(),
        vertices,
        precision,
    };
    render_mode(output, &report, render_baseline_text, render_baseline_pretty)
}

fn render_baseline_text(report: &BaselineReport, w: &mut dyn Write) -> std::io::Result<()> {
    for row in &report.vertices {
        writeln!(
            w,
            "{}\t{}\t{:.prec$}",
            row.vertex,
            row.label,
            row.quota,
            prec = report.precision
        )?;
    }
    Ok(())
}

fn render_baseline_pretty(report: &BaselineReport, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Baseline quotas ({})", report.graph))?;
    pretty_kv(w, "damping", report.damping.to_string())?;
    pretty_kv(w, "total", format!("{:.prec$}", report.total, prec = report.precision))?;
    writeln!(w)?;
    for row in &report.vertices {
        writeln!(
            w,
            "  {:<8} {:<28} {:>12.prec$}",
            row.vertex,
            row.label,
            row.quota,
            prec = report.precision
        )?;
    }
    Ok(())
}
