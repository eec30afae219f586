//! `bpi rank`: Bundle and Pivotal index rankings for a graph file.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use bpi_core::config::AnalysisConfig;
use bpi_core::metrics::{IndexResult, bundle_index, pivotal_index};
use bpi_core::rank::{format_ranking, heading, rank};
use bpi_core::{Baseline, IndexConfig, IndexError, IndexKind, RankedEntry, WeightedGraph};
use clap::{Args, ValueEnum};
use serde::Serialize;
use tracing::{info, instrument};

use crate::input::{LabelArgs, load_graph, resolve_labels};
use crate::output::{OutputMode, pretty_rule, pretty_section, render_mode};

/// Arguments for `bpi rank`.
#[derive(Args, Debug, Default)]
pub struct RankArgs {
    /// GML graph file.
    #[arg(value_name = "GRAPH")]
    pub graph: PathBuf,

    #[command(flatten)]
    pub labels: LabelArgs,

    /// Maximum number of neighbours in a group.
    #[arg(long)]
    pub order: Option<usize>,

    /// Number of sequential evaluation rounds.
    #[arg(long)]
    pub iterations: Option<usize>,

    /// Damping constant for the baseline quota.
    #[arg(long)]
    pub damping: Option<f64>,

    /// Worker threads per engine (default: all cores).
    #[arg(long)]
    pub threads: Option<usize>,

    /// Report raw group counts instead of unit-sum scores.
    #[arg(long)]
    pub raw: bool,

    /// Form groups from out-neighbours instead of in-neighbours.
    #[arg(long)]
    pub outgoing: bool,

    /// Rows per ranking.
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Decimal places for scores.
    #[arg(long)]
    pub precision: Option<usize>,

    /// Compute only one of the two indices.
    #[arg(long, value_enum)]
    pub only: Option<IndexChoice>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IndexChoice {
    Bundle,
    Pivotal,
}

impl RankArgs {
    /// Overlay command-line flags onto the file configuration.
    pub fn apply(&self, config: &mut AnalysisConfig) {
        if let Some(order) = self.order {
            config.index.order = order;
        }
        if let Some(iterations) = self.iterations {
            config.index.iterations = iterations;
        }
        if let Some(damping) = self.damping {
            config.baseline.damping = damping;
        }
        if let Some(threads) = self.threads {
            config.index.threads = Some(threads);
        }
        if self.raw {
            config.index.normalize = false;
        }
        if self.outgoing {
            config.index.incoming = false;
        }
        if let Some(limit) = self.limit {
            config.ranking.limit = limit;
        }
        if let Some(precision) = self.precision {
            config.ranking.precision = precision;
        }
    }

    fn kinds(&self) -> Vec<IndexKind> {
        match self.only {
            None => vec![IndexKind::Bundle, IndexKind::Pivotal],
            Some(IndexChoice::Bundle) => vec![IndexKind::Bundle],
            Some(IndexChoice::Pivotal) => vec![IndexKind::Pivotal],
        }
    }
}

/// One ranked list.
#[derive(Debug, Serialize)]
pub struct Ranking {
    pub index: IndexKind,
    pub heading: String,
    pub rounds: usize,
    pub normalized: bool,
    pub entries: Vec<RankedEntry>,
}

/// Report payload for `bpi rank`.
#[derive(Debug, Serialize)]
pub struct RankReport {
    pub graph: String,
    pub content_hash: String,
    pub config: AnalysisConfig,
    pub rankings: Vec<Ranking>,
}

/// Execute `bpi rank`.
///
/// # Errors
///
/// Configuration, graph, label and index errors, with the failing step as
/// context.
#[instrument(skip_all, fields(graph = %args.graph.display()))]
pub fn run_rank(args: &RankArgs, mut config: AnalysisConfig, output: OutputMode) -> Result<()> {
    args.apply(&mut config);
    config.index.validate()?;

    let loaded = load_graph(&args.graph)?;
    let labels = resolve_labels(&args.labels, &loaded)?;
    labels
        .validate(&loaded.graph)
        .context("label table does not cover the graph")?;
    let baseline = Baseline::compute(&loaded.graph, config.baseline.damping)?;

    let results = compute(&loaded.graph, &baseline, &config.index, &args.kinds())?;

    let rankings = results
        .into_iter()
        .map(|result| {
            let entries = rank(&result.scores, &labels, config.ranking.limit)?;
            Ok(Ranking {
                index: result.kind,
                heading: heading(result.kind, entries.len()),
                rounds: result.rounds,
                normalized: result.normalized,
                entries,
            })
        })
        .collect::<Result<Vec<_>, IndexError>>()?;

    info!(rankings = rankings.len(), "rankings ready");

    let report = RankReport {
        graph: args.graph.display().to_string(),
        content_hash: loaded.graph.content_hash().to_string(),
        config,
        rankings,
    };
    render_mode(output, &report, render_rank_text, render_rank_pretty)
}

/// Run each requested engine on its own scoped thread over shared inputs.
fn compute(
    graph: &WeightedGraph,
    baseline: &Baseline,
    config: &IndexConfig,
    kinds: &[IndexKind],
) -> Result<Vec<IndexResult>> {
    std::thread::scope(|s| {
        let handles: Vec<_> = kinds
            .iter()
            .map(|&kind| {
                s.spawn(move || match kind {
                    IndexKind::Bundle => bundle_index(graph, baseline, config),
                    IndexKind::Pivotal => pivotal_index(graph, baseline, config),
                })
            })
            .collect();

        handles
            .into_iter()
            .zip(kinds)
            .map(|(handle, kind)| {
                let result = handle
                    .join()
                    .map_err(|_| anyhow::anyhow!("{} index worker panicked", kind.name()))?;
                result.with_context(|| format!("computing {} index", kind.name()))
            })
            .collect()
    })
}

fn render_rank_text(report: &RankReport, w: &mut dyn Write) -> std::io::Result<()> {
    for (i, ranking) in report.rankings.iter().enumerate() {
        if i > 0 {
            writeln!(w)?;
        }
        write!(
            w,
            "{}",
            format_ranking(ranking.index, &ranking.entries, report.config.ranking.precision)
        )?;
    }
    Ok(())
}

fn render_rank_pretty(report: &RankReport, w: &mut dyn Write) -> std::io::Result<()> {
    let precision = report.config.ranking.precision;
    let label_width = report
        .rankings
        .iter()
        .flat_map(|r| r.entries.iter().map(|e| e.label.chars().count()))
        .max()
        .unwrap_or(0)
        .max(5);

    writeln!(w, "Graph: {} ({})", report.graph, report.content_hash)?;
    writeln!(
        w,
        "order {}  damping {}  {}  {}",
        report.config.index.order,
        report.config.baseline.damping,
        if report.config.index.incoming {
            "incoming"
        } else {
            "outgoing"
        },
        if report.config.index.normalize {
            "normalized"
        } else {
            "raw counts"
        },
    )?;

    for ranking in &report.rankings {
        writeln!(w)?;
        pretty_section(w, &ranking.heading)?;
        for e in &ranking.entries {
            writeln!(
                w,
                "{:>3}. {:<width$}  {:>12.prec$}",
                e.rank,
                e.label,
                e.score,
                width = label_width,
                prec = precision
            )?;
        }
        if ranking.entries.is_empty() {
            writeln!(w, "(empty graph)")?;
        }
        pretty_rule(w)?;
    }
    Ok(())
}
