#![forbid(unsafe_code)]

mod cmd;
mod gml;
mod input;
mod output;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "bpi: Bundle and Pivotal index rankings for weighted networks",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Alias for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Configuration file (default: ./bpi.toml if present).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags and environment.
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Analysis",
        about = "Rank vertices by Bundle and Pivotal index",
        long_about = "Compute the Bundle Index and the Pivotal Index of every vertex of a GML graph and print the top of each ranking.",
        after_help = "EXAMPLES:\n    # Top-15 lists with node labels from the file\n    bpi rank trade.gml\n\n    # Groups of up to three suppliers, ten rows, explicit label list\n    bpi rank trade.gml --order 3 -n 10 --labels countries.json\n\n    # Raw counts as JSON\n    bpi rank trade.gml --raw --format json"
    )]
    Rank(cmd::rank::RankArgs),

    #[command(
        next_help_heading = "Analysis",
        about = "Show per-vertex baseline quotas",
        long_about = "Show the quota each vertex's neighbours must reach: damping times the vertex's total incoming weight.",
        after_help = "EXAMPLES:\n    # Quotas with the default damping of 0.45\n    bpi baseline trade.gml\n\n    # Custom damping\n    bpi baseline trade.gml --damping 0.6"
    )]
    Baseline(cmd::baseline::BaselineArgs),

    #[command(
        next_help_heading = "Graph",
        about = "Summarize a graph file",
        long_about = "Show vertex and edge counts, self-loops, parallel edges, weights, density and the content hash.",
        after_help = "EXAMPLES:\n    # Human summary\n    bpi stats trade.gml\n\n    # Machine-readable output\n    bpi stats trade.gml --format json"
    )]
    Stats(cmd::stats::StatsArgs),

    #[command(
        next_help_heading = "Graph",
        about = "Write a graph as labeled GML",
        long_about = "Re-export a graph as GML with vertex labels and fixed-point edge weights.",
        after_help = "EXAMPLES:\n    # Attach country names and write to a file\n    bpi export raw.gml --labels countries.txt -o labeled.gml\n\n    # Print to stdout\n    bpi export raw.gml"
    )]
    Export(cmd::export::ExportArgs),

    #[command(
        next_help_heading = "Setup",
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    # Bash\n    bpi completions bash > /etc/bash_completion.d/bpi"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("BPI_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "bpi_cli=debug,bpi_core=debug,info"
        } else {
            "bpi_cli=info,bpi_core=warn,warn"
        })
    });

    let format = env::var("BPI_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn run(cli: Cli, output: OutputMode) -> anyhow::Result<()> {
    let cwd = env::current_dir()?;
    let config = bpi_core::config::resolve_config(cli.config.as_deref(), &cwd)?;
    debug!(?config, "configuration resolved");

    match cli.command {
        Commands::Rank(ref args) => cmd::rank::run_rank(args, config, output),
        Commands::Baseline(ref args) => cmd::baseline::run_baseline(args, &config, output),
        Commands::Stats(ref args) => cmd::stats::run_stats(args, output),
        Commands::Export(ref args) => cmd::export::run_export(args, output),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let output = cli.output_mode();
    match run(cli, output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if render_error(output, &CliError::from(&err)).is_err() {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}
