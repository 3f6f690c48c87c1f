#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::uninlined_format_args)]

mod csv_reader;
mod network;
mod structs;

use clap::{Args as ClapArgs, Parser, Subcommand};
use network::bootstrap::{BootstrapConfig, DEFAULT_MAX_FAILURE_RATE};
use network::pipeline::{NetworkConfig, NetworkResult};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use structs::{CsvData, FeatureMatrix, NetError, Network, Result};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// corrnet - correlation networks from minimum spanning trees
#[derive(Parser, Debug)]
#[command(name = "corrnet")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Input and output locations shared by every subcommand
#[derive(ClapArgs, Debug)]
struct InputArgs {
    /// Input CSV/TSV file, one column per variable
    #[arg(short, long)]
    csv: PathBuf,

    /// Field delimiter of the input file
    #[arg(short, long, default_value = ",")]
    delimiter: char,

    /// Treat input as TSV instead of CSV (same as --delimiter '\t')
    #[arg(long)]
    tsv: bool,

    /// Output directory for network results
    #[arg(short, long, default_value = "./network_output")]
    output_dir: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the minimum spanning tree of the full data set
    Tree {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Aggregate bootstrap spanning trees into a consensus graph
    Bootstrap {
        #[command(flatten)]
        input: InputArgs,

        /// Number of bootstrap resamples
        #[arg(short = 'n', long, default_value = "100")]
        iterations: usize,

        /// Drop edges seen in fewer resamples than this
        #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
        tolerance: i64,

        /// Seed for resampling (random when omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Worker threads (0 = one per core)
        #[arg(long, default_value = "0")]
        threads: usize,

        /// Largest share of degenerate resamples before giving up
        #[arg(long, default_value_t = DEFAULT_MAX_FAILURE_RATE)]
        max_failure_rate: f64,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Some(Commands::Tree { input }) => run_network(&input, &NetworkConfig::default(), None),

        Some(Commands::Bootstrap {
            input,
            iterations,
            tolerance,
            seed,
            threads,
            max_failure_rate,
        }) => {
            let seed = seed.unwrap_or_else(rand::random);
            info!(seed, "bootstrap seed (pass --seed to reproduce)");

            let config = NetworkConfig {
                bootstrap: Some(BootstrapConfig {
                    iterations,
                    seed,
                    threads,
                    max_failure_rate,
                }),
                tolerance,
            };

            // Setup shutdown flag
            let shutdown = Arc::new(AtomicBool::new(false));
            let shutdown_clone = shutdown.clone();
            ctrlc::set_handler(move || {
                eprintln!("\nReceived Ctrl+C, finishing running iterations...");
                shutdown_clone.store(true, Ordering::SeqCst);
            })
            .map_err(|e| NetError::Config(format!("Failed to set Ctrl+C handler: {e}")))?;

            run_network(&input, &config, Some(shutdown.as_ref()))
        }

        None => {
            eprintln!("No subcommand provided. Use 'corrnet tree' or 'corrnet bootstrap'.");
            eprintln!("Run 'corrnet --help' for usage information.");
            std::process::exit(1);
        }
    }
}

/// Load the observations, run the pipeline and write every output file
fn run_network(input: &InputArgs, config: &NetworkConfig, cancel: Option<&AtomicBool>) -> Result<()> {
    // Validate input
    if !input.csv.exists() {
        return Err(NetError::Config(format!(
            "CSV file not found: {}",
            input.csv.display()
        )));
    }

    std::fs::create_dir_all(&input.output_dir)?;

    info!(path = %input.csv.display(), "loading observations");
    let delimiter = csv_reader::parse_delimiter(input.delimiter, input.tsv)?;
    let csv_data = CsvData::from_file(&input.csv, delimiter)?;
    let features = FeatureMatrix::from_csv(&csv_data)?;
    info!(
        rows = features.n_samples(),
        variables = features.n_features(),
        skipped_rows = csv_data.row_count() - features.n_samples(),
        "extracted numeric variables"
    );

    let result = network::pipeline::run_pipeline(&features, config, cancel)?;

    write_outputs(&input.output_dir, features.n_samples(), &result, config.tolerance)
}

fn write_outputs(
    output_dir: &Path,
    rows: usize,
    result: &NetworkResult,
    tolerance: i64,
) -> Result<()> {
    network::output::write_correlation(output_dir, &result.correlation)?;
    network::output::write_summary_json(output_dir, rows, result, tolerance)?;

    let mut written = vec!["correlation.csv", "summary.json"];

    if let Some(tree) = &result.tree {
        network::output::write_edges(output_dir, "tree_edges.csv", tree)?;
        written.push("tree_edges.csv");
    }

    if let Some(consensus) = &result.consensus {
        network::output::write_edges(output_dir, "consensus_edges.csv", &consensus.graph)?;
        written.push("consensus_edges.csv");

        let report = &consensus.report;
        if report.skipped() > 0 {
            let skipped: Vec<String> = report
                .failures
                .iter()
                .map(|f| f.iteration.to_string())
                .collect();
            warn!(
                count = report.skipped(),
                iterations = %skipped.join(","),
                "skipped degenerate resamples"
            );
        }
        if report.cancelled > 0 {
            warn!(
                cancelled = report.cancelled,
                "run was interrupted, consensus covers completed iterations only"
            );
        }
        eprintln!(
            "Consensus graph: {} vertices, {} edges from {} of {} resamples",
            consensus.graph.vertex_count(),
            consensus.graph.edge_count(),
            report.completed,
            report.requested
        );
    }

    eprintln!("Output written to {}", output_dir.display());
    for name in written {
        eprintln!("  - {name}");
    }

    Ok(())
}
