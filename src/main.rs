//! Network Measures CLI
//!
//! A command-line tool for converting relational data into networks and
//! computing structural measures over them.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use network_measures::{
    analysis::{Analyzer, BatchRunner},
    compare,
    graph::GraphKind,
    ingest::{self, IngestOptions},
    measures::MeasureRegistry,
    sink::{CsvSink, DistributionWriter},
    Config,
};
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Prefix of the environment variables overriding the configuration
const ENV_PREFIX: &str = "NETMEASURES";

#[derive(Parser)]
#[command(name = "network-measures")]
#[command(about = "Structural measures over batches of networks", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults are used when it does not exist)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute every measure for every network in a directory
    Analyze {
        /// Directory with the source networks (defaults to the graphs directory)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Directory for the result tables
        #[arg(short, long)]
        results: Option<PathBuf>,

        /// Number of networks analyzed concurrently
        #[arg(short, long)]
        workers: Option<usize>,

        /// Read edge lists and matrices as directed networks
        #[arg(long)]
        directed: bool,

        /// Use edge weights as path lengths
        #[arg(long)]
        weighted: bool,

        /// Hide the progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Convert source files into node-link JSON networks
    Generate {
        /// Directory with edge lists or adjacency matrices
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory (defaults to the graphs directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Read the sources as directed networks
        #[arg(long)]
        directed: bool,
    },

    /// Compare local measures between matched nodes of two networks
    Compare {
        /// Source network file
        #[arg(long)]
        source: PathBuf,

        /// Target network file
        #[arg(long)]
        target: PathBuf,

        /// CSV file with source_node,target_node columns
        #[arg(long)]
        pairs: PathBuf,

        /// Local measures to compare
        #[arg(
            short,
            long,
            value_delimiter = ',',
            default_value = "degree,closeness_centrality,local_clustering,betweenness_centrality"
        )]
        measures: Vec<String>,

        /// Output directory (defaults to <results>/compare_node_pairs)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write the default configuration to the config path
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = Config::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?
        .with_env_overrides(ENV_PREFIX);

    match cli.command {
        Commands::Analyze {
            input,
            results,
            workers,
            directed,
            weighted,
            no_progress,
        } => {
            if let Some(results) = results {
                config.output.results_dir = results;
            }
            if workers.is_some() {
                config.runtime.workers = workers;
            }
            config.ingest.directed |= directed;
            config.analysis.use_weights |= weighted;
            config.runtime.progress &= !no_progress;
            config.validate()?;

            let input = input.unwrap_or_else(|| config.output.graphs_dir.clone());
            let sources = ingest::discover(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            if sources.is_empty() {
                warn!("No supported sources in {}", input.display());
            }
            info!("Analyzing {} networks from {}", sources.len(), input.display());

            let registry = MeasureRegistry::standard().select(
                config.analysis.global_measures.as_deref(),
                config.analysis.local_measures.as_deref(),
            )?;
            let analyzer = Analyzer::new(registry, config.measure_config());

            let mut sink = CsvSink::new(
                &config.output.results_dir,
                DistributionWriter::new(&config.output.plots_dir),
            )
            .missing_marker(config.output.missing_marker.clone());

            let context = BatchRunner::new(analyzer)
                .ingest_options(IngestOptions {
                    kind: GraphKind::from_directed(config.ingest.directed),
                })
                .workers(config.workers())
                .progress(config.runtime.progress)
                .run_sources(&sources, &mut sink)?;

            println!("\nRun Summary");
            println!("{:-<60}", "");
            println!("  Analyzed: {}", context.analyzed.len());
            println!("  Skipped:  {}", context.skipped.len());
            for issue in &context.skipped {
                println!("    {}: {}", issue.id, issue.reason);
            }
            println!("  Failed:   {}", context.failed.len());
            for issue in &context.failed {
                println!("    {}: {}", issue.id, issue.reason);
            }
            println!("  Results:  {}", config.output.results_dir.display());
        }

        Commands::Generate {
            input,
            output,
            directed,
        } => {
            let output = output.unwrap_or_else(|| config.output.graphs_dir.clone());
            let options = IngestOptions {
                kind: GraphKind::from_directed(directed || config.ingest.directed),
            };

            let sources = ingest::discover(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            info!("Generating {} networks into {}", sources.len(), output.display());

            let mut written = 0;
            for source in &sources {
                match ingest::load(source, &options) {
                    Ok(network) => {
                        ingest::write_node_link(&network, &output.join(&source.id))?;
                        info!(
                            "{}: {} nodes, {} edges",
                            source.id,
                            network.node_count(),
                            network.edge_count()
                        );
                        written += 1;
                    }
                    Err(e) => warn!("Skipping {}: {}", source.id, e),
                }
            }

            println!("Generated {} of {} networks in {}", written, sources.len(), output.display());
        }

        Commands::Compare {
            source,
            target,
            pairs,
            measures,
            output,
        } => {
            config.validate()?;
            let options = IngestOptions {
                kind: GraphKind::from_directed(config.ingest.directed),
            };

            let source_net = ingest::load(&ingest::Source::from_path(&source)?, &options)?;
            let target_net = ingest::load(&ingest::Source::from_path(&target)?, &options)?;
            let pairs = compare::read_node_pairs(&pairs)?;

            let output =
                output.unwrap_or_else(|| config.output.results_dir.join("compare_node_pairs"));
            let registry = MeasureRegistry::standard();
            let measure_config = config.measure_config();

            for measure in &measures {
                let rows = compare::compare_measure(
                    &registry,
                    &measure_config,
                    measure,
                    &source_net,
                    &target_net,
                    &pairs,
                )?;
                let path = output.join(format!(
                    "{}_{}_{}.csv",
                    source_net.id(),
                    target_net.id(),
                    measure
                ));
                compare::write_comparison(&path, &rows)?;
                println!("Wrote {} rows for '{}' to {}", rows.len(), measure, path.display());
            }
        }

        Commands::InitConfig { force } => {
            if cli.config.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    cli.config.display()
                );
            }
            Config::default().to_file(&cli.config)?;
            println!("Wrote default configuration to {}", cli.config.display());
        }
    }

    Ok(())
}
