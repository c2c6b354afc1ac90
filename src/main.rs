//! Taxon CLI - Command-line interface for identifier classification
//!
//! Architecture: Application Layer - CLI coordinates user interactions with domain services
//! - Translates user commands to classification runs
//! - Handles external concerns like file I/O, process exit codes, and terminal output

use category_taxon::batch::BatchOptions;
use category_taxon::taxonomy::builtin::builtin;
use category_taxon::{
    ClassifyOptions, NodeId, OutputFormat, RunConfig, TaxonClassifier, TaxonError, TaxonResult,
    Taxonomy,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

/// Taxon - hierarchical classification of identifier listings
#[derive(Parser)]
#[command(name = "taxon")]
#[command(version)]
#[command(about = "Classify flat identifier listings into a hierarchical taxonomy")]
#[command(
    long_about = "Taxon assigns every identifier of a listing to at most one node of a taxonomy, using exclusive, include and exclude patterns, and writes the resulting component tree as JSON, YAML or a terminal report."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a single identifier listing
    Classify {
        /// Listing with one identifier per line
        file: PathBuf,

        /// Report only the subtree of this node
        #[arg(short, long)]
        node: Option<String>,

        /// Version label written to the report
        #[arg(short, long)]
        label: Option<String>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormatArg>,

        /// Builtin taxonomy to classify against
        #[arg(short, long)]
        taxonomy: Option<String>,
    },

    /// Classify every listing of a directory, writing a JSON report next to each
    Batch {
        /// Directory holding the listings
        dir: PathBuf,

        /// Glob matched against file names
        #[arg(short, long)]
        pattern: Option<String>,

        /// Disable parallel processing
        #[arg(long)]
        no_parallel: bool,

        /// Stop at the first failing listing
        #[arg(long)]
        fail_fast: bool,
    },

    /// Print a taxonomy
    Tree {
        /// Builtin taxonomy to print
        #[arg(short, long)]
        taxonomy: Option<String>,

        /// Print only the subtree of this node
        #[arg(short, long)]
        node: Option<String>,
    },

    /// Validate configuration file
    ValidateConfig {
        /// Configuration file to validate
        config_file: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, ValueEnum, PartialEq)]
enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Yaml => OutputFormat::Yaml,
            OutputFormatArg::Human => OutputFormat::Human,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.log_json);

    match run_command(cli) {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(e.exit_code());
        }
    }
}

fn run_command(cli: Cli) -> TaxonResult<i32> {
    let use_colors = !cli.no_color;
    match cli.command {
        Commands::Classify { file, node, label, format, taxonomy } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(taxonomy) = taxonomy {
                config.taxonomy = taxonomy;
            }
            if node.is_some() {
                config.node = node;
            }
            if label.is_some() {
                config.label = label;
            }
            if let Some(format) = format {
                config.output.format = format.into();
            }
            config.output.colors &= use_colors;
            run_classify(&config, &file)
        }
        Commands::Batch { dir, pattern, no_parallel, fail_fast } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(pattern) = pattern {
                config.batch.pattern = pattern;
            }
            let options = BatchOptions {
                pattern: config.batch.pattern.clone(),
                parallel: !no_parallel,
                fail_fast,
                selection: config.selection(),
            };
            run_batch(&config, &dir, &options)
        }
        Commands::Tree { taxonomy, node } => {
            let config = load_config(cli.config.as_deref())?;
            let name = taxonomy.unwrap_or(config.taxonomy);
            run_tree(&name, node.as_deref())
        }
        Commands::ValidateConfig { config_file } => run_validate_config(config_file.or(cli.config)),
    }
}

/// Explicit configuration file, else the first default file in the working directory, else defaults
fn load_config(config_path: Option<&Path>) -> TaxonResult<RunConfig> {
    match config_path {
        Some(path) => RunConfig::load_from_file(path),
        None => Ok(RunConfig::discover(".")?.unwrap_or_default()),
    }
}

fn run_classify(config: &RunConfig, file: &Path) -> TaxonResult<i32> {
    let classifier = TaxonClassifier::from_config(config)?;
    if let Some(name) = config.node.as_deref() {
        if classifier.taxonomy().find(name).is_none() {
            return Err(TaxonError::unknown_node(name));
        }
    }
    let collection = classifier.classify_file(file, &ClassifyOptions::from_config(config))?;

    let formatted = classifier.format_collection(&collection, config.output.format)?;
    println!("{formatted}");
    Ok(0)
}

fn run_batch(config: &RunConfig, dir: &Path, options: &BatchOptions) -> TaxonResult<i32> {
    let classifier = TaxonClassifier::from_config(config)?;
    let summary = classifier.classify_directory(dir, options)?;

    if summary.written.is_empty() && summary.failed.is_empty() {
        println!("No listings matching '{}' in {}", options.pattern, dir.display());
        return Ok(0);
    }
    println!("{}", summary.format_display());

    if summary.has_failures() {
        let total = summary.written.len() + summary.failed.len();
        eprintln!("{} of {} listings failed", summary.failed.len(), total);
        Ok(1)
    } else {
        Ok(0)
    }
}

fn run_tree(name: &str, node: Option<&str>) -> TaxonResult<i32> {
    let taxonomy = builtin(name)?;

    let roots: Vec<NodeId> = match node {
        Some(node_name) => {
            let id =
                taxonomy.find(node_name).ok_or_else(|| TaxonError::unknown_node(node_name))?;
            println!("{}", taxonomy.path(id).join(" / "));
            vec![id]
        }
        None => {
            println!("{}", taxonomy.name());
            taxonomy.roots().to_vec()
        }
    };

    for root in roots {
        print!("{}", render_subtree(&taxonomy, root));
    }

    let stats = taxonomy.stats();
    println!();
    println!(
        "{} nodes ({} hidden), {} exclusive / {} include / {} exclude patterns",
        stats.nodes,
        stats.hidden_nodes,
        stats.exclusive_patterns,
        stats.include_patterns,
        stats.exclude_patterns
    );
    Ok(0)
}

/// One line per node, indented relative to `root`
fn render_subtree(taxonomy: &Taxonomy, root: NodeId) -> String {
    let base = taxonomy.node(root).depth();
    let mut output = String::new();
    for id in taxonomy.preorder(root) {
        let node = taxonomy.node(id);
        let indent = "  ".repeat(node.depth() - base + 1);

        let mut marks = Vec::new();
        if !node.exclusives().is_empty() {
            marks.push(format!("exclusive {}", node.exclusives().len()));
        }
        if !node.includes().is_empty() {
            marks.push(format!("include {}", node.includes().len()));
        }
        if !node.excludes().is_empty() {
            marks.push(format!("exclude {}", node.excludes().len()));
        }
        if node.is_hidden() {
            marks.push("hidden".to_string());
        }

        if marks.is_empty() {
            output.push_str(&format!("{indent}{}\n", node.name()));
        } else {
            output.push_str(&format!("{indent}{} [{}]\n", node.name(), marks.join(", ")));
        }
    }
    output
}

fn run_validate_config(config_path: Option<PathBuf>) -> TaxonResult<i32> {
    let config_path = config_path.unwrap_or_else(|| PathBuf::from("taxon.yaml"));

    println!("Validating configuration: {}", config_path.display());

    match RunConfig::load_from_file(&config_path) {
        Ok(config) => {
            println!("Configuration is valid");
            println!("  Taxonomy: {}", config.taxonomy);
            println!("  Node: {}", config.node.as_deref().unwrap_or("(all visible)"));
            println!("  Format: {:?}", config.output.format);
            println!("  Batch pattern: {}", config.batch.pattern);
            Ok(0)
        }
        Err(e) => {
            eprintln!("Configuration validation failed: {e}");
            Ok(1)
        }
    }
}

fn init_logging(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
