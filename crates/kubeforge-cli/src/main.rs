//! Kubeforge CLI - assemble, validate and export Kubernetes manifests

use clap::{Parser, Subcommand};
use kubeforge_core::ForgeConfig;
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod display;
mod error;
mod exit_codes;
mod util;

use commands::graph::GraphFormat;
use error::{CliError, Result};

#[derive(Parser)]
#[command(name = "kubeforge")]
#[command(author = "Kubeforge Contributors")]
#[command(version)]
#[command(about = "Assemble, validate and export Kubernetes manifests", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,

    /// Configuration file (default: ~/.config/kubeforge/config.yaml)
    #[arg(long, global = true, env = "KUBEFORGE_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate manifests against structural schemas and best practices
    Validate {
        /// Manifest files, `-` for stdin
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output validation results as JSON
        #[arg(long)]
        json: bool,

        /// Strict mode - treat warnings as errors
        #[arg(long)]
        strict: bool,
    },

    /// Show the relationships between resources
    Graph {
        /// Manifest files, `-` for stdin
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: GraphFormat,
    },

    /// Re-serialize manifests in canonical form
    Export {
        /// Manifest files, `-` for stdin
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output directory (if not set, outputs to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write one file per resource
        #[arg(long, requires = "output")]
        split: bool,
    },

    /// Print the default template of a kind
    New {
        /// Resource kind, e.g. Deployment
        kind: String,

        /// Resource name
        name: String,

        /// Target namespace
        #[arg(short, long)]
        namespace: Option<String>,

        /// Comment written above the manifest
        #[arg(long)]
        comment: Option<String>,
    },

    /// List supported kinds
    Kinds,
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let format = tracing_subscriber::fmt::format()
        .without_time()
        .with_target(false)
        .compact();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .event_format(format)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&std::path::Path>) -> Result<ForgeConfig> {
    let config = match path {
        Some(path) => ForgeConfig::load_from(path),
        None => ForgeConfig::load(),
    };
    config.map_err(CliError::from)
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Validate {
            files,
            json,
            strict,
        } => commands::validate::run(&files, json, strict, &config),

        Commands::Graph { files, format } => commands::graph::run(&files, format, &config),

        Commands::Export {
            files,
            output,
            split,
        } => commands::export::run(&files, output.as_deref(), split),

        Commands::New {
            kind,
            name,
            namespace,
            comment,
        } => commands::new::run(
            &kind,
            &name,
            namespace.as_deref(),
            comment.as_deref(),
            &config,
        ),

        Commands::Kinds => commands::kinds::run(),
    }
}

fn main() -> ExitCode {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version also arrive here, on stdout
            let code = if err.use_stderr() {
                exit_codes::USAGE_ERROR
            } else {
                exit_codes::SUCCESS
            };
            let _ = err.print();
            return ExitCode::from(code as u8);
        }
    };
    init_tracing(cli.debug);
    tracing::trace!("starting");

    match run(cli) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            ExitCode::from(code as u8)
        }
    }
}
