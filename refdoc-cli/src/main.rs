//! # refdoc CLI
//!
//! Command-line interface for exporting and checking refdoc documents.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "refdoc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = refdoc_core::config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a document as Markdown plus a BibTeX bibliography
    Export {
        /// Document JSON file
        document: PathBuf,

        /// Output base name (defaults to the document file stem)
        #[arg(long)]
        name: Option<String>,

        /// Output directory (overrides the config)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Extra reference files (.json or .bib), loaded after the config's
        #[arg(long, value_delimiter = ',')]
        references: Vec<PathBuf>,

        /// Print to stdout instead of writing files
        #[arg(long)]
        stdout: bool,
    },

    /// Export the whole reference library as BibTeX
    References {
        /// Extra reference files (.json or .bib), loaded after the config's
        #[arg(long, value_delimiter = ',')]
        references: Vec<PathBuf>,

        /// Output file (defaults to references.bib in the output directory)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Replay edit transactions and report tracked citation ranges
    Track {
        /// Document JSON file
        document: PathBuf,

        /// JSON array of transactions
        edits: PathBuf,

        /// Write the edited document here
        #[arg(long)]
        output: Option<PathBuf>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Validate document structure and citation references
    Check {
        /// Document JSON file
        document: PathBuf,

        /// Extra reference files (.json or .bib), loaded after the config's
        #[arg(long, value_delimiter = ',')]
        references: Vec<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Export {
            document,
            name,
            output_dir,
            references,
            stdout,
        } => {
            let opts = commands::ExportOptions {
                name,
                output_dir,
                references,
                stdout,
            };
            commands::export_document(&cli.config, &document, opts)
        }
        Commands::References { references, output } => {
            commands::export_library(&cli.config, &references, output.as_deref())
        }
        Commands::Track {
            document,
            edits,
            output,
            json,
        } => commands::track_edits(&document, &edits, output.as_deref(), json),
        Commands::Check {
            document,
            references,
        } => commands::check_document(&cli.config, &document, &references),
    }
}
