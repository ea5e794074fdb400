mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::Workspace;

#[derive(Parser)]
#[command(name = "electrolyte")]
#[command(about = "Electrolyte research assistant: paper extraction, literature search and formulation analysis", long_about = None)]
#[command(version)]
struct Cli {
    #[arg(long, global = true, help = "Config file (default: ./electrolyte.yaml)")]
    config: Option<PathBuf>,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "More log output (-v info, -vv debug)")]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    // ===== Knowledge base =====
    /// Add papers to the knowledge base
    Ingest {
        #[arg(required = true, help = "PDF/text files, directories or glob patterns")]
        inputs: Vec<String>,
        #[arg(long, help = "Replace the knowledge base instead of adding to it")]
        replace: bool,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Load the bundled example documents
    Examples {
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Remove all documents and analysis history
    Clear {
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Knowledge base status
    Status {
        #[arg(long, help = "JSON output")]
        json: bool,
    },

    // ===== Retrieval & analysis =====
    /// Search the literature
    Search {
        query: String,
        #[arg(short = 'k', long, help = "Number of results (1-10)")]
        top_k: Option<usize>,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Analyze an electrolyte formulation
    Analyze {
        formulation: String,
        #[arg(long, help = "Skip the literature search")]
        no_research: bool,
        #[arg(long, help = "Ask the AI backend for recommendations")]
        llm: bool,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Analyze one formulation per line of a file
    Batch {
        file: PathBuf,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Show what would be extracted from a paper
    Extract {
        file: PathBuf,
        #[arg(long, help = "JSON output")]
        json: bool,
    },

    // ===== Servers =====
    /// Start the web UI
    Serve {
        #[arg(long, help = "Bind host (default from config)")]
        host: Option<String>,
        #[arg(long, help = "Bind port (default from config)")]
        port: Option<u16>,
    },
    /// Ingest new papers as they appear in a directory
    #[cfg(feature = "watch")]
    Watch { dir: PathBuf },
    /// Start MCP server for AI assistant integration
    #[cfg(feature = "mcp")]
    Mcp {
        #[arg(long, help = "Show client configuration instructions")]
        install: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, matches!(cli.command, Commands::Serve { .. }));

    let workspace = Workspace::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Ingest {
            inputs,
            replace,
            json,
        } => commands::ingest::run(&workspace, &inputs, replace, json),
        Commands::Examples { json } => commands::examples::run(&workspace, json),
        Commands::Clear { json } => commands::clear::run(&workspace, json),
        Commands::Status { json } => commands::status::run(&workspace, json),

        Commands::Search { query, top_k, json } => commands::search::run(&workspace, &query, top_k, json),
        Commands::Analyze {
            formulation,
            no_research,
            llm,
            json,
        } => commands::analyze::run(&workspace, &formulation, !no_research, llm, json),
        Commands::Batch { file, json } => commands::batch::run(&file, json),
        Commands::Extract { file, json } => commands::extract::run(&workspace, &file, json),

        Commands::Serve { host, port } => commands::serve::run(workspace, host, port),
        #[cfg(feature = "watch")]
        Commands::Watch { dir } => commands::watch::run(&workspace, &dir),
        #[cfg(feature = "mcp")]
        Commands::Mcp { install } => {
            if install {
                commands::mcp::print_install_instructions();
                Ok(())
            } else {
                commands::mcp::run(workspace)
            }
        }
    }
}

/// Logs go to stderr so `--json` output and the MCP stdio transport stay clean.
fn init_logging(verbose: u8, serving: bool) {
    let level = match (verbose, serving) {
        (0, false) => tracing::Level::WARN,
        (0, true) | (1, _) => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}
