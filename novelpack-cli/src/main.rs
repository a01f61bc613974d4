//! Novelpack CLI - inspect, validate, pack and repack EPUB archives

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use novelpack_core::{CompositionMode, StrategyKind};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Parse a decompressed size ceiling (must be at least 1 byte)
fn parse_size(s: &str) -> Result<u64, String> {
    let n: u64 = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;
    if n < 1 {
        Err("size must be at least 1 byte".to_string())
    } else {
        Ok(n)
    }
}

#[derive(Parser)]
#[command(name = "novelpack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display the structure and content documents of archives
    Inspect {
        /// Archive paths
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Decompressed size ceiling in bytes
        #[arg(long, value_parser = parse_size)]
        max_size: Option<u64>,

        /// Extraction strategies to try, in order (central, stream)
        #[arg(long = "strategy")]
        strategies: Vec<StrategyKind>,
    },

    /// Check an archive against the EPUB layout rules
    Validate {
        /// Archive path
        input: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Decompressed size ceiling in bytes
        #[arg(long, value_parser = parse_size)]
        max_size: Option<u64>,
    },

    /// Package a book model (JSON) as an EPUB archive
    Pack {
        /// Book model path
        input: String,

        /// Output file path (defaults to the input name with .epub)
        #[arg(short, long)]
        output: Option<String>,

        /// Composition mode (original, baidu, sequential:youdao,
        /// interleaved:baidu, trilingual, ...)
        #[arg(short, long, default_value = "original")]
        mode: CompositionMode,

        /// Stylesheet replacing the default one
        #[arg(long)]
        stylesheet: Option<String>,
    },

    /// Rewrite an archive with the EPUB entry order restored
    Repack {
        /// Input archive path
        input: String,

        /// Output archive path
        #[arg(short, long)]
        output: String,

        /// Decompressed size ceiling in bytes
        #[arg(long, value_parser = parse_size)]
        max_size: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "novelpack_cli=debug,novelpack_core=debug"
    } else {
        "novelpack_cli=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Inspect {
            inputs,
            json,
            max_size,
            strategies,
        } => commands::inspect(&inputs, json, commands::extract_options(max_size, strategies)),

        Commands::Validate {
            input,
            json,
            max_size,
        } => commands::validate(&input, json, commands::extract_options(max_size, Vec::new())),

        Commands::Pack {
            input,
            output,
            mode,
            stylesheet,
        } => commands::pack(&input, output.as_deref(), mode, stylesheet.as_deref()),

        Commands::Repack {
            input,
            output,
            max_size,
        } => commands::repack(&input, &output, commands::extract_options(max_size, Vec::new())),
    }
}
