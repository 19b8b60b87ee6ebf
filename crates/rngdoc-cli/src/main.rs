mod commands;
mod reader;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::catalog::CatalogArgs;

#[derive(Parser)]
#[command(
    name = "rngdoc",
    version,
    about = "RELAX NG documentation tool: render compact syntax and build element catalogs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a RELAX NG grammar in compact syntax
    Render {
        /// Grammar file (.rng); defaults to `schema` from the config
        schema: Option<PathBuf>,

        /// Project config (defaults to ./rngdoc.config.yaml when present)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write output to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build the element catalog as JSON
    Catalog {
        /// Grammar file (.rng); defaults to `schema` from the config
        schema: Option<PathBuf>,

        /// Previous grammar used to flag new elements and attributes
        #[arg(long)]
        baseline: Option<PathBuf>,

        /// Description files (YAML), merged after those named in the config
        #[arg(long = "descriptions", num_args = 1..)]
        descriptions: Vec<PathBuf>,

        /// Project config (defaults to ./rngdoc.config.yaml when present)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write output to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compare two grammars and list added and removed elements and attributes
    Diff {
        /// Baseline grammar
        baseline: PathBuf,

        /// Current grammar
        current: PathBuf,

        /// Output format: human (default) or json
        #[arg(long, default_value = "human")]
        format: String,
    },
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rngdoc=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Commands::Render {
            schema,
            config,
            output,
        } => commands::render::run_render(
            schema.as_deref(),
            config.as_deref(),
            output.as_deref(),
        ),
        Commands::Catalog {
            schema,
            baseline,
            descriptions,
            config,
            output,
        } => commands::catalog::run_catalog(&CatalogArgs {
            schema: schema.as_deref(),
            baseline: baseline.as_deref(),
            descriptions: &descriptions,
            config: config.as_deref(),
            output: output.as_deref(),
        }),
        Commands::Diff {
            baseline,
            current,
            format,
        } => commands::diff::run_diff(&baseline, &current, &format),
    };

    match result {
        Ok(output) => {
            println!("{output}");
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
