//! schema-forge command line

mod commands;
mod error;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::emit::{EmitArgs, handle_emit};
use commands::infer::{InferArgs, handle_infer};
use commands::run::{RunArgs, handle_run};
use commands::validate::{handle_order, handle_validate};
use output::OutputFormat;
use schema_forge::config::ForgeConfig;

#[derive(Parser)]
#[command(name = "schema-forge")]
#[command(about = "Infer, validate and emit relational schemas from tabular samples")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Schema name, overriding the configured one
    #[arg(long, global = true)]
    name: Option<String>,

    /// Encoding for structured output
    #[arg(long, short = 'o', value_enum, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log at debug level unless RUST_LOG is set
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Infer column types from file descriptor documents
    Infer {
        /// File descriptor JSON documents
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print draft tables instead of the full inference
        #[arg(long)]
        tables: bool,

        /// Write output here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Validate a schema document
    Validate {
        schema: PathBuf,
    },
    /// Print the dependency order and cycles of a schema document
    Order {
        schema: PathBuf,
    },
    /// Emit a schema document to one or more targets
    Emit {
        schema: PathBuf,

        /// sql-migration, sql-declarative, prisma, typescript, mermaid
        #[arg(long, short = 't', value_delimiter = ',')]
        target: Vec<String>,

        #[arg(long, default_value = "schema-out")]
        out_dir: PathBuf,

        /// Emit even when validation reports errors
        #[arg(long)]
        force: bool,
    },
    /// Run inference, suggestion or fallback, validation and emission
    Run {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Recorded suggestion payload (JSON) to use as the suggestion
        #[arg(long)]
        suggestion: Option<PathBuf>,

        #[arg(long, default_value = "schema-out")]
        out_dir: PathBuf,

        /// Write the run report here instead of stdout
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "schema_forge=debug" } else { "schema_forge=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> anyhow::Result<ForgeConfig> {
    let mut config = match &cli.config {
        Some(path) => ForgeConfig::from_path(path)?,
        None => ForgeConfig::default(),
    };
    if let Some(name) = &cli.name {
        config = config.with_name(name.clone());
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Infer { files, tables, out } => handle_infer(
            &InferArgs {
                files,
                tables,
                output: out,
                format: cli.output,
            },
            &config,
        )?,
        Commands::Validate { schema } => handle_validate(&schema, cli.output, &config)?,
        Commands::Order { schema } => handle_order(&schema, cli.output)?,
        Commands::Emit {
            schema,
            target,
            out_dir,
            force,
        } => handle_emit(
            &EmitArgs {
                schema,
                targets: target,
                out_dir,
                force,
            },
            &config,
        )?,
        Commands::Run {
            files,
            suggestion,
            out_dir,
            report,
        } => {
            handle_run(
                &RunArgs {
                    files,
                    suggestion,
                    out_dir,
                    report,
                    format: cli.output,
                },
                config,
            )
            .await?
        }
    }

    Ok(())
}
