use anyhow::Context;
use clap::{Parser, Subcommand};

mod cli;

#[derive(Parser)]
#[command(name = "ormgraph")]
#[command(version = "0.1.0")]
#[command(about = "Derive a GraphQL API from an ORM model", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an example model configuration
    Init {
        /// Output config file path (if not specified, outputs to stdout)
        #[arg(long)]
        output: Option<String>,
    },

    /// Start GraphQL server backed by the in-memory store
    Serve {
        /// Config file path
        #[arg(long, default_value = "ormgraph.toml")]
        config: String,

        /// Server port (overrides the configured port)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print the generated SDL
    PrintSchema {
        /// Config file path
        #[arg(long, default_value = "ormgraph.toml")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; logs go to stderr so printed SDL/TOML stays clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { output } => {
            cli::init::run(output).await.context("init failed")?;
        }
        Commands::Serve { config, port } => {
            cli::serve::run(config, port)
                .await
                .with_context(|| "serve failed".to_string())?;
        }
        Commands::PrintSchema { config } => {
            cli::print::run(config).context("print-schema failed")?;
        }
    }

    Ok(())
}
