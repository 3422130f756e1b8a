use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fundrank::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fundrank::AppCommand {
    fn from(cmd: Commands) -> fundrank::AppCommand {
        match cmd {
            Commands::Rank { category, refresh } => {
                fundrank::AppCommand::Rank { category, refresh }
            }
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Rank funds in the configured categories
    Rank {
        /// Only rank the named category
        #[arg(long)]
        category: Option<String>,

        /// Drop cached provider data and fetch fresh
        #[arg(long)]
        refresh: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => fundrank::cli::setup::setup_at_path(path),
            None => fundrank::cli::setup::setup(),
        },
        Some(cmd) => fundrank::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
