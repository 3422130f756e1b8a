pub mod core;
pub mod providers;
pub mod store;

pub mod cli {
    pub mod rank;
    pub mod setup;
    pub mod ui;
}

use anyhow::Result;
use tracing::{debug, info};

/// Commands the application can execute once configuration is loaded.
pub enum AppCommand {
    Rank {
        category: Option<String>,
        refresh: bool,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fundrank starting...");

    let config = match config_path {
        Some(path) => core::config::AppConfig::load_from_path(path)?,
        None => core::config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Rank { category, refresh } => {
            cli::rank::run(&config, category.as_deref(), refresh).await
        }
    }
}
