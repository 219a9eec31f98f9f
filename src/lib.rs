pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::NavSeries;
use crate::core::config::AppConfig;
use crate::providers::{HistoryFetcher, MfapiProvider};
use crate::store::MemoryCache;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    List {
        group: Option<String>,
        search: Option<String>,
    },
    Compare(cli::compare::CompareOptions),
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("mfcompare starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::List { group, search } => {
            cli::list::run(&config, group.as_deref(), search.as_deref())
        }
        AppCommand::Compare(options) => cli::compare::run(&options, &config).await,
    }
}

/// Builds the cached NAV history source described by `config`.
pub fn build_history_fetcher(config: &AppConfig) -> Result<HistoryFetcher> {
    let provider = MfapiProvider::from_config(&config.mfapi())?;
    Ok(HistoryFetcher::new(
        Arc::new(provider),
        Arc::new(MemoryCache::<String, Arc<NavSeries>>::new()),
        config.cache.ttl(),
        config.cache.failure_ttl(),
    ))
}
