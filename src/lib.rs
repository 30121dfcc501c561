pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::cli::detail::StockDetailView;
use crate::core::config::AppConfig;
use crate::core::stock::{Period, StockCode};
use crate::providers::HttpTransport;
use crate::store::StockStore;
use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    Show { code: String, period: Option<Period> },
    Evaluate { code: String, period: Option<Period> },
    Evaluation { id: u64 },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("stockview starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let output = render_command(command, &config).await?;
    println!("{output}");
    Ok(())
}

/// Runs one command against the configured API and returns the rendered page.
/// Failed fetches are rendered as error banners rather than returned as errors.
pub async fn render_command(command: AppCommand, config: &AppConfig) -> Result<String> {
    let transport = HttpTransport::new(&config.api.base_url)?;
    let store = StockStore::from_transport(transport, config.store.settlement);

    let output = match command {
        AppCommand::Show { code, period } => {
            let view = StockDetailView::new(
                store,
                StockCode::new(&code)?,
                period.unwrap_or(config.default_period),
            );
            cli::detail::run_show(view).await
        }
        AppCommand::Evaluate { code, period } => {
            let view = StockDetailView::new(
                store,
                StockCode::new(&code)?,
                period.unwrap_or(config.default_period),
            );
            cli::detail::run_evaluate(view).await
        }
        AppCommand::Evaluation { id } => cli::evaluation::run_by_id(&store, id).await,
    };
    Ok(output)
}
