use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use stockview::core::log::init_logging;
use stockview::core::stock::Period;

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

impl From<Commands> for stockview::AppCommand {
    fn from(cmd: Commands) -> stockview::AppCommand {
        match cmd {
            Commands::Show { code, period } => stockview::AppCommand::Show { code, period },
            Commands::Evaluate { code, period } => {
                stockview::AppCommand::Evaluate { code, period }
            }
            Commands::Evaluation { id } => stockview::AppCommand::Evaluation { id },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display stock profile and price history
    Show {
        /// Stock code, e.g. 7203
        code: String,
        /// Price period: 1d, 1w, 1m, 3m, 6m or 1y
        #[arg(short, long)]
        period: Option<Period>,
    },
    /// Run a buy/sell evaluation for a stock
    Evaluate {
        /// Stock code, e.g. 7203
        code: String,
        /// Period the evaluation is based on
        #[arg(short, long)]
        period: Option<Period>,
    },
    /// Display a stored evaluation by its id
    Evaluation {
        id: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => stockview::cli::setup::setup(),
        Some(cmd) => stockview::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
