use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use mfcompare::cli::compare::CompareOptions;
use mfcompare::core::Lookback;
use mfcompare::core::log::init_logging;
use mfcompare::core::resolver::DEFAULT_GUEST_LABEL;

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

impl From<Commands> for mfcompare::AppCommand {
    fn from(cmd: Commands) -> mfcompare::AppCommand {
        match cmd {
            Commands::List { group, search } => mfcompare::AppCommand::List { group, search },
            Commands::Compare {
                identifiers,
                guest,
                guest_label,
                lookback,
                json,
            } => mfcompare::AppCommand::Compare(CompareOptions {
                identifiers,
                guest,
                guest_label,
                lookback,
                json,
            }),
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// List registry funds by fund house
    List {
        /// Only show one fund house group, e.g. HDFC
        #[arg(short, long)]
        group: Option<String>,
        /// Only show funds whose name contains every search term
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Compare rebased NAV performance of registry funds
    Compare {
        /// Registry identifiers (ISINs) to compare
        identifiers: Vec<String>,
        /// Extra fund to overlay: a registry identifier or a raw scheme code
        #[arg(long)]
        guest: Option<String>,
        /// Display label for the guest fund
        #[arg(long, default_value = DEFAULT_GUEST_LABEL)]
        guest_label: String,
        /// Lookback window: 3M, 6M, 1Y, 2Y, 3Y, 5Y or Max
        #[arg(short, long)]
        lookback: Option<Lookback>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => mfcompare::cli::setup::setup(),
        Some(cmd) => mfcompare::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
