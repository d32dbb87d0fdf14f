use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use divtrack::core::log::init_logging;
use divtrack::{AppCommand, WeightOverrides};

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

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display dividend history with normalized rates
    Dividends {
        /// Symbol to report on
        symbol: String,
        /// Up to 5 symbols to compare against
        #[arg(long, value_delimiter = ',')]
        compare: Vec<String>,
        /// Time range: 1W, 1M, 3M, 6M, 1Y, 3Y, 5Y, 10Y, 20Y or ALL
        #[arg(short, long)]
        range: Option<String>,
        /// Override payments per year used for normalization
        #[arg(long)]
        payments_per_year: Option<u32>,
    },
    /// Display dividend totals per calendar year
    Yearly {
        /// Symbol to report on
        symbol: String,
    },
    /// Rank instruments by weighted yield, volatility and total return
    Rank {
        /// Yield weight (percent)
        #[arg(long = "yield")]
        yield_weight: Option<u32>,
        /// Volatility weight (percent)
        #[arg(long)]
        volatility: Option<u32>,
        /// Total return weight (percent)
        #[arg(long)]
        total_return: Option<u32>,
        /// Total return timeframe: 3mo, 6mo or 12mo
        #[arg(long)]
        timeframe: Option<String>,
    },
}

impl TryFrom<Commands> for AppCommand {
    type Error = anyhow::Error;

    fn try_from(cmd: Commands) -> Result<AppCommand> {
        Ok(match cmd {
            Commands::Dividends {
                symbol,
                compare,
                range,
                payments_per_year,
            } => AppCommand::Dividends {
                symbol,
                compare,
                range: range.map(|r| r.parse()).transpose()?,
                payments_per_year,
            },
            Commands::Yearly { symbol } => AppCommand::Yearly { symbol },
            Commands::Rank {
                yield_weight,
                volatility,
                total_return,
                timeframe,
            } => AppCommand::Rank(WeightOverrides {
                yield_weight,
                volatility,
                total_return,
                timeframe: timeframe.map(|t| t.parse()).transpose()?,
            }),
            Commands::Setup => anyhow::bail!("Setup command should be handled separately"),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => divtrack::cli::setup::setup_at_path(path),
            None => divtrack::cli::setup::setup(),
        },
        Some(cmd) => match AppCommand::try_from(cmd) {
            Ok(command) => divtrack::run_command(command, cli.config_path.as_deref()).await,
            Err(e) => Err(e),
        },
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
