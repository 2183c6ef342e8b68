use clap::{Args, Parser, Subcommand, ValueEnum};
use slot_scheduler::data::{EngineKind, SchedulingInput, Strategy};
use slot_scheduler::loader::{load_preferences, load_slot_catalog};
use slot_scheduler::server;
use slot_scheduler::solver::{self, SolverConfig};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "slot_scheduler",
    about = "Assigns applicants to day/batch slots, earliest submissions first",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(flatten)]
    solver: SolverArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SolverArgs {
    /// Which procedure produces the schedule
    #[arg(long, global = true, env = "SCHEDULE_STRATEGY", value_enum, default_value_t = StrategyArg::Greedy)]
    strategy: StrategyArg,

    /// Matching engine used by the optimal strategy
    #[arg(long, global = true, env = "SCHEDULE_ENGINE", value_enum, default_value_t = EngineArg::Highs)]
    engine: EngineArg,

    /// Seconds the matching engine may spend; 0 disables the limit
    #[arg(long, global = true, env = "SCHEDULE_TIME_LIMIT_SECS", default_value_t = 10)]
    time_limit_secs: u64,
}

impl SolverArgs {
    fn into_config(self) -> SolverConfig {
        SolverConfig {
            strategy: self.strategy.into(),
            engine: self.engine.into(),
            time_limit: (self.time_limit_secs > 0).then(|| Duration::from_secs(self.time_limit_secs)),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Greedy,
    Optimal,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Greedy => Strategy::Greedy,
            StrategyArg::Optimal => Strategy::Optimal,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum EngineArg {
    Highs,
    Augmenting,
}

impl From<EngineArg> for EngineKind {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::Highs => EngineKind::Highs,
            EngineArg::Augmenting => EngineKind::Augmenting,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        #[arg(long, env = "SCHEDULE_ADDR", default_value = "127.0.0.1:8080")]
        addr: String,
    },
    /// Schedule from a slot catalog file and a preferences file
    Solve {
        #[arg(long, default_value = "slot.json")]
        slots: PathBuf,
        #[arg(long, default_value = "preferences.json")]
        preferences: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.solver.into_config();

    match cli.command {
        Commands::Serve { addr } => server::run_server(&addr, config).await?,
        Commands::Solve {
            slots,
            preferences,
            format,
        } => {
            let input = SchedulingInput {
                slots: load_slot_catalog(&slots)?,
                preferences: load_preferences(&preferences)?,
                strategy: None,
            };
            let output = solver::solve(&input, &config)?;
            match format {
                OutputFormat::Text => println!("{output}"),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&output)?),
            }
        }
    }

    Ok(())
}
