use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
use commands::{estimate::EstimateArgs, resolve::ResolveArgs, weights::WeightsArgs};

#[derive(Parser)]
#[command(name = "solaudit")]
#[command(about = "Estimate manual security audit time for Solidity contracts")]
#[command(version)]
#[command(author = "Tameshi Team")]
struct Cli {
    /// Log pipeline stages to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a contract and print its audit-time breakdown
    Estimate(EstimateArgs),

    /// Print the compiler build a contract's pragma resolves to
    Resolve(ResolveArgs),

    /// Print the effective weight table, optionally with an overlay applied
    Weights(WeightsArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Estimate(args) => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(commands::estimate::execute(args))
        }
        Commands::Resolve(args) => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(commands::resolve::execute(args))
        }
        Commands::Weights(args) => commands::weights::execute(args),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "warn,solaudit_estimator=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
