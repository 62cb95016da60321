mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use lease_economics_core::schedule::{PaymentTiming, RoundingPolicy, ScheduleOptions};

use commands::amortize::AmortizeArgs;
use commands::analyze::{AnalyzeArgs, NormalizeArgs};
use commands::scenarios::{ScenarioArgs, SensitivityArgs};
use commands::schedule::{AnnualArgs, ScheduleArgs};

/// Commercial lease economics
#[derive(Parser)]
#[command(
    name = "lea",
    version,
    about = "Commercial lease economics",
    long_about = "A CLI for analyzing commercial lease deals with decimal precision. \
                  Builds monthly and annual rent schedules, amortizes financed costs, \
                  computes NPV, IRR, payback and effective rent, and runs scenarios."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// When rent is paid within each month
    #[arg(long, default_value = "advance", global = true)]
    timing: Timing,

    /// Round every monthly figure to cents
    #[arg(long, global = true)]
    round_cents: bool,

    /// Log pipeline stages to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: schedules, amortization and metrics
    Analyze(AnalyzeArgs),
    /// Resolve dates, escalation and abatement and report input issues
    Normalize(NormalizeArgs),
    /// Monthly rent schedule with every charge layered on
    Schedule(ScheduleArgs),
    /// Annual roll-up of the monthly schedule
    Annual(AnnualArgs),
    /// Amortization schedule for a principal amount
    Amortize(AmortizeArgs),
    /// Probability-weighted scenarios, or a base vs. variant comparison
    Scenario(ScenarioArgs),
    /// Two-way sensitivity of a lease metric over two deal fields
    Sensitivity(SensitivityArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Timing {
    Advance,
    Arrears,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = ScheduleOptions {
        payment_timing: match cli.timing {
            Timing::Advance => PaymentTiming::Advance,
            Timing::Arrears => PaymentTiming::Arrears,
        },
        rounding: if cli.round_cents {
            RoundingPolicy::Cent
        } else {
            RoundingPolicy::None
        },
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Analyze(args) => commands::analyze::run_analyze(args, &options),
        Commands::Normalize(args) => commands::analyze::run_normalize(args),
        Commands::Schedule(args) => commands::schedule::run_schedule(args, &options),
        Commands::Annual(args) => commands::schedule::run_annual(args, &options),
        Commands::Amortize(args) => commands::amortize::run_amortize(args),
        Commands::Scenario(args) => commands::scenarios::run_scenario(args, &options),
        Commands::Sensitivity(args) => commands::scenarios::run_sensitivity(args, &options),
        Commands::Version => {
            println!("lea {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
