mod commands;
mod input;
mod output;
mod seeding;
mod terminal;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use env_logger::Env;
use std::path::PathBuf;
use std::process;

use loan_calc_core::calculator::Calculator;
use loan_calc_core::history::FileStore;
use loan_calc_core::LoanCalcError;

use commands::calculate::CalculateArgs;
use commands::history::HistoryArgs;
use commands::reset::ResetArgs;
use seeding::PendingSeed;
use terminal::{TerminalChart, TerminalNotifier};

/// Fixed-rate loan calculator with persistent history
#[derive(Parser)]
#[command(
    name = "loancalc",
    version,
    about = "Fixed-rate loan calculator with persistent history",
    long_about = "Computes the level monthly payment and balance run-off of a fixed-rate \
                  loan with decimal precision, and keeps a local history of past \
                  calculations."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Directory holding the persisted history
    #[arg(long, env = "LOANCALC_STORE_DIR", default_value = ".loancalc", global = true)]
    store_dir: PathBuf,

    /// JSON file of the form {"loans": [...]} used to seed the history at startup
    #[arg(long, global = true)]
    seed: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate the monthly payment and balance run-off of a loan
    Calculate(CalculateArgs),
    /// Show past calculations, three per page
    History(HistoryArgs),
    /// Clear the chart and the whole history
    Reset(ResetArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("warn")
    };
    env_logger::init_from_env(env);

    if let Commands::Version = cli.command {
        println!("loancalc {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let storage = match FileStore::open(&cli.store_dir) {
        Ok(storage) => storage,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };
    let mut calc = Calculator::new(storage);
    let mut notifier = TerminalNotifier;
    let mut chart = TerminalChart::new(cli.output == OutputFormat::Table);

    // One command per process: the seed always lands before it runs.
    if let Some(path) = cli.seed.clone() {
        PendingSeed::spawn(path, calc.begin_seed()).resolve(&mut calc);
    }

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Calculate(args) => {
            commands::calculate::run_calculate(args, &mut calc, &mut notifier, &mut chart)
        }
        Commands::History(args) => commands::history::run_history(args, &mut calc),
        Commands::Reset(args) => {
            commands::reset::run_reset(args, &mut calc, &mut notifier, &mut chart)
        }
        Commands::Version => unreachable!("handled before the store is opened"),
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            // Rejected form input was already shown by the notifier.
            let notified = e
                .downcast_ref::<LoanCalcError>()
                .is_some_and(LoanCalcError::is_user_input);
            if !notified {
                eprintln!("{}: {}", "error".red().bold(), e);
            }
            process::exit(1);
        }
    }
}
