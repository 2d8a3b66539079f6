pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use petrate_core::config::{AppConfig, LoadOptions, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "petrate",
    about = "Pet-book rating engine operator CLI",
    long_about = "Refresh the rate card, re-rate the historical policy book, and inspect \
                  rates, all against the configured SQLite store.",
    after_help = "Examples:\n  petrate migrate\n  petrate refresh-rates --dir rate_card/\n  petrate rerate --copay no --month 2025-07"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the deterministic demo book and rate card")]
    Seed,
    #[command(
        name = "refresh-rates",
        about = "Parse a rate-card directory (one CSV per sheet) and atomically replace the rate table"
    )]
    RefreshRates {
        #[arg(long, help = "Directory holding one <sheet>.csv per rate-card sheet")]
        dir: PathBuf,
    },
    #[command(about = "Re-rate the policy book and print the monthly actual-vs-re-rated summary")]
    Rerate {
        #[arg(long, default_value = "*", help = "Filter by co-pay option (yes|no|*)")]
        copay: String,
        #[arg(long, help = "Filter to one inception month (YYYY-MM)")]
        month: Option<String>,
        #[arg(long, help = "Keep rows where any factor hit the decline sentinel")]
        include_declines: bool,
        #[arg(long, help = "Include the per-pet rated rows in the report")]
        full: bool,
    },
    #[command(about = "Show the stored entries and display-ordered options for one factor")]
    Rates {
        #[arg(long, help = "Factor name, e.g. base_rate, pet_age, dog_breed")]
        factor: String,
    },
    #[command(about = "Resolve base rate, limit and age factors for one quote")]
    Calc {
        #[arg(long, help = "dog or cat")]
        pet_type: String,
        #[arg(long, help = "Cover level, e.g. Silver")]
        scheme: String,
        #[arg(long)]
        gender: String,
        #[arg(long, help = "Coarse age bucket label (1–50, 51–100, 101+)")]
        coarse_age: String,
        #[arg(long, help = "Monthly age band label, e.g. 12 or 24–28")]
        age_band: String,
    },
    #[command(about = "Inspect effective configuration values")]
    Config,
}

fn init_logging() {
    let Ok(config) = AppConfig::load(LoadOptions::default()) else {
        return;
    };

    let level = config.logging.level.parse::<tracing::Level>().unwrap_or(tracing::Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr);
    let _ = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::RefreshRates { dir } => commands::refresh::run(&dir),
        Command::Rerate { copay, month, include_declines, full } => {
            commands::rerate::run(&copay, month.as_deref(), include_declines, full)
        }
        Command::Rates { factor } => commands::rates::run(&factor),
        Command::Calc { pet_type, scheme, gender, coarse_age, age_band } => {
            commands::calc::run(&pet_type, &scheme, &gender, &coarse_age, &age_band)
        }
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
