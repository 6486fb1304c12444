pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use ratecard_core::config::{AppConfig, LoadOptions, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "ratecard",
    about = "Ratecard pricing engine CLI",
    long_about = "Run quote calculations, standalone previews, and tier inspections against a resolved pricing context.",
    after_help = "Examples:\n  ratecard price --context context.json --quote quote.json\n  ratecard preview --context context.json --items items.json --json\n  ratecard tiers --context context.json --entry vm-standard\n  ratecard config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Price a full quote: per-line results, package subtotals, quote totals")]
    Price {
        #[arg(long, help = "Path to the resolved pricing context (JSON)")]
        context: PathBuf,
        #[arg(long, help = "Path to the quote with its packages and line items (JSON)")]
        quote: PathBuf,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Price bare (entry, quantity, term, environment) tuples independently")]
    Preview {
        #[arg(long, help = "Path to the resolved pricing context (JSON)")]
        context: PathBuf,
        #[arg(long, help = "Path to the preview item list (JSON)")]
        items: PathBuf,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Show the quantity tiers implied by an entry's curve or ladder")]
    Tiers {
        #[arg(long, help = "Path to the resolved pricing context (JSON)")]
        context: PathBuf,
        #[arg(long, help = "Catalog entry id to inspect")]
        entry: String,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

fn init_logging(config: &AppConfig) {
    let level = config.logging.level.parse::<tracing::Level>().unwrap_or(tracing::Level::INFO);
    match config.logging.format {
        LogFormat::Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(level).compact().init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(level).pretty().init();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(level).json().init();
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            let result =
                commands::CommandResult::failure("config", "config_validation", error.to_string(), 2);
            println!("{}", result.output);
            return ExitCode::from(result.exit_code);
        }
    };
    init_logging(&config);

    let result = match cli.command {
        Command::Price { context, quote, json } => commands::price::run(&context, &quote, json),
        Command::Preview { context, items, json } => {
            commands::preview::run(&context, &items, json, config.pricing.cost_split_ratio)
        }
        Command::Tiers { context, entry } => commands::tiers::run(&context, &entry),
        Command::Config => commands::CommandResult { exit_code: 0, output: commands::config::run() },
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
