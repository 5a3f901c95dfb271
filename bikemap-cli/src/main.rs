//! BikeMap CLI - Command-line interface
//!
//! This binary runs BikeMap sessions against a terminal map surface and
//! manages the configuration file and notice flag.

mod commands;
mod error;
mod presenter;
mod runner;
mod surface;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::notice::NoticeAction;
use commands::run::RunArgs;
use commands::stations::StationsArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "bikemap", version, about = "Live bike-share availability on a city map")]
struct Cli {
    /// Log filter (e.g. debug, bikemap=trace); overrides config.ini
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Open a map session that follows stations and position
    Run {
        /// Station endpoint URL
        #[arg(long)]
        feed_url: Option<String>,

        /// Fixed latitude used as the device position
        #[arg(long, allow_negative_numbers = true)]
        latitude: Option<f64>,

        /// Fixed longitude used as the device position
        #[arg(long, allow_negative_numbers = true)]
        longitude: Option<f64>,

        /// Simulate a window refocus every N seconds
        #[arg(long, value_name = "SECS")]
        refocus_every: Option<u64>,

        /// Forward reported errors to the report file
        #[arg(long)]
        production: bool,
    },

    /// Fetch stations once and print them
    Stations {
        /// Station endpoint URL
        #[arg(long)]
        feed_url: Option<String>,

        /// Only list stations with bikes
        #[arg(long)]
        available_only: bool,
    },

    /// View or change configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Inspect or reset the info notice
    Notice {
        #[command(subcommand)]
        action: NoticeAction,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = dispatch(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn dispatch(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Run {
            feed_url,
            latitude,
            longitude,
            refocus_every,
            production,
        } => commands::run::run(RunArgs {
            feed_url,
            latitude,
            longitude,
            refocus_every,
            production,
            log_level: cli.log_level,
        }),
        Commands::Stations {
            feed_url,
            available_only,
        } => commands::stations::run(StationsArgs {
            feed_url,
            available_only,
            log_level: cli.log_level,
        }),
        Commands::Config { command } => commands::config::run(command),
        Commands::Notice { action } => commands::notice::run(action),
    }
}
