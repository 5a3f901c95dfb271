//! Configuration management CLI commands.
//!
//! Provides `config get`, `config set`, `config list`, and `config path` commands
//! for viewing and modifying configuration settings from the command line.

use bikemap::config::{config_file_path, ConfigFile, ConfigKey};
use clap::Subcommand;
use console::style;

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Configuration key in format section.key (e.g., feed.url)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key in format section.key (e.g., position.latitude)
        key: String,

        /// Value to set (empty clears optional keys)
        value: String,
    },

    /// List all configuration settings
    List,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => run_get(&key),
        ConfigCommands::Set { key, value } => run_set(&key, &value),
        ConfigCommands::List => run_list(),
        ConfigCommands::Path => run_path(),
    }
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown configuration key '{}'. Use 'bikemap config list' to see available keys.",
            key
        ))
    })
}

/// Get a configuration value.
fn run_get(key: &str) -> Result<(), CliError> {
    let config_key = parse_key(key)?;
    let config = ConfigFile::load()?;

    println!("{}", display_value(&config_key.get(&config)));
    if let Some(note) = override_note(config_key, rust_log_set()) {
        eprintln!("{}", style(note).dim());
    }

    Ok(())
}

/// Set a configuration value.
fn run_set(key: &str, value: &str) -> Result<(), CliError> {
    let config_key = parse_key(key)?;

    let mut config = ConfigFile::load()?;
    config_key.set(&mut config, value)?;
    config.save()?;

    println!("Set {} = {}", config_key.name(), config_key.get(&config));

    Ok(())
}

/// List all configuration settings.
///
/// Values that differ from the built-in defaults are marked with `*`.
fn run_list() -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let defaults = ConfigFile::default();
    let rust_log = rust_log_set();

    println!("BikeMap configuration ({})", config_file_path().display());

    let mut section = None;
    for &key in ConfigKey::all() {
        if section != Some(key.section()) {
            section = Some(key.section());
            println!();
            println!("{}", style(format!("[{}]", key.section())).bold());
        }

        let value = key.get(&config);
        let marker = if value == key.get(&defaults) { ' ' } else { '*' };
        let line = format!("{} {} = {}", marker, key.key_name(), display_value(&value));
        match override_note(key, rust_log) {
            Some(note) => println!("{}  {}", line, style(format!("({})", note)).dim()),
            None => println!("{}", line),
        }
    }

    Ok(())
}

fn display_value(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}

fn rust_log_set() -> bool {
    std::env::var_os("RUST_LOG").is_some_and(|v| !v.is_empty())
}

/// Which runtime input takes precedence over the stored value, if any.
fn override_note(key: ConfigKey, rust_log: bool) -> Option<&'static str> {
    match key {
        ConfigKey::LoggingLevel if rust_log => Some("overridden by RUST_LOG"),
        ConfigKey::LoggingLevel => Some("--log-level or RUST_LOG take precedence"),
        ConfigKey::FeedUrl => Some("--feed-url takes precedence"),
        ConfigKey::PositionLatitude | ConfigKey::PositionLongitude => {
            Some("--latitude/--longitude take precedence")
        }
        ConfigKey::ReportingProduction => Some("--production forces true"),
        _ => None,
    }
}

/// Show the configuration file path.
fn run_path() -> Result<(), CliError> {
    println!("{}", config_file_path().display());
    Ok(())
}
