//! Stations command - fetch the station list once and print it.

use std::sync::Arc;

use bikemap::render::partition_stations;
use bikemap::station::{ReqwestClient, Station, StationFeed};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use super::common::resolve_feed_url;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the stations command.
pub struct StationsArgs {
    pub feed_url: Option<String>,
    pub available_only: bool,
    pub log_level: Option<String>,
}

/// Run the stations command.
pub fn run(args: StationsArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(args.log_level.as_deref())?;
    runner.log_startup("stations");
    let config = runner.config();

    let url = resolve_feed_url(args.feed_url, config);
    let client = ReqwestClient::with_timeout(config.feed.timeout_secs)?;
    let feed = StationFeed::new(Arc::new(client), url.clone());

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Fetching {}", url));
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let result = runner.runtime().block_on(feed.refresh());
    spinner.finish_and_clear();
    let snapshot = result?;

    let (available, unavailable) = partition_stations(snapshot.stations());
    println!(
        "{} stations: {} with bikes, {} empty",
        snapshot.len(),
        style(available.len()).yellow().bold(),
        style(unavailable.len()).dim()
    );
    println!();

    let mut rows: Vec<&Station> = if args.available_only {
        available
    } else {
        snapshot.stations().iter().collect()
    };
    rows.sort_by(|a, b| {
        b.bikes_available
            .cmp(&a.bikes_available)
            .then_with(|| a.name.cmp(&b.name))
    });

    println!("{:<6} {:<32} {:>5} {:>6}", "ID", "NAME", "BIKES", "SPACES");
    for station in rows {
        let line = format_row(station);
        if station.has_bikes() {
            println!("{}", line);
        } else {
            println!("{}", style(line).dim());
        }
    }

    Ok(())
}

fn format_row(station: &Station) -> String {
    let name: String = station.name.chars().take(32).collect();
    format!(
        "{:<6} {:<32} {:>5} {:>6}",
        station.id, name, station.bikes_available, station.spaces_available
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_row_truncates_name() {
        let station = Station {
            id: "042".to_string(),
            name: "Kaivopuisto ja Merisatamanranta, Eteläranta".to_string(),
            state: "Station on".to_string(),
            bikes_available: 4,
            spaces_available: 11,
            allow_dropoff: true,
            is_floating_bike: false,
            real_time_data: true,
            networks: vec!["smoove".to_string()],
            x: 24.95,
            y: 60.15,
        };

        let row = format_row(&station);
        assert!(row.starts_with("042    Kaivopuisto"));
        assert!(row.ends_with("    4     11"));
        assert!(!row.contains("Eteläranta"));
    }
}
