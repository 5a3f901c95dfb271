//! Info notice CLI commands.

use std::sync::Arc;

use bikemap::config::ConfigFile;
use bikemap::notice::{FlagStore, IniFlagStore, InfoNotice, INFO_MESSAGE_KEY, NOTICE_MESSAGE};
use chrono::{Local, TimeZone};
use clap::Subcommand;

use crate::error::CliError;

/// Notice subcommands.
#[derive(Debug, Subcommand)]
pub enum NoticeAction {
    /// Show whether the info notice has been dismissed
    Status,
    /// Forget the dismissal so the notice shows again
    Reset,
    /// Mark the notice as dismissed
    Dismiss,
}

/// Run a notice subcommand.
pub fn run(action: NoticeAction) -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let store: Arc<dyn FlagStore> = Arc::new(IniFlagStore::new(&config.notice.flag_file));
    let notice = InfoNotice::new(Some(store));

    match action {
        NoticeAction::Status => {
            println!("Flag file: {}", config.notice.flag_file.display());
            match notice.dismissed_at() {
                Some(millis) => println!("Dismissed: {}", format_millis(millis)),
                None => {
                    println!("Not dismissed. Shown on the next run:");
                    println!("  {}", NOTICE_MESSAGE);
                }
            }
        }
        NoticeAction::Reset => {
            notice.reset()?;
            println!("Cleared '{}'", INFO_MESSAGE_KEY);
        }
        NoticeAction::Dismiss => match notice.dismiss() {
            Some(millis) => println!("Dismissed at {}", format_millis(millis)),
            None => {
                return Err(CliError::Config(format!(
                    "Could not write {}",
                    config.notice.flag_file.display()
                )))
            }
        },
    }

    Ok(())
}

fn format_millis(millis: i64) -> String {
    match Local.timestamp_millis_opt(millis).single() {
        Some(time) => time.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => format!("{} ms", millis),
    }
}
