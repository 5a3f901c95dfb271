//! Terminal rendering of the info notice.

use bikemap::notice::NoticePresenter;
use console::style;

/// Input that acknowledges the notice during a `run` session.
pub const ACKNOWLEDGE_INPUT: &str = "cool";

/// Prints the notice as a highlighted block.
pub struct TerminalNoticePresenter;

impl NoticePresenter for TerminalNoticePresenter {
    fn present(&self, message: &str, action: &str) {
        println!();
        println!("{} {}", style("ℹ").cyan().bold(), message);
        println!(
            "  {} type '{}' and press Enter",
            style(format!("[{}]", action)).green().bold(),
            ACKNOWLEDGE_INPUT
        );
        println!();
    }
}

/// Whether a line of user input acknowledges the notice.
pub fn is_acknowledgement(line: &str) -> bool {
    let line = line.trim().trim_end_matches('!');
    line.eq_ignore_ascii_case(ACKNOWLEDGE_INPUT) || line.eq_ignore_ascii_case("ok")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acknowledgement_input() {
        assert!(is_acknowledgement("cool"));
        assert!(is_acknowledgement("Cool!\n"));
        assert!(is_acknowledgement(" OK "));
        assert!(!is_acknowledgement(""));
        assert!(!is_acknowledgement("refresh"));
    }
}
