//! Commands typed into the dashboard prompt.
//!
//! ```text
//! add AAPL | + AAPL | AAPL    track a ticker
//! rm AAPL  | remove AAPL      stop tracking a ticker
//! list                        redraw the dashboard
//! login alice | logout        report a session change
//! help | quit
//! ```
use std::str::FromStr;

use strum_macros::EnumString;

/// Parsed prompt line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Track the given raw input.
    Add(String),
    /// Stop tracking the given raw input.
    Remove(String),
    /// Redraw.
    Show,
    /// The provider resolved a session for this user.
    SignIn(String),
    /// The provider resolved to guest mode.
    SignOut,
    /// Print usage.
    Help,
    /// Leave the dashboard.
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(ascii_case_insensitive)]
enum Verb {
    #[strum(serialize = "add", serialize = "+")]
    Add,
    #[strum(serialize = "rm", serialize = "remove", serialize = "del", serialize = "-")]
    Remove,
    #[strum(serialize = "list", serialize = "ls")]
    Show,
    #[strum(serialize = "login")]
    SignIn,
    #[strum(serialize = "logout")]
    SignOut,
    #[strum(serialize = "help", serialize = "?")]
    Help,
    #[strum(serialize = "quit", serialize = "exit", serialize = "q")]
    Quit,
}

/// Usage text shown by `help`.
pub const USAGE: &str =
    "commands: add <TICKER> | rm <TICKER> | list | login <USER> | logout | quit";

impl Intent {
    /// Parses one prompt line. Blank lines and incomplete `login` yield `None`.
    pub fn parse(line: &str) -> Option<Intent> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };

        let Ok(verb) = Verb::from_str(head) else {
            // A bare symbol is an add.
            return Some(Intent::Add(line.to_string()));
        };
        let intent = match verb {
            Verb::Add => Intent::Add(rest.to_string()),
            Verb::Remove => Intent::Remove(rest.to_string()),
            Verb::Show => Intent::Show,
            Verb::SignIn if rest.is_empty() => return None,
            Verb::SignIn => Intent::SignIn(rest.to_string()),
            Verb::SignOut => Intent::SignOut,
            Verb::Help => Intent::Help,
            Verb::Quit => Intent::Quit,
        };
        Some(intent)
    }
}
