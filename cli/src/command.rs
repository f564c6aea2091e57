//! Parsing of stdin command lines.

use std::str::FromStr;

use herald_core::NotificationId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Success(String),
    Fail(String),
    Dismiss(NotificationId),
    Clear,
    List,
    Stats,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}' (try ok, fail, dismiss, clear, list, stats, quit)")]
    Unknown(String),
    #[error("'{0}' needs a title")]
    MissingTitle(&'static str),
    #[error("'{0}' is not a notification id")]
    BadId(String),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if line.is_empty() {
            return Err(CommandError::Empty);
        }
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let title = |name: &'static str| {
            if rest.is_empty() {
                Err(CommandError::MissingTitle(name))
            } else {
                Ok(rest.to_string())
            }
        };

        match verb.to_ascii_lowercase().as_str() {
            "ok" | "success" => title("ok").map(Command::Success),
            "fail" | "error" => title("fail").map(Command::Fail),
            "dismiss" | "rm" => rest
                .parse()
                .map(Command::Dismiss)
                .map_err(|_| CommandError::BadId(rest.to_string())),
            "clear" => Ok(Command::Clear),
            "list" | "ls" => Ok(Command::List),
            "stats" => Ok(Command::Stats),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}
