//! [`Command`]s of the interactive terminal client.

use std::str::FromStr;

use derive_more::{Display, Error};
use service::domain::user;

use crate::directory::Tab;

/// Command entered by the user.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    /// Sets the search term.
    Query(String),

    /// Sets the nationality filter.
    Nationality(String),

    /// Switches the active [`Tab`].
    Tab(Tab),

    /// Moves to the next page.
    Next,

    /// Moves to the previous page.
    Previous,

    /// Toggles a favorite.
    Favorite(Target),

    /// Clears all the filters.
    Clear,

    /// Re-issues the latest search.
    Retry,

    /// Renders the directory again.
    Show,

    /// Quits the client.
    Quit,
}

/// User a [`Command::Favorite`] is applied to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Target {
    /// Position of the user among the visible ones, starting from `1`.
    Position(usize),

    /// ID of the user.
    Id(user::Id),
}

/// Error of parsing a [`Command`].
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
pub enum ParseError {
    /// Command is not known.
    #[display("unknown command `{_0}`")]
    Unknown(#[error(not(source))] String),

    /// Command argument is missing or malformed.
    #[display("invalid argument of `{_0}`")]
    InvalidArgument(#[error(not(source))] &'static str),
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, arg) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(n, a)| (n, a.trim()));

        Ok(match name {
            "q" => Self::Query(arg.to_owned()),
            "n" => Self::Nationality(arg.to_owned()),
            "tab" => Self::Tab(
                arg.parse().map_err(|_| ParseError::InvalidArgument("tab"))?,
            ),
            "next" => Self::Next,
            "prev" => Self::Previous,
            "fav" => Self::Favorite(
                arg.parse::<usize>()
                    .map(Target::Position)
                    .or_else(|_| arg.parse().map(Target::Id))
                    .map_err(|_| ParseError::InvalidArgument("fav"))?,
            ),
            "clear" => Self::Clear,
            "retry" => Self::Retry,
            "show" | "" => Self::Show,
            "quit" | "exit" => Self::Quit,
            other => return Err(ParseError::Unknown(other.to_owned())),
        })
    }
}
