//! [`Nationality`] definitions.

use std::{convert::Infallible, str::FromStr};

use derive_more::{AsRef, Display, From};
use serde::{Deserialize, Serialize};

#[cfg(doc)]
use super::User;

/// Two-letter nationality code of a [`User`], as supplied by the upstream.
///
/// Codes are compared case-insensitively, but kept in their original case.
#[derive(
    AsRef,
    Clone,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[as_ref(str, String)]
#[from(&str, String)]
#[serde(transparent)]
pub struct Nationality(String);

impl Nationality {
    /// Checks whether this [`Nationality`] passes the provided [`Filter`].
    #[must_use]
    pub fn matches(&self, filter: &Filter) -> bool {
        match filter {
            Filter::All => true,
            Filter::Only(code) => self.0.to_uppercase() == *code,
        }
    }
}

/// Filter of [`User`]s by their [`Nationality`].
#[derive(Clone, Debug, Default, Display, Eq, Hash, PartialEq)]
pub enum Filter {
    /// No filtering at all.
    #[default]
    #[display("ALL")]
    All,

    /// Only the uppercased [`Nationality`] code.
    #[display("{_0}")]
    Only(String),
}

impl Filter {
    /// Sentinel value meaning "no filter".
    pub const ALL: &'static str = "ALL";

    /// Parses a [`Filter`] out of the provided `code`, uppercasing it.
    ///
    /// Both the [`Filter::ALL`] sentinel (in any case) and an empty string
    /// mean no filter.
    #[must_use]
    pub fn new(code: impl AsRef<str>) -> Self {
        let code = code.as_ref().trim().to_uppercase();
        if code.is_empty() || code == Self::ALL {
            Self::All
        } else {
            Self::Only(code)
        }
    }
}

impl FromStr for Filter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}
