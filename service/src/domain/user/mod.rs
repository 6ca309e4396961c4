//! [`User`] definitions.

pub mod nationality;

use derive_more::{AsRef, Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use self::nationality::Nationality;

/// Profile of a directory user.
///
/// Wire and in-memory representations are identical.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct User {
    /// ID of this [`User`].
    pub id: Id,

    /// [`Email`] of this [`User`].
    pub email: Email,

    /// [`Name`] of this [`User`].
    pub name: Name,

    /// [`Picture`] of this [`User`].
    pub picture: Picture,

    /// [`Nationality`] of this [`User`].
    pub nationality: Nationality,
}

/// ID of a [`User`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[serde(transparent)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Email address of a [`User`].
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, From, PartialEq, Serialize,
)]
#[as_ref(str, String)]
#[from(&str, String)]
#[serde(transparent)]
pub struct Email(String);

/// Structured name of a [`User`].
#[derive(Clone, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[display("{full}")]
pub struct Name {
    /// First name.
    pub first: String,

    /// Last name.
    pub last: String,

    /// Full name, derived from the first and the last ones.
    pub full: String,
}

impl Name {
    /// Creates a new [`Name`] deriving its full form.
    #[must_use]
    pub fn new(first: impl Into<String>, last: impl Into<String>) -> Self {
        let (first, last) = (first.into(), last.into());
        Self {
            full: format!("{first} {last}"),
            first,
            last,
        }
    }

    /// Checks whether the full form of this [`Name`] contains the provided
    /// `needle`, ignoring case.
    ///
    /// The `needle` is expected to be lowercased already.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        needle.is_empty() || self.full.to_lowercase().contains(needle)
    }
}

/// Avatar pictures of a [`User`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Picture {
    /// URL of the large avatar image.
    pub large: String,
}
