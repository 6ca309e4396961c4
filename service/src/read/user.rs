//! [`User`] read model definition.
//!
//! [`User`]: crate::domain::User

pub mod list {
    //! [`User`]s list definitions.

    use common::pagination;
    use serde::{Deserialize, Serialize};

    use crate::domain::{
        user::{nationality, Nationality},
        User,
    };

    /// A [`Page`] of [`User`]s.
    ///
    /// [`Page`]: pagination::Page
    pub type Page = pagination::Page<User>;

    /// Arguments for selecting a [`Page`].
    pub type Arguments = pagination::Arguments;

    /// Filter of [`User`]s applied before pagination.
    #[derive(Clone, Debug, Default, Eq, PartialEq)]
    pub struct Filter {
        /// Part of the full [`User`] name to search for, lowercased.
        ///
        /// Empty part matches every [`User`].
        pub name: String,

        /// [`nationality::Filter`] of [`User`]s.
        pub nationality: nationality::Filter,
    }

    impl Filter {
        /// Creates a new [`Filter`] normalizing the provided `name` and
        /// `nationality`.
        #[must_use]
        pub fn new(
            name: impl AsRef<str>,
            nationality: impl AsRef<str>,
        ) -> Self {
            Self {
                name: name.as_ref().trim().to_lowercase(),
                nationality: nationality::Filter::new(nationality),
            }
        }

        /// Checks whether the provided [`User`] passes this [`Filter`].
        #[must_use]
        pub fn matches(&self, user: &User) -> bool {
            user.name.contains(&self.name)
                && user.nationality.matches(&self.nationality)
        }
    }

    /// Selected [`Page`] along with the dataset-wide aggregates.
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub struct Listing {
        /// [`Page`] of the filtered [`User`]s.
        pub page: Page,

        /// Total number of [`User`]s in the dataset, regardless of filtering.
        pub total_all: usize,

        /// Sorted distinct [`Nationality`] codes over the whole dataset,
        /// regardless of filtering.
        pub nationalities: Vec<Nationality>,
    }

    /// Wire representation of a [`Listing`].
    #[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
    pub struct Response {
        /// [`User`]s on the requested [`Page`].
        pub data: Vec<User>,

        /// [`Meta`] information about the [`Listing`].
        pub meta: Meta,
    }

    /// Meta information of a [`Response`].
    #[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Meta {
        /// Number of [`User`]s matching the [`Filter`].
        pub total: usize,

        /// Number of [`User`]s in the whole dataset.
        pub total_all: usize,

        /// Number of the returned [`Page`].
        pub page: usize,

        /// Size of the returned [`Page`].
        pub page_size: usize,

        /// Indicator whether there is a [`Page`] after the returned one.
        pub has_more: bool,

        /// Sorted distinct [`Nationality`] codes of the whole dataset.
        pub nationalities: Vec<Nationality>,
    }

    impl From<Listing> for Response {
        fn from(listing: Listing) -> Self {
            let Listing {
                page,
                total_all,
                nationalities,
            } = listing;

            Self {
                meta: Meta {
                    total: page.total,
                    total_all,
                    page: page.arguments.page.get(),
                    page_size: page.arguments.page_size.get(),
                    has_more: page.has_more,
                    nationalities,
                },
                data: page.items,
            }
        }
    }
}
