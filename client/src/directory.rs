//! [`Directory`] view over the user search and the [`Favorites`].

use std::num::NonZeroUsize;

use common::pagination::Arguments;
use derive_more::{Display, FromStr};
use service::domain::{
    user::{self, nationality},
    User,
};
use tracerr::Traced;

use crate::{
    api::{self, Api, Params, Response},
    Favorites, Storage, UserSearch,
};

/// Tab of a [`View`].
#[derive(Clone, Copy, Debug, Default, Display, Eq, FromStr, PartialEq)]
pub enum Tab {
    /// All the [`User`]s of the current page.
    #[default]
    All,

    /// Favorite [`User`]s of the current page.
    Favorites,
}

/// State of the directory controls.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct View {
    /// Active [`Tab`].
    pub tab: Tab,

    /// Part of a full user name being searched for.
    pub search_term: String,

    /// Selected [`nationality::Filter`].
    pub nationality: nationality::Filter,

    /// Number of the current page, starting from `1`.
    pub page: NonZeroUsize,
}

impl Default for View {
    fn default() -> Self {
        Self {
            tab: Tab::default(),
            search_term: String::new(),
            nationality: nationality::Filter::default(),
            page: NonZeroUsize::MIN,
        }
    }
}

impl View {
    /// Sets the search term, resetting the page.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.page = NonZeroUsize::MIN;
    }

    /// Sets the nationality filter, resetting the page.
    pub fn set_nationality(&mut self, code: impl AsRef<str>) {
        self.nationality = nationality::Filter::new(code);
        self.page = NonZeroUsize::MIN;
    }

    /// Switches the active [`Tab`].
    pub fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    /// Moves to the next page, if there is one.
    ///
    /// Returns whether the page has changed.
    pub fn next_page(&mut self, has_more: bool) -> bool {
        if has_more {
            self.page = self.page.saturating_add(1);
        }
        has_more
    }

    /// Moves to the previous page, if there is one.
    ///
    /// Returns whether the page has changed.
    pub fn previous_page(&mut self) -> bool {
        match NonZeroUsize::new(self.page.get() - 1) {
            Some(page) => {
                self.page = page;
                true
            }
            None => false,
        }
    }

    /// Resets the search term, the nationality filter and the page at once.
    pub fn clear_filters(&mut self) {
        self.search_term.clear();
        self.nationality = nationality::Filter::All;
        self.page = NonZeroUsize::MIN;
    }

    /// Returns the search [`Params`] described by this [`View`].
    #[must_use]
    pub fn params(&self, page_size: NonZeroUsize) -> Params {
        Params {
            query: self.search_term.clone(),
            nationality: self.nationality.clone(),
            arguments: Arguments::new(self.page.get(), page_size.get()),
        }
    }
}

/// Numbers of [`User`]s shown next to the [`Tab`]s.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Counts {
    /// Number of [`User`]s matching the current filters.
    pub all: usize,

    /// Number of favorite [`User`]s on the current page.
    pub favorites: usize,
}

/// [`View`] composed with the [`UserSearch`] and the [`Favorites`].
#[derive(Debug)]
pub struct Directory<S> {
    /// Current [`View`].
    view: View,

    /// Number of [`User`]s per page.
    page_size: NonZeroUsize,

    /// [`UserSearch`] of the [`View`] parameters.
    search: UserSearch,

    /// [`Favorites`] of the user.
    favorites: Favorites<S>,
}

impl<S: Storage> Directory<S> {
    /// Creates a new [`Directory`] with the default [`View`], starting its
    /// [`UserSearch`] on the current [`tokio::task::LocalSet`].
    pub fn spawn<A>(
        api: A,
        favorites: Favorites<S>,
        page_size: NonZeroUsize,
    ) -> Self
    where
        A: Api<Params, Ok = Response, Err = Traced<api::Error>> + 'static,
    {
        let view = View::default();
        let search = UserSearch::spawn(api, view.params(page_size));
        Self::new(view, page_size, search, favorites)
    }

    /// Creates a new [`Directory`] out of its parts.
    ///
    /// The `search` is expected to be requesting the `view` parameters.
    #[must_use]
    pub fn new(
        view: View,
        page_size: NonZeroUsize,
        search: UserSearch,
        favorites: Favorites<S>,
    ) -> Self {
        Self {
            view,
            page_size,
            search,
            favorites,
        }
    }

    /// Returns the current [`View`].
    #[must_use]
    pub fn view(&self) -> &View {
        &self.view
    }

    /// Returns the [`UserSearch`] of this [`Directory`].
    #[must_use]
    pub fn search(&self) -> &UserSearch {
        &self.search
    }

    /// Returns the [`UserSearch`] of this [`Directory`] mutably, so its
    /// changes can be awaited.
    pub fn search_mut(&mut self) -> &mut UserSearch {
        &mut self.search
    }

    /// Returns the [`Favorites`] of this [`Directory`].
    #[must_use]
    pub fn favorites(&self) -> &Favorites<S> {
        &self.favorites
    }

    /// Sets the search term, resetting the page.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.view.set_search_term(term);
        self.push();
    }

    /// Sets the nationality filter, resetting the page.
    pub fn set_nationality(&mut self, code: impl AsRef<str>) {
        self.view.set_nationality(code);
        self.push();
    }

    /// Switches the active [`Tab`] without requesting anything.
    pub fn set_tab(&mut self, tab: Tab) {
        self.view.set_tab(tab);
    }

    /// Moves to the next page, if the current result has more.
    ///
    /// Returns whether the page has changed.
    pub fn next_page(&mut self) -> bool {
        let moved = self.view.next_page(self.can_next());
        if moved {
            self.push();
        }
        moved
    }

    /// Moves to the previous page, if there is one.
    ///
    /// Returns whether the page has changed.
    pub fn previous_page(&mut self) -> bool {
        let moved = self.view.previous_page();
        if moved {
            self.push();
        }
        moved
    }

    /// Resets all the filters and the page at once.
    pub fn clear_filters(&mut self) {
        self.view.clear_filters();
        self.push();
    }

    /// Re-issues the latest search.
    pub fn retry(&self) {
        self.search.refetch();
    }

    /// Toggles the favorite membership of the provided `id`.
    ///
    /// Returns whether the `id` is a favorite now.
    pub fn toggle_favorite(&mut self, id: user::Id) -> bool {
        self.favorites.toggle(id)
    }

    /// Returns the [`User`]s to show on the active [`Tab`].
    ///
    /// Favorites are taken from the current page only.
    #[must_use]
    pub fn visible(&self) -> Vec<User> {
        let Some(data) = self.search.state().data else {
            return Vec::new();
        };
        match self.view.tab {
            Tab::All => data.data,
            Tab::Favorites => data
                .data
                .into_iter()
                .filter(|u| self.favorites.is_favorite(&u.id))
                .collect(),
        }
    }

    /// Returns the [`Counts`] of the current result.
    #[must_use]
    pub fn counts(&self) -> Counts {
        self.search
            .state()
            .data
            .map(|d| Counts {
                all: d.meta.total,
                favorites: d
                    .data
                    .iter()
                    .filter(|u| self.favorites.is_favorite(&u.id))
                    .count(),
            })
            .unwrap_or_default()
    }

    /// Indicates whether there is a page after the current one.
    ///
    /// Only a settled result of the current [`View`] is trusted, so moving
    /// forward is unavailable while its search is pending or in flight.
    #[must_use]
    pub fn can_next(&self) -> bool {
        let state = self.search.state();
        !state.is_fetching
            && state.params == self.view.params(self.page_size)
            && state.data.is_some_and(|d| d.meta.has_more)
    }

    /// Indicates whether there is a page before the current one.
    #[must_use]
    pub fn can_previous(&self) -> bool {
        self.view.page.get() > 1
    }

    /// Pushes the [`View`] parameters to the [`UserSearch`].
    fn push(&self) {
        self.search.set_params(self.view.params(self.page_size));
    }
}
