//! [`Favorites`] store definitions.

use service::domain::user;
use tracing as log;

use crate::Storage;

/// Key the [`Favorites`] are persisted under in a [`Storage`].
pub const STORAGE_KEY: &str = "user-favorites";

/// Set of favorite user IDs persisted to a [`Storage`] as a JSON array.
///
/// IDs are kept in the order they were marked favorite.
#[derive(Debug)]
pub struct Favorites<S> {
    /// [`Storage`] the IDs are persisted to.
    storage: S,

    /// Favorite IDs.
    ids: Vec<user::Id>,
}

impl<S: Storage> Favorites<S> {
    /// Loads [`Favorites`] from the provided [`Storage`].
    ///
    /// Unreadable or malformed stored data is logged and results in empty
    /// [`Favorites`]. Stored entries that aren't valid IDs are dropped.
    pub fn load(storage: S) -> Self {
        let ids = match storage.get(STORAGE_KEY) {
            Ok(Some(json)) => parse(&json),
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("failed to read favorites: {e}");
                Vec::new()
            }
        };
        Self { storage, ids }
    }

    /// Flips the favorite membership of the provided `id` and persists the
    /// result.
    ///
    /// Returns whether the `id` is a favorite now.
    pub fn toggle(&mut self, id: user::Id) -> bool {
        let now = if let Some(pos) = self.ids.iter().position(|i| *i == id) {
            _ = self.ids.remove(pos);
            false
        } else {
            self.ids.push(id);
            true
        };
        self.persist();
        now
    }

    /// Checks whether the provided `id` is a favorite.
    #[must_use]
    pub fn is_favorite(&self, id: &user::Id) -> bool {
        self.ids.contains(id)
    }

    /// Returns all the favorite IDs.
    #[must_use]
    pub fn ids(&self) -> &[user::Id] {
        &self.ids
    }

    /// Writes the current IDs to the [`Storage`].
    ///
    /// Failures are logged, keeping the in-memory state.
    fn persist(&self) {
        let json = match serde_json::to_string(&self.ids) {
            Ok(json) => json,
            Err(e) => {
                log::error!("failed to serialize favorites: {e}");
                return;
            }
        };
        if let Err(e) = self.storage.set(STORAGE_KEY, json) {
            log::error!("failed to persist favorites: {e}");
        }
    }
}

/// Parses the stored JSON array of IDs, skipping entries that aren't IDs.
fn parse(json: &str) -> Vec<user::Id> {
    let entries = match serde_json::from_str::<Vec<String>>(json) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("discarding malformed favorites `{json}`: {e}");
            return Vec::new();
        }
    };
    entries
        .into_iter()
        .filter_map(|entry| {
            entry
                .parse::<user::Id>()
                .inspect_err(|e| {
                    log::warn!("discarding favorite `{entry}`: {e}");
                })
                .ok()
        })
        .collect()
}
