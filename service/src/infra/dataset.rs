//! [`Dataset`]-related implementations.

use std::{convert::Infallible, sync::Arc};

use common::operations::{By, Reset, Select};
use derive_more::{Display, Error as StdError, From};
use tokio::sync::Mutex;
use tracerr::Traced;
use tracing as log;

use crate::{domain::User, infra::random_user};

/// Source of the [`User`]s dataset.
pub use common::Handler as Dataset;

/// [`Dataset`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// [`RandomUser`] error.
    ///
    /// [`RandomUser`]: random_user::RandomUser
    #[display("`RandomUser` error: {_0}")]
    RandomUser(random_user::Error),
}

/// [`Dataset`] fetching [`User`]s from its upstream once and memoizing them
/// for the rest of the process lifetime.
///
/// Failed fetches are not memoized, so the next selection retries the
/// upstream. The memoized [`User`]s are dropped on [`Reset`] only.
#[derive(Clone, Debug)]
pub struct Memoized<U> {
    /// Upstream [`Dataset`] to fetch [`User`]s from.
    upstream: U,

    /// Memoized [`User`]s, if fetched already.
    cache: Arc<Mutex<Option<Arc<[User]>>>>,
}

impl<U> Memoized<U> {
    /// Wraps the provided `upstream` into a [`Memoized`] [`Dataset`].
    #[must_use]
    pub fn new(upstream: U) -> Self {
        Self {
            upstream,
            cache: Arc::default(),
        }
    }
}

impl<U> Dataset<Select<By<Arc<[User]>, ()>>> for Memoized<U>
where
    U: Dataset<
        Select<By<Vec<User>, ()>>,
        Ok = Vec<User>,
        Err = Traced<Error>,
    >,
{
    type Ok = Arc<[User]>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        _: Select<By<Arc<[User]>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Held during the fetch, so concurrent first callers hit the upstream
        // once.
        let mut cache = self.cache.lock().await;
        if let Some(users) = cache.as_ref() {
            return Ok(Arc::clone(users));
        }

        let users: Arc<[User]> = self
            .upstream
            .execute(Select(By::new(())))
            .await
            .map_err(tracerr::wrap!())?
            .into();
        log::info!("dataset hydrated with {} users", users.len());

        *cache = Some(Arc::clone(&users));
        Ok(users)
    }
}

impl<U> Dataset<Reset> for Memoized<U> {
    type Ok = ();
    type Err = Infallible;

    async fn execute(&self, _: Reset) -> Result<Self::Ok, Self::Err> {
        if self.cache.lock().await.take().is_some() {
            log::debug!("memoized dataset is reset");
        }
        Ok(())
    }
}
