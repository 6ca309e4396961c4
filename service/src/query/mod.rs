//! [`Query`] definition.

pub mod search;
pub mod users;

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    infra::{dataset, Dataset},
    Service,
};

/// [`Query`] of the [`Service`].
pub use common::Handler as Query;

pub use self::search::Search;

/// [`Query`] [`Select`]ing a `T`ype from a [`Dataset`].
#[derive(Clone, Copy, Debug)]
#[expect(clippy::module_name_repetitions, reason = "more readable")]
pub struct DatasetQuery<T>(T);

impl<W, B> DatasetQuery<By<W, B>> {
    /// Creates a new [`DatasetQuery`] selecting a `W` by the provided `B`.
    #[must_use]
    pub fn by(by: B) -> Self {
        Self(By::new(by))
    }
}

impl<Ds, W, B> Query<DatasetQuery<By<W, B>>> for Service<Ds>
where
    Ds: Dataset<Select<By<W, B>>, Ok = W, Err = Traced<dataset::Error>>,
{
    type Ok = W;
    type Err = Traced<dataset::Error>;

    async fn execute(
        &self,
        DatasetQuery(by): DatasetQuery<By<W, B>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.dataset()
            .execute(Select(by))
            .await
            .map_err(tracerr::wrap!())
    }
}
