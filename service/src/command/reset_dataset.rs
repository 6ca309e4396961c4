//! [`Command`] for resetting the memoized [`User`]s dataset.
//!
//! [`User`]: crate::domain::User

use std::convert::Infallible;

use common::operations::Reset;
use tracing as log;

use crate::{infra::Dataset, Service};

use super::Command;

/// [`Command`] dropping the memoized [`User`]s, so the next [`Query`] fetches
/// them from the upstream anew.
///
/// [`Query`]: crate::Query
/// [`User`]: crate::domain::User
#[derive(Clone, Copy, Debug, Default)]
pub struct ResetDataset;

impl<Ds> Command<ResetDataset> for Service<Ds>
where
    Ds: Dataset<Reset, Ok = (), Err = Infallible>,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(&self, _: ResetDataset) -> Result<Self::Ok, Self::Err> {
        log::info!("resetting `User`s dataset");
        self.dataset().execute(Reset).await
    }
}
