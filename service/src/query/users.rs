//! [`Query`] collection related to the multiple [`User`]s.

use std::sync::Arc;

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::domain::User;

use super::DatasetQuery;

/// Queries the whole dataset of [`User`]s.
pub type All = DatasetQuery<By<Arc<[User]>, ()>>;
