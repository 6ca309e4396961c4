//! [`Command`] definition.

pub mod reset_dataset;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::reset_dataset::ResetDataset;
