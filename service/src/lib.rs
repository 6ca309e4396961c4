//! Service contains the business logic of the user directory: the memoized
//! [`User`]s dataset and searching through it.
//!
//! [`User`]: domain::User
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod read;

use std::time;

use smart_default::SmartDefault;

#[cfg(doc)]
use infra::Dataset;

pub use self::{command::Command, query::Query};

/// [`Service`] configuration.
#[derive(Clone, Copy, Debug, SmartDefault)]
pub struct Config {
    /// Delay simulating a realistic latency of [`query::Search`]es.
    #[default(time::Duration::from_millis(200))]
    pub latency: time::Duration,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Ds> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Dataset`] of this [`Service`].
    dataset: Ds,
}

impl<Ds> Service<Ds> {
    /// Creates a new [`Service`] with the provided parameters.
    #[must_use]
    pub fn new(config: Config, dataset: Ds) -> Self {
        Self { config, dataset }
    }

    /// Returns [`Config`] of this [`Service`].
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Dataset`] of this [`Service`].
    #[must_use]
    pub fn dataset(&self) -> &Ds {
        &self.dataset
    }
}
