//! Client side of the user directory: debounced search, favorites and the
//! directory view driving them.

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

pub mod api;
pub mod command;
pub mod directory;
pub mod favorites;
pub mod search;
pub mod storage;

// Used in binary.
use clap as _;
use tracing_subscriber as _;

pub use self::{
    api::{Api, HttpApi},
    directory::Directory,
    favorites::Favorites,
    search::UserSearch,
    storage::Storage,
};
