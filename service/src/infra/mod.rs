//! Infrastructure layer.

pub mod dataset;
pub mod random_user;

pub use self::{
    dataset::{Dataset, Memoized},
    random_user::RandomUser,
};
