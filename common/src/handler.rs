//! [`Handler`] abstractions.

use std::future::Future;

/// Executable handler of an operation.
///
/// Queries, commands, dataset sources and API clients are all expressed as
/// [`Handler`]s of the operation they perform.
pub trait Handler<Args = ()> {
    /// Type of successful [`Handler`] result.
    type Ok;

    /// Type of this [`Handler`] error.
    type Err;

    /// Executes this [`Handler`] with the provided arguments.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
