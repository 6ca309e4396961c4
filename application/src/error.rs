//! [`Error`]-related definitions.

use std::fmt;

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use derive_more::Error as StdError;
use itertools::Itertools as _;
use serde::{Deserialize, Serialize};
use tracerr::{Trace, Traced};
use tracing as log;

/// Defines an enum of [`Error`]s returned by the API, along with their codes,
/// HTTP statuses and messages.
#[macro_export]
macro_rules! define_error {
    (
        enum $name:ident {
            $(
                #[code = $code:literal]
                #[status = $status_code:ident]
                #[message = $message:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        #[doc = concat!("[`", stringify!($name), "`] of the API.")]
        #[derive(Clone, Debug, ::derive_more::Display, ::derive_more::Error)]
        pub enum $name {
            $(
                #[display($message)]
                #[doc = $message]
                $variant,
            )*
        }

        impl From<$name> for $crate::Error {
            fn from(err: $name) -> Self {
                match err {
                    $(
                        $name::$variant => Self::new(
                            $code,
                            ::http::StatusCode::$status_code,
                            $message,
                        ),
                    )*
                }
            }
        }
    };
}

/// Error of the HTTP API, rendered as a JSON [`Body`].
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// [`Code`] identifying this [`Error`] to API clients.
    pub code: Code,

    /// [`http::StatusCode`] to respond with.
    pub status_code: http::StatusCode,

    /// [`Trace`] of the [`Error`] cause, if any.
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,

    /// Human-readable message.
    pub message: String,
}

impl Error {
    /// Creates a new [`Error`] without a [`Trace`].
    #[must_use]
    pub fn new(
        code: Code,
        status_code: http::StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            status_code,
            backtrace: None,
            message: message.into(),
        }
    }

    /// Creates a new `INTERNAL_SERVER_ERROR` [`Error`].
    #[must_use]
    pub fn internal(msg: &impl ToString) -> Self {
        Self::new(
            "INTERNAL_SERVER_ERROR",
            http::StatusCode::INTERNAL_SERVER_ERROR,
            msg.to_string(),
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]: {}", self.code, self.message)?;
        if let Some(trace) = &self.backtrace {
            write!(f, "\n{}", trace.iter().format("\n"))?;
        }
        Ok(())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        if self.status_code.is_server_error() {
            log::error!("{self}");
        }

        let body = Body {
            code: self.code.to_owned(),
            message: self.message,
        };
        (self.status_code, Json(body)).into_response()
    }
}

/// JSON body of an [`Error`] response.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Body {
    /// [`Error`] code.
    pub code: String,

    /// [`Error`] message.
    pub message: String,
}

/// [`Error`] code.
pub type Code = &'static str;

/// Conversion of failures into API [`Error`]s.
pub trait AsError {
    /// Returns the [`Error`] this failure is exposed as, or [`None`] if it's
    /// an internal one.
    fn try_as_error(&self) -> Option<Error>;

    /// Converts the type into an [`Error`], falling back to
    /// [`Error::internal()`].
    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error()
            .unwrap_or_else(|| Error::internal(&self))
    }

    /// Same as [`AsError::as_error()`], consuming the value.
    fn into_error(self) -> Error
    where
        Self: fmt::Display + Sized,
    {
        self.as_error()
    }
}

impl<E: AsError> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        let mut error = self.as_ref().try_as_error()?;
        error.backtrace = Some(self.trace().clone());
        Some(error)
    }
}

#[cfg(test)]
mod spec {
    use axum::response::IntoResponse as _;

    use super::{AsError, Error};

    struct Unknown;

    impl std::fmt::Display for Unknown {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "something unexpected")
        }
    }

    impl AsError for Unknown {
        fn try_as_error(&self) -> Option<Error> {
            None
        }
    }

    #[test]
    fn falls_back_to_internal() {
        let err = Unknown.into_error();

        assert_eq!(err.code, "INTERNAL_SERVER_ERROR");
        assert_eq!(err.message, "something unexpected");
        assert_eq!(
            err.to_string(),
            "[INTERNAL_SERVER_ERROR]: something unexpected",
        );
    }

    crate::define_error! {
        enum Teapot {
            #[code = "TEAPOT"]
            #[status = IM_A_TEAPOT]
            #[message = "Cannot brew coffee"]
            Coffee,
        }
    }

    #[test]
    fn converts_defined_errors() {
        let err = Error::from(Teapot::Coffee);

        assert_eq!(err.code, "TEAPOT");
        assert_eq!(err.status_code, http::StatusCode::IM_A_TEAPOT);
        assert_eq!(err.to_string(), "[TEAPOT]: Cannot brew coffee");
        assert_eq!(Teapot::Coffee.to_string(), "Cannot brew coffee");
    }

    #[test]
    fn responds_with_status() {
        let response = Error::internal(&"boom").into_response();

        assert_eq!(
            response.status(),
            http::StatusCode::INTERNAL_SERVER_ERROR,
        );
    }
}
