//! [`Api`] of the user search endpoint.

use common::pagination::Arguments;
use derive_more::{Display, Error as StdError, From};
use reqwest::{Client, StatusCode, Url};
use service::domain::user::nationality;
use tracerr::Traced;
use tracing as log;

pub use common::Handler as Api;
pub use service::read::user::list::{Meta, Response};

/// Parameters of a user search.
///
/// Normalized the same way the search endpoint normalizes them, so equal
/// [`Params`] always describe the same request.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Params {
    /// Part of a full user name to search for, as typed.
    pub query: String,

    /// [`nationality::Filter`] to apply.
    pub nationality: nationality::Filter,

    /// Pagination [`Arguments`].
    pub arguments: Arguments,
}

impl Params {
    /// Creates new [`Params`] normalizing the provided values.
    ///
    /// `page` and `page_size` are clamped to be at least `1`.
    #[must_use]
    pub fn new(
        query: impl Into<String>,
        nationality: impl AsRef<str>,
        page: usize,
        page_size: usize,
    ) -> Self {
        Self {
            query: query.into(),
            nationality: nationality::Filter::new(nationality),
            arguments: Arguments::new(page, page_size),
        }
    }

    /// Returns query string pairs of these [`Params`].
    #[must_use]
    pub fn to_pairs(&self) -> [(&'static str, String); 4] {
        [
            ("q", self.query.clone()),
            ("nationality", self.nationality.to_string()),
            ("page", self.arguments.page.to_string()),
            ("pageSize", self.arguments.page_size.to_string()),
        ]
    }
}

/// [`Api`] over HTTP.
#[derive(Clone, Debug)]
pub struct HttpApi {
    /// Underlying HTTP [`Client`].
    client: Client,

    /// URL of the search endpoint.
    endpoint: Url,
}

impl HttpApi {
    /// Creates a new [`HttpApi`] requesting the provided search `endpoint`.
    #[must_use]
    pub fn new(endpoint: Url) -> Self {
        Self {
            client: Client::new(),
            endpoint,
        }
    }
}

impl Api<Params> for HttpApi {
    type Ok = Response;
    type Err = Traced<Error>;

    async fn execute(&self, params: Params) -> Result<Self::Ok, Self::Err> {
        log::debug!("requesting `{}` with `{params:?}`", self.endpoint);

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&params.to_pairs())
            .send()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))?;

        let status = response.status();
        if !status.is_success() {
            return Err(tracerr::new!(Error::Status(status)));
        }

        response
            .json::<Response>()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
    }
}

/// [`Api`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Request couldn't be performed or its body couldn't be decoded.
    #[display("Search request failed: {_0}")]
    Transport(reqwest::Error),

    /// Non-success status of the response.
    #[display("Search endpoint responded with `{_0}` status")]
    #[from(ignore)]
    Status(#[error(not(source))] StatusCode),
}
