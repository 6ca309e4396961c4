//! [`RandomUser`] upstream of the [`User`]s dataset.
//!
//! [`RandomUser`] only owns the transport: request building, status mapping
//! and decoding of the raw records into [`User`]s.

use std::time;

use common::operations::{By, Select};
use derive_more::{Display, Error as StdError, From};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        user::{self, Name, Picture},
        User,
    },
    infra::{dataset, Dataset},
};

/// [`RandomUser`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// URL of the random user generator API.
    pub url: Url,

    /// Number of [`User`]s to generate.
    pub results: usize,

    /// Seed keeping the generated [`User`]s stable across requests.
    pub seed: String,

    /// Timeout of a single request.
    pub timeout: time::Duration,
}

/// Random user generator API client.
#[derive(Clone, Debug)]
pub struct RandomUser {
    /// Underlying HTTP [`Client`].
    client: Client,

    /// [`Config`] of this [`RandomUser`].
    config: Config,
}

impl RandomUser {
    /// Creates a new [`RandomUser`] client with the provided [`Config`].
    ///
    /// # Errors
    ///
    /// If failed to build the underlying HTTP [`Client`].
    pub fn new(config: Config) -> Result<Self, Traced<Error>> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(tracerr::from_and_wrap!(=> Error))?;
        Ok(Self { client, config })
    }
}

impl Dataset<Select<By<Vec<User>, ()>>> for RandomUser {
    type Ok = Vec<User>;
    type Err = Traced<dataset::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<User>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let Config {
            url, results, seed, ..
        } = &self.config;

        log::debug!("fetching {results} users from `{url}`");

        let response = self
            .client
            .get(url.clone())
            .query(&[("results", results.to_string()), ("seed", seed.clone())])
            .send()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(tracerr::map_from(tracerr::new!(Error::Status(
                status,
            ))));
        }

        let Response { results } = response
            .json::<Response>()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;

        Ok(results.into_iter().map(Into::into).collect())
    }
}

/// [`RandomUser`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Request couldn't be performed or its body couldn't be decoded.
    #[display("Random user request failed: {_0}")]
    Transport(reqwest::Error),

    /// Non-success status of the response.
    #[display("Random user API responded with `{_0}` status")]
    #[from(ignore)]
    Status(#[error(not(source))] StatusCode),
}

/// Response of the random user generator API.
#[derive(Debug, Deserialize)]
struct Response {
    /// Generated records.
    results: Vec<Record>,
}

/// Raw generated user record.
#[derive(Debug, Deserialize)]
struct Record {
    login: Login,
    email: String,
    name: RecordName,
    picture: Picture,
    nat: String,
}

#[derive(Debug, Deserialize)]
struct Login {
    uuid: user::Id,
}

#[derive(Debug, Deserialize)]
struct RecordName {
    first: String,
    last: String,
}

impl From<Record> for User {
    fn from(record: Record) -> Self {
        let Record {
            login,
            email,
            name,
            picture,
            nat,
        } = record;

        Self {
            id: login.uuid,
            email: email.into(),
            name: Name::new(name.first, name.last),
            picture,
            nationality: nat.into(),
        }
    }
}
