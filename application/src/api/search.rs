//! User search endpoint definitions.

use std::num::NonZeroUsize;

use axum::{extract::Query, Extension, Json};
use common::pagination::DEFAULT_PAGE_SIZE;
use serde::Deserialize;
use service::{
    domain::user::nationality,
    query::{self, search::ExecutionError},
    read::user::list,
    Query as _,
};
use tracerr::Traced;
use tracing as log;

use crate::{api::UpstreamError, AsError, Error, Service};

pub use service::read::user::list::{Meta, Response};

/// Path the search endpoint is served on.
pub const PATH: &str = "/api/users/search";

/// Settings of the search endpoint.
#[derive(Clone, Copy, Debug)]
pub struct Settings {
    /// Page size used when a request doesn't specify one.
    pub default_page_size: NonZeroUsize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Raw query parameters of a search request.
///
/// Numbers are kept raw, so malformed ones fall back to defaults instead of
/// rejecting the request.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Params {
    /// Part of a full user name to search for.
    pub q: Option<String>,

    /// Nationality code to filter by, or `ALL`.
    pub nationality: Option<String>,

    /// Number of the requested page, starting from `1`.
    pub page: Option<String>,

    /// Number of users on the requested page.
    pub page_size: Option<String>,
}

impl Params {
    /// Converts these [`Params`] into a [`query::Search`].
    ///
    /// Missing or non-numeric `page` and `pageSize` fall back to `1` and the
    /// `default_page_size` respectively, while values below `1` are clamped
    /// to `1`.
    #[must_use]
    pub fn into_query(self, settings: Settings) -> query::Search {
        let Self {
            q,
            nationality,
            page,
            page_size,
        } = self;

        query::Search::new(
            q.unwrap_or_default(),
            nationality.as_deref().unwrap_or(nationality::Filter::ALL),
            positive(page.as_deref(), 1),
            positive(page_size.as_deref(), settings.default_page_size.get()),
        )
    }
}

/// Parses the provided `raw` number clamping it to be at least `1`.
fn positive(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|n| n.trim().parse::<i64>().ok())
        .map_or(default, |n| usize::try_from(n.max(1)).unwrap_or(usize::MAX))
}

/// Searches a page of users in the provided `service`.
///
/// # Errors
///
/// If the users dataset is unavailable.
pub async fn search<Svc>(
    service: &Svc,
    settings: Settings,
    params: Params,
) -> Result<Response, Error>
where
    Svc: service::Query<
        query::Search,
        Ok = list::Listing,
        Err = Traced<ExecutionError>,
    >,
{
    let query = params.into_query(settings);
    log::debug!("searching users by `{query:?}`");

    service
        .execute(query)
        .await
        .map(Response::from)
        .map_err(|e| {
            log::warn!("search failed: {e}");
            e.into_error()
        })
}

/// Search endpoint handler.
#[tracing::instrument(skip_all, fields(http.route = PATH))]
pub async fn handler(
    Extension(service): Extension<Service>,
    Extension(settings): Extension<Settings>,
    Query(params): Query<Params>,
) -> Result<Json<Response>, Error> {
    search(&service, settings, params).await.map(Json)
}

impl AsError for ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Dataset(_) => Some(UpstreamError::Unavailable.into()),
        }
    }
}

#[cfg(test)]
mod spec {
    use std::{num::NonZeroUsize, sync::Arc, time::Duration};

    use common::operations::{By, Select};
    use service::{
        domain::{
            user::{self, Name, Picture},
            User,
        },
        infra::{dataset, random_user, Dataset},
        Config,
    };
    use tracerr::Traced;

    use super::{search, Params, Response, Settings};

    #[derive(Clone, Debug)]
    struct Fixed(Option<Arc<[User]>>);

    impl Dataset<Select<By<Arc<[User]>, ()>>> for Fixed {
        type Ok = Arc<[User]>;
        type Err = Traced<dataset::Error>;

        async fn execute(
            &self,
            _: Select<By<Arc<[User]>, ()>>,
        ) -> Result<Self::Ok, Self::Err> {
            self.0.clone().ok_or_else(|| {
                tracerr::new!(dataset::Error::from(
                    random_user::Error::Status(http::StatusCode::NOT_FOUND)
                ))
            })
        }
    }

    fn service(users: Option<Vec<User>>) -> service::Service<Fixed> {
        service::Service::new(
            Config {
                latency: Duration::ZERO,
            },
            Fixed(users.map(Into::into)),
        )
    }

    fn users(count: usize) -> Vec<User> {
        (0..count)
            .map(|i| User {
                id: user::Id::new(),
                email: format!("user{i}@example.com").into(),
                name: Name::new(format!("User{i}"), "Doe"),
                picture: Picture {
                    large: format!("https://example.com/{i}.jpg"),
                },
                nationality: if i % 2 == 0 { "us" } else { "GB" }.into(),
            })
            .collect()
    }

    fn params(pairs: &[(&str, &str)]) -> Params {
        let mut params = Params::default();
        for (key, value) in pairs {
            let value = Some((*value).to_owned());
            match *key {
                "q" => params.q = value,
                "nationality" => params.nationality = value,
                "page" => params.page = value,
                "pageSize" => params.page_size = value,
                _ => unreachable!("unknown parameter `{key}`"),
            }
        }
        params
    }

    async fn respond(pairs: &[(&str, &str)]) -> Response {
        search(&service(Some(users(60))), Settings::default(), params(pairs))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn applies_defaults() {
        let resp = respond(&[]).await;

        assert_eq!(resp.data.len(), 50);
        assert_eq!(resp.meta.page, 1);
        assert_eq!(resp.meta.page_size, 50);
        assert_eq!(resp.meta.total, 60);
        assert_eq!(resp.meta.total_all, 60);
        assert!(resp.meta.has_more);
    }

    #[tokio::test]
    async fn uses_configured_default_page_size() {
        let settings = Settings {
            default_page_size: NonZeroUsize::new(7).unwrap(),
        };

        let resp = search(&service(Some(users(10))), settings, params(&[]))
            .await
            .unwrap();

        assert_eq!(resp.data.len(), 7);
        assert_eq!(resp.meta.page_size, 7);
    }

    #[tokio::test]
    async fn clamps_and_falls_back() {
        let resp = respond(&[("page", "-3"), ("pageSize", "0")]).await;
        assert_eq!((resp.meta.page, resp.meta.page_size), (1, 1));
        assert_eq!(resp.data.len(), 1);

        let resp = respond(&[("page", "abc"), ("pageSize", "")]).await;
        assert_eq!((resp.meta.page, resp.meta.page_size), (1, 50));

        let resp = respond(&[("page", "2"), ("pageSize", "50")]).await;
        assert_eq!(resp.data.len(), 10);
        assert!(!resp.meta.has_more);
    }

    #[tokio::test]
    async fn filters_by_query_and_nationality() {
        let resp = respond(&[("q", "USER1"), ("nationality", "us")]).await;

        assert!(resp.data.iter().all(|u| {
            u.name.full.to_lowercase().contains("user1")
                && u.nationality.to_string() == "us"
        }));
        // `User1x` with even `x` are `us`.
        assert_eq!(resp.meta.total, 5);
        assert_eq!(resp.meta.total_all, 60);
        let nationalities = resp
            .meta
            .nationalities
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        assert_eq!(nationalities, ["GB", "us"]);
    }

    #[tokio::test]
    async fn treats_empty_nationality_as_all() {
        for raw in ["", "  ", "all"] {
            let resp =
                respond(&[("nationality", raw), ("pageSize", "60")]).await;

            assert_eq!(resp.meta.total, 60, "`nationality={raw}`");
            assert_eq!(resp.data.len(), 60, "`nationality={raw}`");
        }
    }

    #[tokio::test]
    async fn serializes_wire_shape() {
        let resp = respond(&[("pageSize", "1")]).await;

        let json = serde_json::to_value(&resp).unwrap();

        let meta = json["meta"].as_object().unwrap();
        let mut keys = meta.keys().map(String::as_str).collect::<Vec<_>>();
        keys.sort_unstable();
        assert_eq!(
            keys,
            [
                "hasMore",
                "nationalities",
                "page",
                "pageSize",
                "total",
                "totalAll",
            ],
        );
        let user = json["data"][0].as_object().unwrap();
        assert_eq!(user["name"]["full"], "User0 Doe");
        assert_eq!(user["picture"]["large"], "https://example.com/0.jpg");
        assert_eq!(user["nationality"], "us");
    }

    #[tokio::test]
    async fn reports_unavailable_upstream() {
        let err = search(&service(None), Settings::default(), params(&[]))
            .await
            .unwrap_err();

        assert_eq!(err.code, "UPSTREAM_UNAVAILABLE");
        assert_eq!(err.status_code, http::StatusCode::BAD_GATEWAY);
        assert!(err.backtrace.is_some());
    }
}
