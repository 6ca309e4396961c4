//! [`Query`] for searching [`User`]s.

use std::{collections::BTreeSet, sync::Arc};

use common::{
    operations::{By, Select},
    Page,
};
use derive_more::{Display, Error, From};
use tokio::time;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::User,
    infra::{dataset, Dataset},
    query::users,
    read::user::list,
    Service,
};

use super::Query;

/// [`Query`] for searching a [`list::Page`] of [`User`]s by a part of their
/// name and their nationality.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Search {
    /// [`list::Filter`] to apply before pagination.
    pub filter: list::Filter,

    /// [`list::Arguments`] of the requested [`list::Page`].
    pub arguments: list::Arguments,
}

impl Search {
    /// Creates a new [`Search`] normalizing the provided parameters.
    ///
    /// `page` and `page_size` are clamped to be at least `1`.
    #[must_use]
    pub fn new(
        query: impl AsRef<str>,
        nationality: impl AsRef<str>,
        page: usize,
        page_size: usize,
    ) -> Self {
        Self {
            filter: list::Filter::new(query, nationality),
            arguments: list::Arguments::new(page, page_size),
        }
    }
}

impl<Ds> Query<Search> for Service<Ds>
where
    Ds: Dataset<
        Select<By<Arc<[User]>, ()>>,
        Ok = Arc<[User]>,
        Err = Traced<dataset::Error>,
    >,
{
    type Ok = list::Listing;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, query: Search) -> Result<Self::Ok, Self::Err> {
        let Search { filter, arguments } = query;

        let latency = self.config().latency;
        if !latency.is_zero() {
            time::sleep(latency).await;
        }

        let users = self
            .execute(users::All::by(()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))?;

        let nationalities = users
            .iter()
            .map(|u| &u.nationality)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .cloned()
            .collect();

        let page =
            Page::select(arguments, users.iter().filter(|u| filter.matches(u)))
                .map(Clone::clone);
        log::debug!(
            "found {} of {} users matching `{filter:?}`",
            page.total,
            users.len(),
        );

        Ok(list::Listing {
            page,
            total_all: users.len(),
            nationalities,
        })
    }
}

/// Error of [`Search`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Dataset`] error.
    #[display("`Dataset` operation failed: {_0}")]
    Dataset(dataset::Error),
}

#[cfg(test)]
mod spec {
    use std::{sync::Arc, time::Duration};

    use common::operations::{By, Select};
    use reqwest::StatusCode;
    use tracerr::Traced;

    use crate::{
        domain::{
            user::{self, Name, Picture},
            User,
        },
        infra::{dataset, random_user, Dataset},
        read::user::list,
        Config, Service,
    };

    use super::{Query as _, Search};

    /// [`Dataset`] of fixed [`User`]s, or failing one if there are none.
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
                    random_user::Error::Status(
                        StatusCode::SERVICE_UNAVAILABLE
                    )
                ))
            })
        }
    }

    fn user(first: &str, last: &str, nationality: &str) -> User {
        User {
            id: user::Id::new(),
            email: format!("{first}.{last}@example.com").to_lowercase().into(),
            name: Name::new(first, last),
            picture: Picture {
                large: format!("https://example.com/{first}.jpg"),
            },
            nationality: nationality.into(),
        }
    }

    fn service(users: Vec<User>) -> Service<Fixed> {
        Service::new(
            Config {
                latency: Duration::ZERO,
            },
            Fixed(Some(users.into())),
        )
    }

    fn generated(count: usize) -> Vec<User> {
        let nats = ["US", "GB", "fr", "DE", "br"];
        (0..count)
            .map(|i| user(&format!("User{i}"), "Test", nats[i % nats.len()]))
            .collect()
    }

    async fn search(svc: &Service<Fixed>, query: Search) -> list::Listing {
        svc.execute(query).await.unwrap()
    }

    #[tokio::test]
    async fn returns_whole_default_page() {
        let svc = service(generated(50));

        let found = search(&svc, Search::default()).await;

        assert_eq!(found.page.items.len(), 50);
        assert_eq!(found.page.total, 50);
        assert_eq!(found.total_all, 50);
        assert!(!found.page.has_more);
    }

    #[tokio::test]
    async fn matches_names_case_insensitively() {
        let svc = service(vec![
            user("John", "Smith", "US"),
            user("Elton", "JOHNSON", "GB"),
            user("mary", "littlejohn", "FR"),
            user("Jonathan", "Doe", "US"),
            user("Jane", "Roe", "US"),
        ]);

        let found = search(&svc, Search::new("  JoHn ", "ALL", 1, 50)).await;

        let names = found
            .page
            .items
            .iter()
            .map(|u| u.name.full.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, ["John Smith", "Elton JOHNSON", "mary littlejohn"]);
        assert_eq!(found.page.total, 3);
        assert_eq!(found.total_all, 5);
    }

    #[tokio::test]
    async fn filters_nationality_case_insensitively() {
        let svc = service(vec![
            user("John", "Smith", "us"),
            user("Jane", "Roe", "US"),
            user("Hans", "Muller", "DE"),
        ]);

        let found = search(&svc, Search::new("", "us", 1, 50)).await;

        assert_eq!(found.page.total, 2);
        assert!(found
            .page
            .items
            .iter()
            .all(|u| u.nationality.to_string().eq_ignore_ascii_case("us")));
    }

    #[tokio::test]
    async fn lists_nationalities_of_whole_dataset() {
        let svc = service(vec![
            user("John", "Smith", "US"),
            user("Jane", "Roe", "US"),
            user("Hans", "Muller", "DE"),
            user("Ana", "Silva", "BR"),
        ]);

        for query in [
            Search::default(),
            Search::new("hans", "ALL", 1, 50),
            Search::new("", "BR", 1, 50),
            Search::new("nobody", "XX", 7, 1),
        ] {
            let found = search(&svc, query).await;

            let nationalities = found
                .nationalities
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>();
            assert_eq!(nationalities, ["BR", "DE", "US"]);
        }
    }

    #[tokio::test]
    async fn paginates_filtered_users() {
        let users = generated(23);
        let svc = service(users.clone());

        for page in 1..=5 {
            for page_size in [1, 5, 10, 23, 50] {
                for (query, nationality) in [("", "ALL"), ("user1", "ALL")] {
                    let found = search(
                        &svc,
                        Search::new(query, nationality, page, page_size),
                    )
                    .await;

                    let total = found.page.total;
                    let offset = (page - 1) * page_size;
                    assert_eq!(
                        found.page.items.len(),
                        page_size.min(total.saturating_sub(offset)),
                    );
                    assert_eq!(found.page.has_more, offset + page_size < total);
                }
            }
        }

        let second = search(&svc, Search::new("", "ALL", 2, 10)).await;
        assert_eq!(second.page.items, users[10..20]);
    }

    #[tokio::test]
    async fn clamps_arguments() {
        let svc = service(generated(3));

        let found = search(&svc, Search::new("", "ALL", 0, 0)).await;

        assert_eq!(found.page.arguments.page.get(), 1);
        assert_eq!(found.page.arguments.page_size.get(), 1);
        assert_eq!(found.page.items.len(), 1);
        assert!(found.page.has_more);
    }

    #[tokio::test]
    async fn is_idempotent() {
        let svc = service(generated(30));
        let query = Search::new("user2", "fr", 1, 2);

        let first = search(&svc, query.clone()).await;
        let second = search(&svc, query).await;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn propagates_dataset_errors() {
        let svc = Service::new(
            Config {
                latency: Duration::ZERO,
            },
            Fixed(None),
        );

        let err = svc.execute(Search::default()).await.unwrap_err();

        assert!(err.to_string().contains("503"), "{err}");
    }

    #[tokio::test(start_paused = true)]
    async fn simulates_latency() {
        let svc = Service::new(
            Config {
                latency: Duration::from_millis(200),
            },
            Fixed(Some(generated(1).into())),
        );
        let started = tokio::time::Instant::now();

        _ = search(&svc, Search::default()).await;

        assert!(started.elapsed() >= Duration::from_millis(200));
    }
}
