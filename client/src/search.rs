//! [`UserSearch`] keeping the results of a debounced user search.

use std::{collections::HashMap, time::Duration};

use futures::future::{self, FutureExt as _, LocalBoxFuture};
use tokio::{
    sync::{mpsc, watch},
    task::{self, JoinHandle},
    time::{self, Instant},
};
use tracerr::Traced;
use tracing as log;

use crate::api::{self, Api, Params, Response};

/// Interval parameter changes must settle for before being requested.
pub const DEBOUNCE: Duration = Duration::from_millis(250);

/// Interval a fetched [`Response`] is served from the cache for, instead of
/// being requested again.
pub const STALE_TIME: Duration = Duration::from_secs(60);

/// Observable state of a [`UserSearch`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct State {
    /// Latest successfully fetched [`Response`].
    ///
    /// Stays available while newer [`Params`] are being fetched.
    pub data: Option<Response>,

    /// [`Params`] of the latest issued request.
    pub params: Params,

    /// Indicator whether a request is in flight and there is no `data` yet.
    pub is_loading: bool,

    /// Indicator whether a request is in flight.
    pub is_fetching: bool,

    /// Message of the latest request failure, if it's the latest outcome.
    pub error: Option<String>,

    /// Generation of the latest issued request.
    pub generation: u64,
}

impl State {
    /// Indicates whether the latest request failed.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Input of a [`UserSearch`] driver.
#[derive(Debug)]
enum Input {
    /// New [`Params`] to settle.
    Params(Params),

    /// Re-issue of the latest settled [`Params`].
    Refetch,
}

/// Handle to a user search running on the current [`task::LocalSet`].
///
/// Dropping the handle stops the search.
#[derive(Debug)]
pub struct UserSearch {
    /// Sender of the driver [`Input`]s.
    inputs: mpsc::UnboundedSender<Input>,

    /// Receiver of the published [`State`].
    state: watch::Receiver<State>,

    /// Driver task.
    driver: JoinHandle<()>,
}

impl UserSearch {
    /// Spawns a new [`UserSearch`] on the current [`task::LocalSet`] with the
    /// default [`DEBOUNCE`] interval.
    ///
    /// The `initial` [`Params`] are requested immediately.
    ///
    /// # Panics
    ///
    /// If called outside of a [`task::LocalSet`].
    pub fn spawn<A>(api: A, initial: Params) -> Self
    where
        A: Api<Params, Ok = Response, Err = Traced<api::Error>> + 'static,
    {
        Self::with_debounce(api, initial, DEBOUNCE)
    }

    /// Spawns a new [`UserSearch`] on the current [`task::LocalSet`] with the
    /// provided `debounce` interval.
    ///
    /// # Panics
    ///
    /// If called outside of a [`task::LocalSet`].
    pub fn with_debounce<A>(api: A, initial: Params, debounce: Duration) -> Self
    where
        A: Api<Params, Ok = Response, Err = Traced<api::Error>> + 'static,
    {
        let (inputs_tx, inputs_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(State {
            params: initial.clone(),
            ..State::default()
        });

        let driver = Driver {
            debounce,
            inputs: inputs_rx,
            state: state_tx,
            generation: 0,
            cache: HashMap::new(),
        };
        let driver = task::spawn_local(driver.run(api, initial));

        Self {
            inputs: inputs_tx,
            state: state_rx,
            driver,
        }
    }

    /// Sets new [`Params`] to be requested once they settle.
    pub fn set_params(&self, params: Params) {
        if self.inputs.send(Input::Params(params)).is_err() {
            log::warn!("user search driver is gone");
        }
    }

    /// Re-issues the request of the latest settled [`Params`] immediately.
    pub fn refetch(&self) {
        if self.inputs.send(Input::Refetch).is_err() {
            log::warn!("user search driver is gone");
        }
    }

    /// Returns the current [`State`].
    #[must_use]
    pub fn state(&self) -> State {
        self.state.borrow().clone()
    }

    /// Waits for the [`State`] to change.
    ///
    /// Returns `false` if the search has stopped and no changes will follow.
    pub async fn changed(&mut self) -> bool {
        self.state.changed().await.is_ok()
    }
}

impl Drop for UserSearch {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

/// Result of a request tagged with its generation.
type Request<'a> =
    LocalBoxFuture<'a, (u64, Result<Response, Traced<api::Error>>)>;

/// Task settling [`Input`]s and applying [`Response`]s to the [`State`].
struct Driver {
    /// Interval [`Params`] must settle for.
    debounce: Duration,

    /// Receiver of [`Input`]s.
    inputs: mpsc::UnboundedReceiver<Input>,

    /// Sender of the published [`State`].
    state: watch::Sender<State>,

    /// Generation of the latest issued request.
    generation: u64,

    /// Fetched [`Response`]s along with the time they were received.
    cache: HashMap<Params, (Instant, Response)>,
}

impl Driver {
    /// Runs this [`Driver`] until its [`UserSearch`] is dropped.
    async fn run<A>(mut self, api: A, initial: Params)
    where
        A: Api<Params, Ok = Response, Err = Traced<api::Error>>,
    {
        let mut settled = initial;
        let mut pending = None::<Params>;
        let deadline = time::sleep(self.debounce);
        tokio::pin!(deadline);

        let mut request = Some(self.issue(&api, settled.clone()));

        loop {
            tokio::select! {
                input = self.inputs.recv() => match input {
                    Some(Input::Params(params)) => {
                        pending = Some(params);
                        deadline.as_mut().reset(Instant::now() + self.debounce);
                    }
                    Some(Input::Refetch) => {
                        request = Some(self.issue(&api, settled.clone()));
                    }
                    None => break,
                },
                () = &mut deadline, if pending.is_some() => {
                    if let Some(params) = pending.take() {
                        if params == settled {
                            log::debug!("`{params:?}` are requested already");
                        } else if let Some(resp) = self.cached(&params) {
                            settled = params;
                            request = None;
                            self.serve(settled.clone(), resp);
                        } else {
                            settled = params;
                            request = Some(self.issue(&api, settled.clone()));
                        }
                    }
                }
                (generation, result) = async {
                    match &mut request {
                        Some(req) => req.await,
                        None => future::pending().await,
                    }
                } => {
                    request = None;
                    self.apply(generation, result);
                }
            }
        }
    }

    /// Issues a new request of the provided [`Params`], superseding any
    /// previous one.
    fn issue<'a, A>(&mut self, api: &'a A, params: Params) -> Request<'a>
    where
        A: Api<Params, Ok = Response, Err = Traced<api::Error>> + 'a,
    {
        self.generation += 1;
        let generation = self.generation;
        log::debug!("requesting users by `{params:?}` (#{generation})");

        self.state.send_modify(|s| {
            s.params.clone_from(&params);
            s.generation = generation;
            s.is_fetching = true;
            s.is_loading = s.data.is_none();
        });

        api.execute(params)
            .map(move |res| (generation, res))
            .boxed_local()
    }

    /// Returns the cached [`Response`] of the provided [`Params`], if it's
    /// not older than [`STALE_TIME`].
    fn cached(&self, params: &Params) -> Option<Response> {
        self.cache
            .get(params)
            .filter(|(at, _)| at.elapsed() < STALE_TIME)
            .map(|(_, resp)| resp.clone())
    }

    /// Publishes the cached [`Response`] of the provided [`Params`],
    /// superseding any in-flight request.
    fn serve(&mut self, params: Params, resp: Response) {
        self.generation += 1;
        let generation = self.generation;
        log::debug!("serving cached users of `{params:?}` (#{generation})");

        self.state.send_modify(|s| {
            s.params = params;
            s.generation = generation;
            s.data = Some(resp);
            s.error = None;
            s.is_fetching = false;
            s.is_loading = false;
        });
    }

    /// Applies the result of the request with the provided `generation`,
    /// unless it's superseded already.
    fn apply(
        &mut self,
        generation: u64,
        result: Result<Response, Traced<api::Error>>,
    ) {
        if generation != self.generation {
            log::debug!("discarding stale response #{generation}");
            return;
        }

        if let Ok(resp) = &result {
            let params = self.state.borrow().params.clone();
            self.cache.retain(|_, (at, _)| at.elapsed() < STALE_TIME);
            _ = self.cache.insert(params, (Instant::now(), resp.clone()));
        }

        self.state.send_modify(|s| {
            s.is_fetching = false;
            s.is_loading = false;
            match result {
                Ok(resp) => {
                    s.data = Some(resp);
                    s.error = None;
                }
                Err(e) => {
                    log::warn!("user search #{generation} failed: {e}");
                    s.error = Some(e.to_string());
                }
            }
        });
    }
}

#[cfg(test)]
mod spec {
    use std::{cell::RefCell, rc::Rc, time::Duration};

    use reqwest::StatusCode;
    use service::domain::{
        user::{self, Name, Picture},
        User,
    };
    use tokio::{task::LocalSet, time};
    use tracerr::Traced;

    use crate::api::{self, Api, Meta, Params, Response};

    use super::UserSearch;

    /// [`Api`] answering with a single [`User`] named after the query.
    #[derive(Clone, Debug, Default)]
    struct Mock {
        /// Queries of the received requests.
        queries: Rc<RefCell<Vec<String>>>,

        /// Queries to fail.
        failing: Rc<RefCell<Vec<String>>>,
    }

    impl Mock {
        fn queries(&self) -> Vec<String> {
            self.queries.borrow().clone()
        }

        fn fail(&self, query: &str) {
            self.failing.borrow_mut().push(query.to_owned());
        }

        fn recover(&self) {
            self.failing.borrow_mut().clear();
        }
    }

    impl Api<Params> for Mock {
        type Ok = Response;
        type Err = Traced<api::Error>;

        async fn execute(&self, params: Params) -> Result<Response, Self::Err> {
            self.queries.borrow_mut().push(params.query.clone());

            // Queries starting with `slow` take longer to answer.
            let delay = if params.query.starts_with("slow") {
                Duration::from_secs(1)
            } else {
                Duration::from_millis(100)
            };
            time::sleep(delay).await;

            if self.failing.borrow().contains(&params.query) {
                return Err(tracerr::new!(api::Error::Status(
                    StatusCode::BAD_GATEWAY
                )));
            }
            Ok(Response {
                data: vec![User {
                    id: user::Id::new(),
                    email: "user@example.com".into(),
                    name: Name::new(params.query.clone(), "Doe"),
                    picture: Picture {
                        large: "https://example.com/user.jpg".to_owned(),
                    },
                    nationality: "US".into(),
                }],
                meta: Meta {
                    total: 1,
                    total_all: 50,
                    page: params.arguments.page.get(),
                    page_size: params.arguments.page_size.get(),
                    has_more: false,
                    nationalities: vec!["US".into()],
                },
            })
        }
    }

    fn params(query: &str) -> Params {
        Params::new(query, "ALL", 1, 50)
    }

    fn first_name(search: &UserSearch) -> Option<String> {
        search
            .state()
            .data
            .map(|d| d.data[0].name.first.clone())
    }

    async fn settle() {
        time::sleep(Duration::from_secs(2)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn fetches_initial_params_immediately() {
        LocalSet::new()
            .run_until(async {
                let api = Mock::default();
                let search = UserSearch::spawn(api.clone(), params("ann"));

                time::sleep(Duration::from_millis(10)).await;
                let state = search.state();
                assert!(state.is_loading);
                assert!(state.is_fetching);
                assert_eq!(api.queries(), ["ann"]);

                time::sleep(Duration::from_millis(100)).await;
                let state = search.state();
                assert!(!state.is_loading);
                assert!(!state.is_fetching);
                assert!(!state.is_error());
                assert_eq!(first_name(&search).as_deref(), Some("ann"));
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn debounces_rapid_changes() {
        LocalSet::new()
            .run_until(async {
                let api = Mock::default();
                let search = UserSearch::spawn(api.clone(), params(""));
                settle().await;

                search.set_params(params("a"));
                time::sleep(Duration::from_millis(100)).await;
                search.set_params(params("ab"));
                time::sleep(Duration::from_millis(200)).await;
                assert_eq!(api.queries(), [""]);

                settle().await;
                assert_eq!(api.queries(), ["", "ab"]);
                assert_eq!(search.state().params.query, "ab");
                assert_eq!(first_name(&search).as_deref(), Some("ab"));
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn skips_unchanged_params() {
        LocalSet::new()
            .run_until(async {
                let api = Mock::default();
                let search = UserSearch::spawn(api.clone(), params("ann"));
                settle().await;

                search.set_params(params("bob"));
                search.set_params(params("ann"));
                settle().await;

                assert_eq!(api.queries(), ["ann"]);
                assert_eq!(search.state().generation, 1);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn keeps_stale_data_while_fetching() {
        LocalSet::new()
            .run_until(async {
                let api = Mock::default();
                let search = UserSearch::spawn(api.clone(), params("ann"));
                settle().await;

                search.set_params(params("bob"));
                time::sleep(Duration::from_millis(300)).await;

                let state = search.state();
                assert!(state.is_fetching);
                assert!(!state.is_loading);
                assert_eq!(state.params.query, "bob");
                assert_eq!(first_name(&search).as_deref(), Some("ann"));

                settle().await;
                assert!(!search.state().is_fetching);
                assert_eq!(first_name(&search).as_deref(), Some("bob"));
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn ignores_superseded_responses() {
        LocalSet::new()
            .run_until(async {
                let api = Mock::default();
                let search = UserSearch::spawn(api.clone(), params(""));
                settle().await;

                search.set_params(params("slow"));
                time::sleep(Duration::from_millis(300)).await;
                search.set_params(params("fast"));
                settle().await;

                assert_eq!(api.queries(), ["", "slow", "fast"]);
                let state = search.state();
                assert_eq!(state.generation, 3);
                assert_eq!(state.params.query, "fast");
                assert!(!state.is_fetching);
                assert_eq!(first_name(&search).as_deref(), Some("fast"));
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn serves_fresh_responses_from_cache() {
        LocalSet::new()
            .run_until(async {
                let api = Mock::default();
                let search = UserSearch::spawn(api.clone(), params("ann"));
                settle().await;
                search.set_params(params("bob"));
                settle().await;

                search.set_params(params("ann"));
                time::sleep(Duration::from_millis(260)).await;

                let state = search.state();
                assert!(!state.is_fetching);
                assert_eq!(state.params.query, "ann");
                assert_eq!(state.generation, 3);
                assert_eq!(first_name(&search).as_deref(), Some("ann"));
                assert_eq!(api.queries(), ["ann", "bob"]);

                time::sleep(Duration::from_secs(60)).await;
                search.set_params(params("bob"));
                settle().await;

                assert_eq!(api.queries(), ["ann", "bob", "bob"]);
                assert_eq!(first_name(&search).as_deref(), Some("bob"));
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn refetches_after_failure() {
        LocalSet::new()
            .run_until(async {
                let api = Mock::default();
                api.fail("ann");
                let search = UserSearch::spawn(api.clone(), params("ann"));
                settle().await;

                let state = search.state();
                assert!(state.is_error());
                assert!(!state.is_loading);
                assert!(state.data.is_none());

                api.recover();
                search.refetch();
                settle().await;

                let state = search.state();
                assert!(!state.is_error());
                assert_eq!(api.queries(), ["ann", "ann"]);
                assert_eq!(first_name(&search).as_deref(), Some("ann"));
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn notifies_about_changes() {
        LocalSet::new()
            .run_until(async {
                let mut search =
                    UserSearch::spawn(Mock::default(), params("ann"));

                assert!(search.changed().await);
                assert!(search.changed().await);
                assert!(search.state().data.is_some());
            })
            .await;
    }
}
