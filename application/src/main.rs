use std::{io, sync::OnceLock, time::Duration};

use application::{api, Args, Config};
use axum::extract::MatchedPath;
use axum_client_ip::InsecureClientIp;
use service::{
    infra::{random_user, Memoized, RandomUser},
    Service,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing as log;
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, MakeWriter},
    layer::{Layer, SubscriberExt as _},
    registry::LookupSpan,
    util::SubscriberInitExt as _,
};

/// Levels written to the stderr instead of the stdout.
const STDERR_LEVELS: &[log::Level] = &[log::Level::WARN, log::Level::ERROR];

/// Maximum level being logged, set once the [`Config`] is loaded.
static LOG_LEVEL: OnceLock<log::Level> = OnceLock::new();

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(output(io::stdout, false))
        .with(output(io::stderr, true))
        .init();

    _ = start().await;
}

/// Creates a [`fmt`] layer writing events of either [`STDERR_LEVELS`] or all
/// the other ones to the provided `writer`.
fn output<S, W>(writer: W, errors: bool) -> impl Layer<S>
where
    S: log::Subscriber + for<'s> LookupSpan<'s>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::layer()
        .compact()
        .with_writer(writer)
        .with_filter(filter_fn(move |meta| {
            let max = LOG_LEVEL.get().copied().unwrap_or(log::Level::INFO);
            meta.is_span()
                || STDERR_LEVELS.contains(meta.level()) == errors
                    && max >= *meta.level()
        }))
}

async fn start() -> Result<(), ()> {
    let args = Args::parse().map_err(|e| {
        log::error!("failed to parse command line arguments: {e}");
    })?;

    let Config {
        mut server,
        upstream,
        search,
        log,
    } = Config::new(&args.config).map_err(|e| {
        log::error!("failed to load `Config`: {e}");
    })?;
    args.apply(&mut server);

    _ = LOG_LEVEL.set(log.level.into());

    let upstream_config =
        random_user::Config::try_from(upstream).map_err(|e| {
            log::error!("invalid upstream URL: {e}");
        })?;
    let upstream = RandomUser::new(upstream_config).map_err(|e| {
        log::error!("failed to initialize `RandomUser` client: {e}");
    })?;

    let service = Service::new(search.into(), Memoized::new(upstream));
    let settings = api::search::Settings {
        default_page_size: search.default_page_size,
    };

    let mut cors = CorsLayer::new()
        .allow_methods([http::Method::GET, http::Method::OPTIONS])
        .allow_headers([http::header::CONTENT_TYPE]);
    for origin in server.cors.origins {
        cors = cors.allow_origin(
            origin.parse::<http::header::HeaderValue>().map_err(|e| {
                log::error!("`{origin}` is not a valid CORS origin: {e}");
            })?,
        );
    }

    let app = application::router(service, settings)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|r: &http::Request<_>| {
                    let client_ip =
                        InsecureClientIp::from(r.headers(), r.extensions())
                            .map(|ip| ip.0.to_string())
                            .ok();
                    let route = r
                        .extensions()
                        .get::<MatchedPath>()
                        .map(MatchedPath::as_str);
                    log::info_span!(
                        "HTTP request",
                        http.client_ip = client_ip,
                        http.method = %r.method(),
                        http.route = route,
                        http.target = %r.uri(),
                        http.status_code = log::field::Empty,
                    )
                })
                .on_response(
                    |r: &http::Response<_>, dur: Duration, span: &log::Span| {
                        _ = span
                            .record("http.status_code", r.status().as_u16());
                        if r.status().is_server_error() {
                            log::warn!(duration = ?dur, "request failed");
                        } else {
                            log::info!(duration = ?dur, "request served");
                        }
                    },
                ),
        );

    let listener = TcpListener::bind((server.host.clone(), server.port))
        .await
        .map_err(|e| {
            log::error!(
                "failed to listen on `{}:{}`: {e}",
                server.host,
                server.port,
            );
        })?;

    log::info!("listening on `{}:{}`", server.host, server.port);

    axum::serve(listener, app).await.map_err(|e| {
        log::error!("webserver failed: {e}");
    })
}
