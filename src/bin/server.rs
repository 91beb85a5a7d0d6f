use std::{
    env,
    fs::OpenOptions,
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use time::Duration;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use fintrack::{
    AppState, SessionEvent, SupabaseClient, build_router, graceful_shutdown, logging_middleware,
};

/// The web server for FinTrack.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The port to serve the app from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The IP address to listen on.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// The base URL of the hosted backend, e.g. "https://abc.supabase.co".
    #[arg(long)]
    backend_url: String,

    /// The canonical name of the local timezone, e.g. "Asia/Jakarta".
    #[arg(long, default_value = "Asia/Jakarta")]
    timezone: String,

    /// How long a session cookie stays valid without activity, in minutes.
    #[arg(long, default_value_t = 60)]
    cookie_minutes: i64,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let ip: IpAddr = args
        .host
        .parse()
        .unwrap_or_else(|error| panic!("Invalid host \"{}\": {error}", args.host));
    let addr = SocketAddr::new(ip, args.port);

    let secret = env::var("SECRET").expect("The environment variable 'SECRET' must be set");
    let anon_key = env::var("BACKEND_ANON_KEY")
        .expect("The environment variable 'BACKEND_ANON_KEY' must be set");

    if time_tz::timezones::get_by_name(&args.timezone).is_none() {
        panic!("Unknown timezone \"{}\"", args.timezone);
    }

    let backend = Arc::new(SupabaseClient::new(&args.backend_url, &anon_key));
    let state = AppState::new(&secret, &args.timezone, backend.clone(), backend)
        .with_cookie_duration(Duration::minutes(args.cookie_minutes));

    let session_listener = state.session_events.listen(log_session_event);

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(
        build_router(state).layer(middleware::from_fn(logging_middleware)),
    );

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    tracing::info!("HTTP server listening on {}", addr);
    let result = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await;

    session_listener.shutdown().await;

    if let Err(error) = result {
        tracing::error!("Server stopped with an error: {error}");
    }
}

fn log_session_event(event: SessionEvent) {
    match event {
        SessionEvent::SignedIn(email) => tracing::info!("{email} signed in"),
        SessionEvent::SignedUp(email) => tracing::info!("{email} signed up"),
        SessionEvent::Refreshed(email) => tracing::debug!("refreshed the session for {email}"),
        SessionEvent::SignedOut(email) => tracing::info!("{email} signed out"),
        SessionEvent::Expired => tracing::info!("a session expired and was discarded"),
    }
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(filter::LevelFilter::INFO);

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file))
        .with_filter(filter::LevelFilter::DEBUG);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_log)
        .with(debug_log)
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
