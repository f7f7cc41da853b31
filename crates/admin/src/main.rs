//! Farmácia Mais Saúde back-office binary.
//!
//! Staff manage products, categories, orders, customers, testimonials and the
//! store settings here. Pages are server-rendered with no client-side scripts.
//! Admin accounts and their sessions live in the `admin` schema; everything
//! else is the `shop` schema shared with the storefront.
//!
//! Serves plain HTTP behind a proxy, or HTTPS itself when `ADMIN_TLS_CERT`
//! and `ADMIN_TLS_KEY` are set.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::borrow::Cow;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::{Request, Response, StatusCode};
use axum::middleware::from_fn;
use axum::routing::get;
use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use secrecy::ExposeSecret;
use sentry::integrations::tracing::{self as sentry_tracing, EventFilter};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::{Level, Span};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use mais_saude_admin::config::{AdminConfig, TlsConfig};
use mais_saude_admin::middleware::{create_session_layer, security_headers_middleware};
use mais_saude_admin::routes;
use mais_saude_admin::state::AppState;
use mais_saude_core::config::SentryConfig;

const DEFAULT_LOG_FILTER: &str = "mais_saude_admin=info,tower_http=debug";
const STATIC_DIR: &str = "crates/admin/static";
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("failed to install the rustls crypto provider");

    let config = AdminConfig::from_env().expect("invalid admin configuration");

    // The Sentry client must exist before the subscriber installs its layer.
    let sentry_guard = init_sentry(&config.sentry);
    init_tracing();
    tracing::info!(error_reporting = sentry_guard.is_some(), "admin starting");

    let pool = mais_saude_admin::db::create_pool(&config.database_url)
        .await
        .expect("failed to connect to PostgreSQL");

    let listen = config.listen;
    let tls = config.tls.clone();
    let app = app(AppState::new(config, pool));

    match tls {
        Some(tls) => serve_tls(app, listen, &tls).await,
        None => serve_plain(app, listen).await,
    }
}

fn app(state: AppState) -> Router {
    let sessions = create_session_layer(state.pool(), state.config());

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(sessions)
        .layer(from_fn(security_headers_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "admin_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response<_>, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                    DefaultOnResponse::default().on_response(response, latency, span);
                }),
        )
        .with_state(state)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

async fn serve_plain(app: Router, listen: SocketAddr) {
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {listen}: {e}"));
    tracing::info!("admin listening on http://{listen}");

    // Connect info is the login rate limiter's fallback key.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("server error");
}

async fn serve_tls(app: Router, listen: SocketAddr, tls: &TlsConfig) {
    let rustls = RustlsConfig::from_pem(
        tls.cert_pem.as_bytes().to_vec(),
        tls.key_pem.expose_secret().as_bytes().to_vec(),
    )
    .await
    .expect("failed to load the TLS certificate and key");

    let handle = Handle::new();
    tokio::spawn({
        let handle = handle.clone();
        async move {
            shutdown_signal().await;
            handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        }
    });

    tracing::info!("admin listening on https://{listen}");
    axum_server::bind_rustls(listen, rustls)
        .handle(handle)
        .serve(app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .expect("server error");
}

fn init_sentry(config: &SentryConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.dsn.as_deref()?;
    let options = sentry::ClientOptions {
        release: sentry::release_name!(),
        environment: config.environment.clone().map(Cow::Owned),
        sample_rate: config.sample_rate,
        traces_sample_rate: config.traces_sample_rate,
        attach_stacktrace: true,
        send_default_pii: false,
        ..Default::default()
    };
    Some(sentry::init((dsn, options)))
}

/// JSON lines on Fly.io (`FLY_APP_NAME` set), human-readable text elsewhere.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    let on_fly = std::env::var_os("FLY_APP_NAME").is_some();
    let json = on_fly.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text = (!on_fly).then(tracing_subscriber::fmt::layer);

    let sentry_layer = sentry_tracing::layer().event_filter(|meta| match *meta.level() {
        Level::ERROR | Level::WARN => EventFilter::Event,
        Level::INFO | Level::DEBUG => EventFilter::Breadcrumb,
        _ => EventFilter::Ignore,
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(text)
        .with(sentry_layer)
        .init();
}

/// 200 while the database answers, 503 otherwise.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(state.pool())
        .await
        .map_or(StatusCode::SERVICE_UNAVAILABLE, |_| StatusCode::OK)
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("shutdown requested, draining connections");
}
