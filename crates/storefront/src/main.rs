//! Farmácia Mais Saúde storefront binary.
//!
//! Serves the public catalog, the session cart, customer accounts and the
//! WhatsApp checkout hand-off. Catalog data and store settings are only read
//! here; the admin binary owns them.
//!
//! Migrations are applied separately with `ms-cli migrate storefront`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::borrow::Cow;
use std::net::SocketAddr;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::routing::get;
use sentry::integrations::tracing::{self as sentry_tracing, EventFilter};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use mais_saude_core::config::SentryConfig;
use mais_saude_storefront::config::StorefrontConfig;
use mais_saude_storefront::state::AppState;
use mais_saude_storefront::{db, middleware, routes};

const DEFAULT_LOG_FILTER: &str = "mais_saude_storefront=info,tower_http=debug";
const STATIC_DIR: &str = "crates/storefront/static";

#[tokio::main]
async fn main() {
    let config = StorefrontConfig::from_env().expect("invalid storefront configuration");

    // The Sentry client must exist before the subscriber installs its layer.
    let sentry_guard = init_sentry(&config.sentry);
    init_tracing();
    tracing::info!(error_reporting = sentry_guard.is_some(), "storefront starting");

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("failed to connect to PostgreSQL");

    let listen = config.listen;
    let app = app(AppState::new(config, pool));

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {listen}: {e}"));
    tracing::info!(%listen, "storefront listening");

    // Connect info is the rate limiter's fallback key.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("server error");
}

fn app(state: AppState) -> Router {
    let sessions = middleware::create_session_layer(state.pool(), state.config());

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(sessions)
        .layer(from_fn(middleware::security_headers_middleware))
        .layer(from_fn(middleware::csp_nonce_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(middleware::request_id_middleware))
        .with_state(state)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

fn init_sentry(config: &SentryConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.dsn.as_deref()?;
    let options = sentry::ClientOptions {
        release: sentry::release_name!(),
        environment: config.environment.clone().map(Cow::Owned),
        sample_rate: config.sample_rate,
        traces_sample_rate: config.traces_sample_rate,
        attach_stacktrace: true,
        ..Default::default()
    };
    Some(sentry::init((dsn, options)))
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    // Warnings and errors become Sentry events; info and debug ride along as breadcrumbs.
    let sentry_layer = sentry_tracing::layer().event_filter(|meta| match *meta.level() {
        Level::ERROR | Level::WARN => EventFilter::Event,
        Level::INFO | Level::DEBUG => EventFilter::Breadcrumb,
        _ => EventFilter::Ignore,
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
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
