//! # tickerdeck: stock-monitoring dashboard backend
//!
//! `tickerdeck` is the REST backend for a consumer stock-monitoring
//! dashboard. Users maintain a personal watchlist, view model-generated
//! buy/sell signals and historical predictions, and receive web-push
//! notifications. Identity is auth-lite: the client mints an anonymous UUID
//! on first load and can later upgrade it to a named account. Subscription
//! billing (free/pro tiers) runs through a pluggable payment provider.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for
//! the HTTP layer and uses PostgreSQL for all persistence needs. It can
//! operate with either an embedded PostgreSQL instance (useful for
//! development) or an external PostgreSQL database (a managed replica in
//! production). That choice is made exactly once at startup from
//! configuration; request handlers only ever see a single connection pool.
//!
//! ### Request Flow
//!
//! Every request follows the same one-way path: HTTP request → route handler
//! → repository → SQL → JSON response. Handlers are independent; there is no
//! shared orchestration, no background worker, and no queue. The one piece
//! of resilience machinery is [`db::retry`], which re-runs transiently
//! failing writes a bounded number of times.
//!
//! ### Core Components
//!
//! The **API layer** ([`api`]) exposes the REST surface under `/api/*`:
//! registration, watchlist management, market data, signals, push
//! subscriptions, notification settings, and billing.
//!
//! The **identity layer** ([`auth`]) resolves the `x-user-id` header into a
//! user row. There are no sessions or passwords.
//!
//! The **database layer** ([`db`]) uses the repository pattern to abstract
//! data access. Each entity has a corresponding repository that handles
//! queries and mutations.
//!
//! **Collaborators** are wrapped in small service structs constructed at
//! startup: [`push::PushService`] (web-push delivery),
//! [`payment_providers`] (Stripe or a test dummy), and
//! [`sync::WorkflowDispatcher`] (external data-ingestion trigger).
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use tickerdeck::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = tickerdeck::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     tickerdeck::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod payment_providers;
pub mod push;
pub mod sync;
pub mod telemetry;
pub mod types;

#[cfg(test)]
mod test;
#[cfg(test)]
pub mod test_utils;

use std::sync::Arc;

use axum::{Router, http::HeaderValue, routing::{delete, get, patch, post, put}};
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use config::Config;
pub use types::{PushSubscriptionId, UserId};

use crate::{openapi::ApiDoc, payment_providers::PaymentProvider, push::PushService, sync::WorkflowDispatcher};

/// Application state shared across all request handlers.
///
/// Everything here is either immutable configuration or an internally
/// synchronized handle; request handlers hold no other shared state.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub push: Option<Arc<PushService>>,
    pub payment: Option<Arc<dyn PaymentProvider>>,
    pub dispatcher: Option<Arc<WorkflowDispatcher>>,
}

impl AppState {
    /// Build the state from configuration and an already-connected pool,
    /// constructing each optional collaborator exactly once.
    pub fn from_config(config: Config, db: PgPool) -> Self {
        let push = config.push.as_ref().map(|push_config| Arc::new(PushService::new(push_config)));
        let payment = config
            .payment
            .clone()
            .map(|payment_config| Arc::from(payment_providers::create_provider(payment_config)));
        let dispatcher = config
            .data_sync
            .clone()
            .map(|sync_config| Arc::new(WorkflowDispatcher::new(sync_config)));

        Self {
            db,
            config,
            push,
            payment,
            dispatcher,
        }
    }
}

/// Get the tickerdeck database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Setup database connections and run migrations.
/// Returns: (embedded_db, pool)
async fn setup_database(config: &Config) -> anyhow::Result<(Option<EmbeddedHandle>, PgPool)> {
    // Database connection - handle both embedded and external
    let (embedded_db, database_url) = match &config.database {
        config::DatabaseConfig::Embedded { .. } => {
            let persistent = config.database.embedded_persistent();
            info!("Starting with embedded database (persistent: {})", persistent);
            if !persistent {
                info!("persistent=false: database will be ephemeral and data will be lost on shutdown");
            }
            #[cfg(feature = "embedded-db")]
            {
                let data_dir = config.database.embedded_data_dir();
                let embedded_db = db::embedded::EmbeddedDatabase::start(data_dir, persistent).await?;
                let url = embedded_db.connection_string().to_string();
                (Some(embedded_db), url)
            }
            #[cfg(not(feature = "embedded-db"))]
            {
                anyhow::bail!(
                    "Embedded database is configured but the feature is not enabled. \
                     Rebuild with --features embedded-db to use embedded database."
                );
            }
        }
        config::DatabaseConfig::External { url } => {
            info!("Using external database");
            (None, url.clone())
        }
    };

    let pool = PgPool::connect(&database_url).await?;
    migrator().run(&pool).await?;

    Ok((embedded_db, pool))
}

#[cfg(feature = "embedded-db")]
type EmbeddedHandle = db::embedded::EmbeddedDatabase;
#[cfg(not(feature = "embedded-db"))]
type EmbeddedHandle = std::convert::Infallible;

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    if config.cors_allowed_origins.iter().any(|origin| origin == "*") {
        return Ok(CorsLayer::new().allow_origin(Any).allow_headers(Any).allow_methods(Any));
    }

    let mut origins = Vec::new();
    for origin in &config.cors_allowed_origins {
        origins.push(origin.parse::<HeaderValue>()?);
    }

    Ok(CorsLayer::new().allow_origin(origins).allow_headers(Any).allow_methods(Any))
}

/// Build the main application router with all endpoints and middleware.
///
/// This function constructs the complete Axum router with:
/// - The REST API under `/api/*`
/// - Payment provider webhooks
/// - API documentation at `/docs`
/// - CORS configuration and tracing middleware
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    let api_routes = Router::new()
        // Registration and profiles
        .route("/users/register", post(api::handlers::users::register))
        .route("/users/me", get(api::handlers::users::get_me))
        .route("/users/me", patch(api::handlers::users::update_me))
        .route("/users/me/referral", get(api::handlers::users::get_referral))
        // Watchlist
        .route("/watchlist", get(api::handlers::watchlist::list_watchlist))
        .route("/watchlist", post(api::handlers::watchlist::add_to_watchlist))
        .route("/watchlist/{symbol}", delete(api::handlers::watchlist::remove_from_watchlist))
        // Market data
        .route("/stocks", get(api::handlers::stocks::list_stocks))
        .route("/stocks/search", get(api::handlers::stocks::search_stocks))
        .route("/stocks/{symbol}", get(api::handlers::stocks::get_stock))
        .route("/stocks/{symbol}/prices", get(api::handlers::stocks::get_prices))
        .route("/stocks/{symbol}/predictions", get(api::handlers::predictions::get_prediction_history))
        .route("/signals", get(api::handlers::predictions::get_signals))
        .route("/onboarding/stocks", get(api::handlers::stocks::onboarding_stocks))
        // Push subscriptions and settings
        .route("/push/key", get(api::handlers::push::vapid_key))
        .route("/push/subscribe", post(api::handlers::push::subscribe))
        .route("/push/unsubscribe", post(api::handlers::push::unsubscribe))
        .route("/push/test", post(api::handlers::push::send_test))
        .route("/notification-settings", get(api::handlers::notification_settings::get_settings))
        .route("/notification-settings", put(api::handlers::notification_settings::put_settings))
        // Billing
        .route("/billing/status", get(api::handlers::payments::billing_status))
        .route("/billing/checkout", post(api::handlers::payments::create_checkout))
        .route("/billing/portal", post(api::handlers::payments::create_portal))
        // Webhook routes (external services, not part of client API docs)
        .route("/webhooks/payments", post(api::handlers::payments::webhook_handler))
        // Admin / ops
        .route("/admin/sync", post(api::handlers::sync::trigger_sync))
        .route("/config", get(api::handlers::config::get_config))
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .nest("/api", api_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    // Create CORS layer from config
    let cors_layer = create_cors_layer(&state.config)?;
    let router = router.layer(cors_layer);

    // Add tracing layer
    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct that owns all resources and lifecycle.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] resolves the database backend, runs
///    migrations, and constructs the collaborator services
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts
///    handling requests
/// 3. **Shutdown**: when the shutdown future resolves, connections are
///    closed and the embedded database (if any) is stopped
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
    _embedded_db: Option<EmbeddedHandle>,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting tickerdeck with configuration: {:#?}", config);

        let (embedded_db, pool) = setup_database(&config).await?;

        let state = AppState::from_config(config.clone(), pool.clone());
        let router = build_router(&state)?;

        Ok(Self {
            router,
            config,
            pool,
            _embedded_db: embedded_db,
        })
    }

    /// Create an application around an existing pool (tests). Skips backend
    /// selection; the pool is assumed migrated.
    pub async fn new_with_pool(config: Config, pool: PgPool) -> anyhow::Result<Self> {
        let state = AppState::from_config(config.clone(), pool.clone());
        let router = build_router(&state)?;

        Ok(Self {
            router,
            config,
            pool,
            _embedded_db: None,
        })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "tickerdeck listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        // Close database connections
        info!("Closing database connections...");
        self.pool.close().await;

        // Clean up embedded database if it exists
        #[cfg(feature = "embedded-db")]
        if let Some(embedded_db) = self._embedded_db {
            info!("Shutting down embedded database...");
            embedded_db.stop().await?;
        }

        Ok(())
    }
}
