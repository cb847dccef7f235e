//! # codecamp: Code Camp Conference Service
//!
//! `codecamp` serves a small REST API for running code camps: the camps themselves (addressed by a
//! short, unique *moniker* such as `NDCOSLO`), the talks given at each camp and the speakers giving
//! them.
//!
//! ## Architecture
//!
//! The service is an [Axum](https://github.com/tokio-rs/axum) application backed by SQLite through
//! [SQLx](https://github.com/launchbadge/sqlx):
//!
//! - **[`api`]**: HTTP handlers and the JSON request/response models
//! - **[`db`]**: the [`CampRepository`](db::handlers::CampRepository) contract and its SQLite
//!   implementation, a per-request session that stages changes and commits them atomically
//! - **[`config`]**: YAML + environment configuration via figment
//! - **[`telemetry`]**: `tracing` subscriber setup
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use codecamp::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Parse CLI arguments and load configuration
//!     let args = codecamp::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     codecamp::telemetry::init_telemetry(config.log_format)?;
//!
//!     // Create and start the application
//!     let app = Application::new(config).await?;
//!
//!     // Run with graceful shutdown on Ctrl+C
//!     app.serve(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     }).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Database Setup
//!
//! Migrations are embedded in the binary and run on startup. They can also be applied by hand:
//!
//! ```no_run
//! # use sqlx::SqlitePool;
//! # async fn example(pool: SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
//! codecamp::migrator().run(&pool).await?;
//! # Ok(())
//! # }
//! ```
pub mod api;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod telemetry;
pub mod types;

#[cfg(test)]
pub mod test_utils;

use crate::api::handlers::{camps, talks};
use crate::openapi::ApiDoc;
use axum::{
    Json, Router,
    http::{self, HeaderValue, Method},
    routing::get,
};
use bon::Builder;
pub use config::Config;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::str::FromStr;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{CampId, SpeakerId, TalkId};

/// Application state shared across all request handlers.
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .db(pool)
///     .config(config)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
}

/// Get the codecamp database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Open the SQLite pool described by the config and bring the schema up to date.
///
/// Foreign keys are enforced on every connection and the database runs in WAL mode. Note that
/// `sqlite::memory:` gives each pooled connection its own empty database.
async fn setup_database(config: &Config) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database.url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal);

    let settings = &config.database.pool;
    let pool = SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(settings.acquire_timeout)
        .connect_with(options)
        .await?;

    migrator().run(&pool).await?;
    info!("Database ready at {}", config.database.url);

    Ok(pool)
}

fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let allowed = &config.cors.allowed_origins;
    // A wildcard cannot be mixed into an origin list, so it replaces the list
    let allow_origin = if allowed.iter().any(|origin| origin == "*") {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in allowed {
            origins.push(origin.parse::<HeaderValue>()?);
        }
        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([http::header::CONTENT_TYPE])
        .expose_headers(vec![http::header::LOCATION]))
}

/// Build the application router.
///
/// - `/healthz` liveness probe
/// - `/api/camps/...` resource routes
/// - `/api/openapi.json` and the Scalar UI at `/api/docs`
/// - CORS and request tracing on everything
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let cors = create_cors_layer(&state.config)?;

    let api_routes = Router::new()
        .route("/camps", get(camps::list_camps).post(camps::create_camp))
        .route("/camps/searchByDate/{date}", get(camps::search_camps_by_date))
        .route(
            "/camps/{moniker}",
            get(camps::get_camp).put(camps::update_camp).delete(camps::delete_camp),
        )
        .route("/camps/{moniker}/talks", get(talks::list_talks).post(talks::create_talk))
        .route(
            "/camps/{moniker}/talks/{talk_id}",
            get(talks::get_talk).put(talks::update_talk).delete(talks::delete_talk),
        )
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }));

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .nest("/api", api_routes)
        .with_state(state)
        .merge(Scalar::with_url("/api/docs", ApiDoc::openapi()))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    Ok(router)
}

pub struct Application {
    router: Router,
    config: Config,
    pool: SqlitePool,
}

impl Application {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::new_with_pool(config, None).await
    }

    /// Build the application on an existing pool (which must already be migrated), or open one
    /// from the config when `pool` is `None`.
    pub async fn new_with_pool(config: Config, pool: Option<SqlitePool>) -> anyhow::Result<Self> {
        debug!("Starting codecamp with configuration: {:#?}", config);

        let pool = match pool {
            Some(pool) => pool,
            None => setup_database(&config).await?,
        };

        let app_state = AppState::builder().db(pool.clone()).config(config.clone()).build();
        let router = build_router(app_state)?;

        Ok(Self { router, config, pool })
    }

    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Codecamp listening on http://{}, docs at http://localhost:{}/api/docs",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}
