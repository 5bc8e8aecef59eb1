//! HTTP surface and bulk loader around the import pipeline.

use std::path::Path;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use finboard_storage::{create_db, DbPool};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod routes;
pub mod state;

use config::Config;
use state::AppState;

/// All `/api` routes with CORS, request tracing and the upload size cap.
pub fn app(state: AppState) -> anyhow::Result<Router> {
    let api = Router::new()
        .route("/health", get(routes::health))
        .route("/transactions", get(routes::transactions::list))
        .route("/summary", get(routes::summary::get_summary))
        .route("/upload", post(routes::upload::upload))
        .route("/sources", get(routes::sources));

    let router = Router::new()
        .nest("/api", api)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(state.config.max_upload_bytes))
        .layer(cors(&state.config)?)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(router)
}

fn cors(config: &Config) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods([Method::GET, Method::POST, Method::OPTIONS]);

    let layer = match &config.cors_origin {
        Some(origin) => layer
            .allow_origin(
                origin
                    .parse::<HeaderValue>()
                    .with_context(|| format!("invalid cors_origin '{origin}'"))?,
            )
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT]),
        None => layer.allow_origin(Any).allow_headers(Any),
    };

    Ok(layer)
}

/// Opens the database, creating its directory first when needed.
pub async fn open_database(path: &Path) -> anyhow::Result<DbPool> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    create_db(path)
        .await
        .with_context(|| format!("opening database {}", path.display()))
}
