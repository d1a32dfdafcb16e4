use std::error::Error;
use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use super::routes;
use super::state::AppState;

/// Builds the API router with CORS, request tracing and the upload limit applied.
pub fn build_router(state: Arc<AppState>, config: &ServerConfig) -> Result<Router, Box<dyn Error + Send + Sync>> {
    let origin = HeaderValue::from_str(&config.frontend_url)
        .map_err(|e| format!("Invalid frontend_url {}: {}", config.frontend_url, e))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let app = Router::new()
        .route("/", get(routes::index))
        .route("/api/health", get(routes::health_check))
        .route("/api/predict", post(routes::predict))
        .route("/api/symptoms", post(routes::analyze_symptoms))
        .route("/api/diagnoses", get(routes::list_records).post(routes::create_record))
        .route("/api/diagnoses/{id}", get(routes::get_record))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    Ok(app)
}

/// API Server for the analysis endpoints
pub struct ApiServer {
    state: Arc<AppState>,
    config: ServerConfig,
}

impl ApiServer {
    pub fn new(state: AppState, config: ServerConfig) -> Self {
        info!("Creating new API server on {}:{}", config.host, config.port);
        Self {
            state: Arc::new(state),
            config,
        }
    }

    pub async fn start(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let app = build_router(Arc::clone(&self.state), &self.config)?;

        info!("Starting server on {}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind((self.config.host.as_str(), self.config.port)).await?;

        info!("Server started successfully");
        axum::serve(listener, app).await?;
        Ok(())
    }
}
