//! Field Report Server
//!
//! Serves agronomic field reports (monitoring, planting quality, technical
//! visit, side-by-side trials) through public share links and owner routes,
//! with monitoring metrics and recommendations computed on every read.

use axum::{routing::get, Router};
use anyhow::Context;
use shared::KnowledgeBase;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod handlers;
mod middleware;
mod routes;
mod services;
mod store;

pub use config::Config;

use services::ReportService;
use store::ReportStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: ReportStore,
    pub config: Arc<Config>,
    pub knowledge: Arc<KnowledgeBase>,
}

impl AppState {
    pub fn report_service(&self) -> ReportService {
        ReportService::new(
            self.store.clone(),
            self.knowledge.clone(),
            self.config.fallback.mock_enabled,
        )
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fieldreport_server=debug,tower_http=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    tracing::info!("Starting Field Report Server");
    tracing::info!("Environment: {}", config.environment);

    let store = ReportStore::connect(&config).await?;
    tracing::info!("Report store: {:?}", store.source());

    let knowledge = load_knowledge(&config)?;
    tracing::info!("Recommendation table loaded with {} entries", knowledge.len());

    if !config.diagnostics.enabled {
        tracing::debug!("Share diagnostics endpoint disabled");
    }

    // Create application state
    let state = AppState {
        store,
        config: Arc::new(config.clone()),
        knowledge: Arc::new(knowledge),
    };

    // Build application
    let app = create_app(state);

    // Start server
    let host: std::net::IpAddr = config
        .server
        .host
        .parse()
        .with_context(|| format!("invalid server.host {}", config.server.host))?;
    let addr = SocketAddr::from((host, config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Built-in organism table, or the configured replacement
fn load_knowledge(config: &Config) -> anyhow::Result<KnowledgeBase> {
    match config.recommendations.table_path.as_deref() {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading recommendation table {}", path))?;
            KnowledgeBase::from_json(&raw)
                .with_context(|| format!("parsing recommendation table {}", path))
        }
        None => Ok(KnowledgeBase::builtin()),
    }
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Field Report API v1"
}
