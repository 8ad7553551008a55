//! AquaWatch STModel Server
//!
//! Water quality prediction service: 14 days of sensor and satellite
//! data in, a quality score and category out.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    STMODEL SERVER                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌───────────────┐  ┌─────────────────────┐ │
//! │  │  API      │  │  Feed Fetcher │  │  Scoring Context    │ │
//! │  │  (Axum)   │  │  (reqwest)    │  │  (stmodel-core)     │ │
//! │  └─────┬─────┘  └───────┬───────┘  └──────────┬──────────┘ │
//! │        └────────────────┼─────────────────────┘            │
//! │                         ▼                                   │
//! │                  ┌─────────────┐                           │
//! │                  │ PostgreSQL  │ (optional)                │
//! │                  └─────────────┘                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;
mod error;
mod fetcher;
mod handlers;
mod models;
mod publisher;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stmodel_core::ScoringContext;

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    init_tracing(&config);
    tracing::info!("STModel Server starting...");

    // Load model artifacts (blocking, once)
    let context = Arc::new(ScoringContext::new());
    let loader = context.clone();
    let artifacts = config.artifacts.clone();
    match tokio::task::spawn_blocking(move || loader.load(&artifacts)).await? {
        Ok(()) => tracing::info!("Model loaded: {}", config.artifacts.model),
        Err(e) => tracing::warn!("Model not loaded, starting in degraded mode: {}", e),
    }

    // Database is optional
    let store = match &config.database_url {
        Some(url) => {
            tracing::info!("Database: {}", url.split('@').last().unwrap_or("***"));
            match db::create_pool(url).await {
                Ok(pool) => Some(db::PredictionStore::new(pool)),
                Err(e) => {
                    tracing::warn!("Database unavailable, predictions will not be persisted: {}", e);
                    None
                }
            }
        }
        None => {
            tracing::info!("DATABASE_URL not set, predictions will not be persisted");
            None
        }
    };

    // Redis is optional too
    let publisher = match &config.redis_url {
        Some(url) => match publisher::PredictionPublisher::connect(url).await {
            Ok(publisher) => {
                tracing::info!("Publishing predictions on Redis channel {}", publisher::PREDICTION_CHANNEL);
                Some(publisher)
            }
            Err(e) => {
                tracing::warn!("Redis unavailable, predictions will not be published: {}", e);
                None
            }
        },
        None => None,
    };

    let fetcher = fetcher::DataFetcher::new(&config)?;

    // Build application state
    let state = AppState {
        config: config.clone(),
        context,
        store,
        publisher,
        fetcher,
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(config: &config::Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "stmodel_server=debug,stmodel_core=info,tower_http=debug".into());

    // JSON lines in production, human-readable otherwise
    if config.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: config::Config,
    pub context: Arc<ScoringContext>,
    pub store: Option<db::PredictionStore>,
    pub publisher: Option<publisher::PredictionPublisher>,
    pub fetcher: fetcher::DataFetcher,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::check))
        .route("/api/model/info", get(handlers::model::info))
        .route("/api/predictions/create", post(handlers::predictions::create))
        .route("/api/predictions/auto", post(handlers::predictions::auto))
        .route("/api/predictions/latest", get(handlers::predictions::latest))
        .route("/api/data/fetch", get(handlers::data::fetch))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
