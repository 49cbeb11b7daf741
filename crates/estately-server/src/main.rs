//! Estately Server
//!
//! REST API over property listings and user accounts, backed by MongoDB
//! with a transparent in-memory fallback when the database is
//! unreachable.

mod handlers;
mod services;
mod storage;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use storage::{ConnectionHealth, HybridStorage, MemoryStorage, MongoStorage, Storage};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    /// Present only when a MongoDB backend was configured; `None` means
    /// the server runs memory-only for its whole lifetime.
    pub health: Option<Arc<dyn ConnectionHealth>>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("[FATAL] Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("Starting Estately Server v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_server().await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_server() -> Result<()> {
    let config = load_config();
    info!(
        "Config loaded: bind={}, db={}",
        config.bind_address, config.mongodb_db
    );

    let state = init_storage(&config).await;

    // Static files for the SPA front end; API routes take precedence.
    let index_path = config.static_dir.join("index.html");

    let app = Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api_routes())
        .nest_service(
            "/assets",
            ServeDir::new(config.static_dir.join("assets")),
        )
        .fallback_service(ServeFile::new(index_path))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = config
        .bind_address
        .parse()
        .context("Failed to parse bind address")?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

async fn init_storage(config: &Config) -> AppState {
    match &config.mongodb_url {
        Some(url) => match MongoStorage::connect(url, &config.mongodb_db).await {
            Ok(mongo) => {
                info!("Connected to MongoDB");
                let health: Arc<dyn ConnectionHealth> = Arc::new(mongo.health());
                let storage = HybridStorage::new(
                    Arc::new(mongo),
                    Arc::new(MemoryStorage::new()),
                    health.clone(),
                );
                AppState {
                    storage: Arc::new(storage),
                    health: Some(health),
                }
            }
            Err(e) => {
                warn!("MongoDB connection error: {:#}", e);
                warn!("Falling back to memory-only mode");
                AppState {
                    storage: Arc::new(MemoryStorage::new()),
                    health: None,
                }
            }
        },
        None => {
            warn!("MONGODB_URL is not set, running in memory-only mode");
            AppState {
                storage: Arc::new(MemoryStorage::new()),
                health: None,
            }
        }
    }
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/properties",
            get(handlers::properties::list).post(handlers::properties::create),
        )
        .route(
            "/properties/:id",
            get(handlers::properties::get)
                .patch(handlers::properties::update)
                .delete(handlers::properties::delete),
        )
        .route("/users", post(handlers::users::create))
        .route("/users/:id", get(handlers::users::get))
}

#[derive(Debug, Clone)]
struct Config {
    bind_address: String,
    mongodb_url: Option<String>,
    mongodb_db: String,
    static_dir: PathBuf,
}

fn load_config() -> Config {
    let bind_address =
        std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:5000".to_string());
    let mongodb_url = std::env::var("MONGODB_URL").ok();
    let mongodb_db = std::env::var("MONGODB_DB").unwrap_or_else(|_| "estately".to_string());
    let static_dir = std::env::var("STATIC_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./static"));

    Config {
        bind_address,
        mongodb_url,
        mongodb_db,
        static_dir,
    }
}
