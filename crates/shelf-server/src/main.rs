//! Shelf Server
//!
//! A small book catalog service: books and reviews over HTTP, backed by
//! SQLite, with a cache-aside read path for the book listing.
//!
//! The cache backend is Redis when `CACHE_URL` is set, otherwise an
//! in-process cache. Either way the cache is best-effort only: it can
//! disappear at any point and requests keep being served from SQLite.

mod error;
mod handlers;
mod services;
mod storage;

use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use services::CatalogService;
use shelf_core::ports::ListingCache;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("[FATAL] Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("Starting Shelf Server v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_server().await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_server() -> Result<()> {
    let config = load_config().context("Failed to load configuration")?;
    info!(
        "Config loaded: bind={}, db={}, cache={}",
        config.bind_address,
        config.database_path,
        config.cache_url.as_deref().unwrap_or("in-memory")
    );

    info!("Initializing SQLite database...");
    let db = Arc::new(
        storage::Database::new(&config.database_path)
            .await
            .context("Failed to initialize database")?,
    );

    // Long-lived cache client, initialized once at startup and reused
    // across requests. Cache startup failures are never fatal.
    let cache: Arc<dyn ListingCache> = match &config.cache_url {
        Some(url) => {
            info!("Initializing Redis cache...");
            let redis = storage::RedisCache::new(url, config.cache_op_timeout)
                .context("Failed to configure Redis cache")?;
            redis.connect().await;
            Arc::new(redis)
        }
        None => {
            info!("CACHE_URL not set, using in-memory cache");
            Arc::new(storage::MemoryCache::new())
        }
    };

    let catalog = Arc::new(CatalogService::new(db, cache));
    let state = AppState { catalog };

    let app = app_router(state);

    let addr: SocketAddr = config
        .bind_address
        .parse()
        .context("Failed to parse bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("Server listening on {}", addr);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/books",
            get(handlers::books::list).post(handlers::books::create),
        )
        .route(
            "/books/:book_id/reviews",
            get(handlers::reviews::list).post(handlers::reviews::create),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Clone)]
struct Config {
    bind_address: String,
    database_path: String,
    cache_url: Option<String>,
    cache_op_timeout: Duration,
}

fn load_config() -> Result<Config> {
    let bind_address =
        std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8000".to_string());

    let database_path = std::env::var("DATABASE_PATH").unwrap_or_else(|_| "shelf.db".to_string());

    let cache_url = std::env::var("CACHE_URL").ok();

    let cache_timeout_ms: u64 = match std::env::var("CACHE_TIMEOUT_MS") {
        Ok(v) => v
            .parse()
            .with_context(|| format!("Invalid CACHE_TIMEOUT_MS: {}", v))?,
        Err(_) => 250,
    };

    Ok(Config {
        bind_address,
        database_path,
        cache_url,
        cache_op_timeout: Duration::from_millis(cache_timeout_ms),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn test_app() -> Router {
        let db = Arc::new(storage::Database::in_memory().await.unwrap());
        let cache = Arc::new(storage::MemoryCache::new());
        let catalog = Arc::new(CatalogService::new(db, cache));
        app_router(AppState { catalog })
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app().await;

        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_empty_store_lists_empty() {
        let app = test_app().await;

        let response = app.oneshot(get("/books")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!([]));
    }

    #[tokio::test]
    async fn test_create_book() {
        let app = test_app().await;

        let response = app
            .oneshot(post("/books", json!({"title": "Dune", "author": "Herbert"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            body_json(response).await,
            json!({"id": 1, "title": "Dune", "author": "Herbert", "reviews": []})
        );
    }

    #[tokio::test]
    async fn test_create_and_list_reviews() {
        let app = test_app().await;

        app.clone()
            .oneshot(post("/books", json!({"title": "Dune", "author": "Herbert"})))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(post(
                "/books/1/reviews",
                json!({"reviewer": "alice", "comment": "great"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            body_json(response).await,
            json!({"id": 1, "reviewer": "alice", "comment": "great"})
        );

        let response = app.oneshot(get("/books/1/reviews")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!([{"id": 1, "reviewer": "alice", "comment": "great"}])
        );
    }

    #[tokio::test]
    async fn test_unknown_book_returns_404() {
        let app = test_app().await;

        let response = app.clone().oneshot(get("/books/999/reviews")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await, json!({"detail": "Book not found"}));

        let response = app
            .oneshot(post(
                "/books/999/reviews",
                json!({"reviewer": "alice", "comment": "great"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_listing_is_stale_within_ttl() {
        let app = test_app().await;

        app.clone()
            .oneshot(post("/books", json!({"title": "Dune", "author": "Herbert"})))
            .await
            .unwrap();

        // Populate the cache, then write without invalidating it
        let response = app.clone().oneshot(get("/books")).await.unwrap();
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

        app.clone()
            .oneshot(post("/books", json!({"title": "Solaris", "author": "Lem"})))
            .await
            .unwrap();

        let response = app.oneshot(get("/books")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        // Still the cached snapshot from before the write
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_payload_is_rejected() {
        let app = test_app().await;

        let response = app
            .oneshot(post("/books", json!({"title": "Dune"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
