//! HTTP server for photo endpoints
//!
//! Provides /health, /photos, and /photos/{id} endpoints.

use crate::error::AppError;
use crate::types::HealthResponse;
use axum::{
    body::Body,
    extract::{Path, Request, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use photo_catalog::{CatalogError, PhotoCatalog};
use std::io;
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeFile;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

/// Shared state for the HTTP server
pub struct ServerState {
    pub catalog: PhotoCatalog,
    pub started_at: DateTime<Utc>,
}

impl ServerState {
    pub fn new(catalog: PhotoCatalog) -> Self {
        Self {
            catalog,
            started_at: Utc::now(),
        }
    }
}

pub type SharedState = Arc<ServerState>;

/// Create the HTTP router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/photos", get(list_photos))
        .route("/photos/{id}", get(get_photo))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(state: SharedState, port: u16) -> std::io::Result<()> {
    let router = create_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("Server listening on http://localhost:{}", port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await
}

/// Health check endpoint
async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let uptime_secs = (Utc::now() - state.started_at).num_seconds().max(0) as u64;

    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs,
        cache: state.catalog.stats(),
    })
}

/// List every photo in the catalog
async fn list_photos(State(state): State<SharedState>) -> Result<Response, AppError> {
    let listing = state
        .catalog
        .list_photos()
        .await
        .map_err(AppError::listing)?;

    let cache_header = if listing.from_cache { "HIT" } else { "MISS" };
    Ok(([("X-Cache", cache_header)], Json(listing.photos)).into_response())
}

/// Stream the raw bytes of one photo
async fn get_photo(
    State(state): State<SharedState>,
    Path(segment): Path<String>,
    request: Request,
) -> Result<Response, AppError> {
    let id = parse_id(&segment).ok_or_else(|| AppError::invalid_id(&segment))?;

    let path = state
        .catalog
        .get_photo_by_id(id)
        .await
        .map_err(AppError::retrieval)?;

    // ServeFile would answer these with a bare 404 or a stream that fails midway
    let metadata = tokio::fs::metadata(&path)
        .await
        .map_err(|e| AppError::retrieval(CatalogError::filesystem(&path, e)))?;
    if !metadata.is_file() {
        return Err(AppError::retrieval(CatalogError::filesystem(
            &path,
            io::Error::other("not a regular file"),
        )));
    }

    let response = match ServeFile::new(&path).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    if response.status() == StatusCode::NOT_FOUND {
        return Err(AppError::retrieval(CatalogError::filesystem(
            &path,
            io::Error::from(io::ErrorKind::NotFound),
        )));
    }

    Ok(response.map(Body::new))
}

/// Read an id the way the public URLs have always been read: leading
/// whitespace, an optional sign, then as many decimal digits as follow.
/// Anything after the digits is ignored. No digits at all yields `None`.
fn parse_id(segment: &str) -> Option<i64> {
    let trimmed = segment.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits = rest.bytes().take_while(u8::is_ascii_digit);
    let mut value: i64 = 0;
    let mut seen = false;
    for digit in digits {
        seen = true;
        value = value
            .saturating_mul(10)
            .saturating_add(i64::from(digit - b'0'));
    }

    if !seen {
        return None;
    }
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{IMAGE_NOT_FOUND, LIST_FAILED, RETRIEVE_FAILED};
    use async_trait::async_trait;
    use axum::http::{header, Request};
    use photo_catalog::{CacheStore, LocalDirectory, MemoryStore};
    use std::path::Path as FsPath;
    use std::time::Duration;
    use tempfile::tempdir;

    struct UnreachableStore;

    #[async_trait]
    impl CacheStore for UnreachableStore {
        async fn get(&self, _key: &str) -> photo_catalog::Result<Option<String>> {
            Err(CatalogError::CacheUnavailable("connection refused".to_string()))
        }

        async fn set_with_expiry(
            &self,
            _key: &str,
            _value: &str,
            _ttl: Duration,
        ) -> photo_catalog::Result<()> {
            Err(CatalogError::CacheUnavailable("connection refused".to_string()))
        }
    }

    fn create_test_state(dir: &FsPath, store: Arc<dyn CacheStore>) -> SharedState {
        let catalog = PhotoCatalog::new(Arc::new(LocalDirectory::new(dir)), store);
        Arc::new(ServerState::new(catalog))
    }

    async fn get(router: Router, uri: &str) -> Response {
        router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let dir = tempdir().unwrap();
        let router = create_router(create_test_state(dir.path(), Arc::new(MemoryStore::new())));

        let response = get(router, "/health").await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert!(json["uptime_secs"].as_u64().is_some());
        assert_eq!(json["cache"]["hits"], 0);
    }

    #[tokio::test]
    async fn test_list_photos_then_cache_hit() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), b"a").unwrap();
        std::fs::write(dir.path().join("b.png"), b"b").unwrap();
        let router = create_router(create_test_state(dir.path(), Arc::new(MemoryStore::new())));

        let first = get(router.clone(), "/photos").await;
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(first.headers()["x-cache"], "MISS");
        let first_body = body_bytes(first).await;

        let second = get(router, "/photos").await;
        assert_eq!(second.status(), StatusCode::OK);
        assert_eq!(second.headers()["x-cache"], "HIT");
        assert_eq!(body_bytes(second).await, first_body);

        let json: serde_json::Value = serde_json::from_slice(&first_body).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"id": 0, "name": "a.png", "url": "/photos/0"},
                {"id": 1, "name": "b.png", "url": "/photos/1"}
            ])
        );
    }

    #[tokio::test]
    async fn test_list_photos_without_cache() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), b"a").unwrap();
        let router = create_router(create_test_state(dir.path(), Arc::new(UnreachableStore)));

        let response = get(router, "/photos").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            serde_json::json!([{"id": 0, "name": "a.png", "url": "/photos/0"}])
        );
    }

    #[tokio::test]
    async fn test_list_photos_missing_directory() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing");
        let router = create_router(create_test_state(&missing, Arc::new(MemoryStore::new())));

        let response = get(router, "/photos").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": LIST_FAILED })
        );
    }

    #[tokio::test]
    async fn test_get_photo_bytes() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), b"\x89PNG fake").unwrap();
        let router = create_router(create_test_state(dir.path(), Arc::new(MemoryStore::new())));

        let response = get(router, "/photos/0").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        assert_eq!(body_bytes(response).await, b"\x89PNG fake".to_vec());
    }

    #[tokio::test]
    async fn test_get_photo_matches_listing() {
        let dir = tempdir().unwrap();
        for name in ["one.jpg", "two.gif", "three.webp"] {
            std::fs::write(dir.path().join(name), name.as_bytes()).unwrap();
        }
        let router = create_router(create_test_state(dir.path(), Arc::new(MemoryStore::new())));

        let listing = body_json(get(router.clone(), "/photos").await).await;
        for photo in listing.as_array().unwrap() {
            let url = photo["url"].as_str().unwrap();
            let name = photo["name"].as_str().unwrap();

            let response = get(router.clone(), url).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_bytes(response).await, name.as_bytes().to_vec());
        }
    }

    #[tokio::test]
    async fn test_get_photo_unknown_extension() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("blob"), b"data").unwrap();
        let router = create_router(create_test_state(dir.path(), Arc::new(MemoryStore::new())));

        let response = get(router, "/photos/0").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn test_get_photo_not_found() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), b"a").unwrap();
        std::fs::write(dir.path().join("b.png"), b"b").unwrap();
        let state = create_test_state(dir.path(), Arc::new(MemoryStore::new()));

        for uri in ["/photos/2", "/photos/5", "/photos/-1", "/photos/99999999999999999999"] {
            let response = get(create_router(state.clone()), uri).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
            assert_eq!(
                body_json(response).await,
                serde_json::json!({ "error": IMAGE_NOT_FOUND })
            );
        }
    }

    #[tokio::test]
    async fn test_get_photo_reads_leading_digits() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), b"a").unwrap();
        std::fs::write(dir.path().join("b.png"), b"b").unwrap();
        let state = create_test_state(dir.path(), Arc::new(MemoryStore::new()));

        for uri in ["/photos/1abc", "/photos/1.0", "/photos/%201", "/photos/+1"] {
            let response = get(create_router(state.clone()), uri).await;
            assert_eq!(response.status(), StatusCode::OK, "{}", uri);
            assert_eq!(body_bytes(response).await, b"b".to_vec(), "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_get_photo_without_digits() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), b"a").unwrap();
        let state = create_test_state(dir.path(), Arc::new(MemoryStore::new()));

        for uri in ["/photos/abc", "/photos/-x", "/photos/.5"] {
            let response = get(create_router(state.clone()), uri).await;
            assert_eq!(
                response.status(),
                StatusCode::INTERNAL_SERVER_ERROR,
                "{}",
                uri
            );
            assert_eq!(
                body_json(response).await,
                serde_json::json!({ "error": RETRIEVE_FAILED })
            );
        }
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("0"), Some(0));
        assert_eq!(parse_id("42"), Some(42));
        assert_eq!(parse_id("-1"), Some(-1));
        assert_eq!(parse_id("+3"), Some(3));
        assert_eq!(parse_id("-0"), Some(0));
        assert_eq!(parse_id("1abc"), Some(1));
        assert_eq!(parse_id("2.9"), Some(2));
        assert_eq!(parse_id(" \t7"), Some(7));
        assert_eq!(parse_id("99999999999999999999"), Some(i64::MAX));
        assert_eq!(parse_id(""), None);
        assert_eq!(parse_id("abc"), None);
        assert_eq!(parse_id("-"), None);
        assert_eq!(parse_id("1 "), Some(1));
        assert_eq!(parse_id("- 1"), None);
    }

    #[tokio::test]
    async fn test_get_photo_missing_directory() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing");
        let router = create_router(create_test_state(&missing, Arc::new(MemoryStore::new())));

        let response = get(router, "/photos/0").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": RETRIEVE_FAILED })
        );
    }

    #[tokio::test]
    async fn test_get_photo_on_subdirectory_entry() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        let router = create_router(create_test_state(dir.path(), Arc::new(MemoryStore::new())));

        let response = get(router, "/photos/0").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": RETRIEVE_FAILED })
        );
    }

    #[test]
    fn test_server_state_new() {
        let dir = tempdir().unwrap();
        let state = create_test_state(dir.path(), Arc::new(MemoryStore::new()));

        let diff = (Utc::now() - state.started_at).num_seconds();
        assert!((0..5).contains(&diff));
    }
}
