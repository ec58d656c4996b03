#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

use gymar_api::config::ServerConfig;
use gymar_api::qrcodes::QrArtifactStore;
use gymar_api::router::build_app_router;
use gymar_api::state::AppState;

pub const TEST_AR_BASE_URL: &str = "https://gymar.test/ar";

/// The router plus the temporary public directory it writes QR artifacts to.
///
/// The directory is deleted when the `TestApp` is dropped.
pub struct TestApp {
    pub router: Router,
    pub qr_store: QrArtifactStore,
    _public_dir: TempDir,
}

impl TestApp {
    /// A fresh handle to the router for one `oneshot` request.
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Build a test `ServerConfig` rooted at `public_dir`.
pub fn test_config(public_dir: &std::path::Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        public_dir: public_dir.to_path_buf(),
        qr_subdir: "qrcodes".to_string(),
        ar_base_url: TEST_AR_BASE_URL.to_string(),
    }
}

/// Build the full application router with the production middleware stack,
/// backed by `pool` and a temporary public directory.
pub fn build_test_app(pool: PgPool) -> TestApp {
    let public_dir = tempfile::tempdir().expect("create temp public dir");
    let config = test_config(public_dir.path());
    let qr_store = QrArtifactStore::from_config(&config);

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        qr_store: Arc::new(qr_store.clone()),
    };

    TestApp {
        router: build_app_router(state, &config),
        qr_store,
        _public_dir: public_dir,
    }
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn post_empty(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, None).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Decode the QR code in a PNG and return its text.
pub fn decode_qr_png(bytes: &[u8]) -> String {
    let image = image::load_from_memory(bytes).unwrap().to_luma8();
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
        image.width() as usize,
        image.height() as usize,
        |x, y| image.get_pixel(x as u32, y as u32).0[0],
    );
    let grids = prepared.detect_grids();
    assert_eq!(grids.len(), 1, "expected exactly one QR code");
    let (_, content) = grids[0].decode().unwrap();
    content
}
