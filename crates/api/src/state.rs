use std::sync::Arc;

use crate::config::ServerConfig;
use crate::qrcodes::QrArtifactStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: gymar_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// QR artifact directory for exercise deep links.
    pub qr_store: Arc<QrArtifactStore>,
}
