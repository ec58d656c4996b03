//! Route definitions for exercises.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::exercise;
use crate::state::AppState;

/// Routes mounted at `/exercises`.
///
/// ```text
/// GET    /                       -> list
/// POST   /                       -> create
/// GET    /{id}                   -> get_by_id
/// PUT    /{id}                   -> update
/// DELETE /{id}                   -> delete
/// GET    /slug/{slug}            -> get_by_slug
/// DELETE /qrcodes/cleanup        -> cleanup_qrcodes
/// POST   /qrcodes/regenerate     -> regenerate_qrcodes
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(exercise::list).post(exercise::create))
        .route(
            "/{id}",
            get(exercise::get_by_id)
                .put(exercise::update)
                .delete(exercise::delete),
        )
        .route("/slug/{slug}", get(exercise::get_by_slug))
        .route("/qrcodes/cleanup", delete(exercise::cleanup_qrcodes))
        .route("/qrcodes/regenerate", post(exercise::regenerate_qrcodes))
}
