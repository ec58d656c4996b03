pub mod categories;
pub mod exercises;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /exercises                                  list (?search=&category=), create
/// /exercises/{id}                             get, update, delete
/// /exercises/slug/{slug}                      get by slug
/// /exercises/qrcodes/cleanup                  remove orphaned QR artifacts (DELETE)
/// /exercises/qrcodes/regenerate               rewrite every QR artifact (POST)
///
/// /categories                                 list
/// /categories/{slug}/exercises                exercises in a category
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/exercises", exercises::router())
        .nest("/categories", categories::router())
}
