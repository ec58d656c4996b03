//! Handlers for the `/categories` resource.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use gymar_core::error::CoreError;
use gymar_db::repositories::{CategoryRepo, ExerciseRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/categories
pub async fn list(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let categories = CategoryRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: categories }))
}

/// GET /api/categories/{slug}/exercises
pub async fn list_exercises(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let category = CategoryRepo::find_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFoundBySlug {
                entity: "Category",
                slug: slug.clone(),
            })
        })?;
    let exercises = ExerciseRepo::list_by_category(&state.pool, category.id).await?;
    Ok(Json(DataResponse { data: exercises }))
}
